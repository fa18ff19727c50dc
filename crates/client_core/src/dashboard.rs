use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use serde::Serialize;
use shared::{domain::PageId, protocol::Profile};
use tokio::sync::RwLock;

use crate::routes::{self, RouteDefinition};

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn retrieve_profile(&self) -> anyhow::Result<Profile>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub page: Option<PageId>,
    pub routes: Vec<RouteDefinition>,
    pub profile: Option<Profile>,
}

pub struct DashboardShell {
    source: Arc<dyn ProfileSource>,
    mounted: AtomicBool,
    profile: RwLock<Option<Profile>>,
}

impl DashboardShell {
    pub fn new(source: Arc<dyn ProfileSource>) -> Self {
        Self {
            source,
            mounted: AtomicBool::new(false),
            profile: RwLock::new(None),
        }
    }

    /// Fetches the profile the first time the shell mounts. A failed fetch is
    /// logged and leaves the profile empty.
    pub async fn mount(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return;
        }

        match self.source.retrieve_profile().await {
            Ok(profile) => {
                tracing::info!(username = %profile.username, "dashboard profile loaded");
                *self.profile.write().await = Some(profile);
            }
            Err(err) => {
                tracing::error!("dashboard: retrieve_profile failed: {err:#}");
            }
        }
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    pub async fn view(&self, base: &str, current: &str) -> DashboardView {
        DashboardView {
            title: routes::title_for(current),
            page: routes::resolve(base, current).map(|route| route.page),
            routes: routes::routes_for(base),
            profile: self.profile().await,
        }
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
