use serde::Serialize;
use shared::domain::PageId;

pub const DASHBOARD_ROOT: &str = "/dashboard";

pub const TITLE_MY_ORGANISATIONS: &str = "My Organisations";
pub const TITLE_UPDATE_PROFILE: &str = "Update Profile";
pub const TITLE_CREATE_ORGANISATION: &str = "Create New Organisation";
pub const TITLE_UPDATE_PASSWORD: &str = "Update Password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    pub path: String,
    pub page: PageId,
    pub exact: bool,
}

impl RouteDefinition {
    fn under(base: &str, suffix: &str, page: PageId) -> Self {
        Self {
            path: format!("{base}{suffix}"),
            page,
            exact: true,
        }
    }

    /// Exact routes match only their own path; prefix routes also match any
    /// path below theirs.
    pub fn matches(&self, current: &str) -> bool {
        if self.exact {
            return current == self.path;
        }
        match current.strip_prefix(self.path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.path.ends_with('/'),
            None => false,
        }
    }
}

pub fn routes_for(base: &str) -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::under(base, "", PageId::MyOrganisations),
        RouteDefinition::under(base, "/profile", PageId::UpdateProfile),
        RouteDefinition::under(base, "/organisation", PageId::CreateOrganisation),
        RouteDefinition::under(base, "/password", PageId::UpdatePassword),
    ]
}

pub fn resolve(base: &str, current: &str) -> Option<RouteDefinition> {
    routes_for(base)
        .into_iter()
        .find(|route| route.matches(current))
}

pub fn title_for(current: &str) -> &'static str {
    match current {
        "/dashboard/profile" | "/dashboard/profile/" => TITLE_UPDATE_PROFILE,
        "/dashboard/organisation" | "/dashboard/organisation/" => TITLE_CREATE_ORGANISATION,
        "/dashboard/password" | "/dashboard/password/" => TITLE_UPDATE_PASSWORD,
        _ => TITLE_MY_ORGANISATIONS,
    }
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
