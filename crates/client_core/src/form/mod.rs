//! Form orchestration: field state, blur handling, and validate-before-submit dispatch.

mod container;
mod state;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use futures::{future::BoxFuture, FutureExt};
use shared::{
    domain::{fields, SubmitKind},
    protocol::{FieldErrors, Payload},
};
use tokio::task::JoinHandle;

use crate::{
    config::ClientSettings,
    error::OrchestratorError,
    operations::{OperationDispatcher, OperationFn},
    validation::ValidationGateway,
};

pub use container::{FormContainer, FormProps, FormView};
pub use state::FormState;

const SUBMIT_KINDS: [SubmitKind; 2] = [SubmitKind::SignUp, SubmitKind::NewPassword];

#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Rejected(FieldErrors),
    Dispatched(JoinHandle<anyhow::Result<()>>),
    Detached,
}

impl SubmitOutcome {
    /// Waits for a dispatched operation and surfaces its result.
    pub async fn finish(self) -> anyhow::Result<()> {
        match self {
            Self::Rejected(errors) => Err(OrchestratorError::Rejected { errors }.into()),
            Self::Dispatched(task) => task.await?,
            Self::Detached => Err(OrchestratorError::Detached.into()),
        }
    }
}

pub struct FormOrchestrator {
    state: Arc<Mutex<FormState>>,
    gateway: Arc<dyn ValidationGateway>,
    operations: HashMap<SubmitKind, OperationFn>,
    redirect_url: String,
}

impl FormOrchestrator {
    pub fn new<S: AsRef<str>>(
        form_fields: &[S],
        gateway: Arc<dyn ValidationGateway>,
        dispatcher: &OperationDispatcher,
        settings: &ClientSettings,
    ) -> Result<Self, OrchestratorError> {
        let mut operations = HashMap::with_capacity(SUBMIT_KINDS.len());
        for kind in SUBMIT_KINDS {
            let operation = kind.operation();
            let handler = dispatcher
                .get(operation)
                .ok_or(OrchestratorError::MissingOperation { kind, operation })?;
            operations.insert(kind, handler);
        }

        Ok(Self {
            state: Arc::new(Mutex::new(FormState::with_fields(form_fields))),
            gateway,
            operations,
            redirect_url: settings.sign_up_redirect_url.clone(),
        })
    }

    pub fn authentication(
        gateway: Arc<dyn ValidationGateway>,
        dispatcher: &OperationDispatcher,
        settings: &ClientSettings,
    ) -> Result<Self, OrchestratorError> {
        Self::new(fields::AUTHENTICATION, gateway, dispatcher, settings)
    }

    pub fn snapshot(&self) -> FormState {
        lock(&self.state).clone()
    }

    pub fn on_field_change(&self, field: &str, value: impl Into<String>) {
        if !lock(&self.state).set_value(field, value.into()) {
            tracing::warn!(field, "ignoring change for unknown form field");
        }
    }

    // Clears without re-validating.
    pub fn on_field_blur(&self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        if !lock(&self.state).clear_errors(field) {
            tracing::warn!(field, "ignoring blur for unknown form field");
        }
    }

    pub fn on_submit(&self, kind: SubmitKind) -> SubmitHandler {
        // Every kind is resolved in `new`, so the lookup cannot miss.
        let operation = self.operations[&kind].clone();
        SubmitHandler {
            kind,
            state: Arc::downgrade(&self.state),
            gateway: Arc::clone(&self.gateway),
            operation,
            redirect_url: kind.carries_redirect().then(|| self.redirect_url.clone()),
        }
    }

    pub fn on_submit_trigger(&self, trigger: &str) -> SubmitHandler {
        self.on_submit(SubmitKind::from_trigger(trigger))
    }

    pub fn unmount(self) {
        tracing::debug!("form unmounted");
    }

    pub async fn submit_values<'a>(
        &self,
        kind: SubmitKind,
        values: impl IntoIterator<Item = (&'a str, String)>,
    ) -> anyhow::Result<()> {
        for (field, value) in values {
            self.on_field_change(field, value);
        }

        let mut event = SubmitEvent::new();
        self.on_submit(kind).handle(&mut event).await.finish().await
    }
}

// Holds only a weak reference so a pending submission never keeps an
// unmounted form alive.
#[derive(Clone)]
pub struct SubmitHandler {
    kind: SubmitKind,
    state: Weak<Mutex<FormState>>,
    gateway: Arc<dyn ValidationGateway>,
    operation: OperationFn,
    redirect_url: Option<String>,
}

impl SubmitHandler {
    pub fn kind(&self) -> SubmitKind {
        self.kind
    }

    /// Overlapping submissions are not de-duplicated; the last validation to
    /// finish owns `errors`.
    pub fn handle(&self, event: &mut SubmitEvent) -> BoxFuture<'static, SubmitOutcome> {
        event.prevent_default();
        let handler = self.clone();
        async move { handler.run().await }.boxed()
    }

    async fn run(self) -> SubmitOutcome {
        let Some(values) = self.current_values() else {
            return SubmitOutcome::Detached;
        };
        let schema = self.kind.schema_key();
        tracing::debug!(kind = ?self.kind, %schema, "validating form submission");

        let errors = self
            .gateway
            .validate(&values, schema)
            .await
            .filter(|errors| !errors.is_empty());

        let Some(state) = self.state.upgrade() else {
            tracing::debug!(kind = ?self.kind, "form unmounted during validation; dropping submission");
            return SubmitOutcome::Detached;
        };

        if let Some(errors) = errors {
            let unknown = lock(&state).replace_errors(errors.clone());
            if !unknown.is_empty() {
                tracing::warn!(?unknown, "validation reported errors for unknown fields");
            }
            tracing::debug!(kind = ?self.kind, fields = errors.len(), "form submission rejected");
            return SubmitOutcome::Rejected(errors);
        }
        drop(state);

        let mut payload = values;
        if let Some(url) = self.redirect_url {
            payload.insert(fields::REDIRECT_URL.to_string(), url);
        }

        let operation_name = self.kind.operation();
        let future = (self.operation)(payload);
        tracing::debug!(operation = %operation_name, "dispatching form operation");
        SubmitOutcome::Dispatched(tokio::spawn(async move {
            let result = future.await;
            if let Err(err) = &result {
                tracing::error!(operation = %operation_name, "form operation failed: {err:#}");
            }
            result
        }))
    }

    fn current_values(&self) -> Option<Payload> {
        let state = self.state.upgrade()?;
        let values = lock(&state).values().clone();
        Some(values)
    }
}

fn lock(state: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "../tests/form_tests.rs"]
mod tests;
