use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use shared::{domain::Operation, protocol::Payload};

pub type OperationFuture = BoxFuture<'static, anyhow::Result<()>>;
pub type OperationFn = Arc<dyn Fn(Payload) -> OperationFuture + Send + Sync>;

#[derive(Clone, Default)]
pub struct OperationDispatcher {
    operations: HashMap<Operation, OperationFn>,
}

impl OperationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `operation`, replacing any previous handler.
    pub fn with<F, Fut>(mut self, operation: Operation, handler: F) -> Self
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.operations
            .insert(operation, Arc::new(move |payload| handler(payload).boxed()));
        self
    }

    pub fn get(&self, operation: Operation) -> Option<OperationFn> {
        self.operations.get(&operation).cloned()
    }

    pub fn contains(&self, operation: Operation) -> bool {
        self.operations.contains_key(&operation)
    }
}

impl fmt::Debug for OperationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&str> = self.operations.keys().map(|op| op.as_str()).collect();
        registered.sort_unstable();
        f.debug_struct("OperationDispatcher")
            .field("operations", &registered)
            .finish()
    }
}
