pub mod config;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod http;
pub mod operations;
pub mod routes;
pub mod validation;

pub use config::{load_settings, ClientSettings};
pub use dashboard::{DashboardShell, DashboardView, ProfileSource};
pub use error::{ClientError, OrchestratorError};
pub use form::{
    FormContainer, FormOrchestrator, FormProps, FormState, FormView, SubmitEvent, SubmitHandler,
    SubmitOutcome,
};
pub use http::AuthApiClient;
pub use operations::{OperationDispatcher, OperationFn, OperationFuture};
pub use validation::{RuleValidator, ValidationGateway};
