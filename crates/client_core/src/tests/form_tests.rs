use super::*;
use async_trait::async_trait;
use shared::domain::{Operation, SchemaKey};
use tokio::sync::{oneshot, Mutex as AsyncMutex};

struct ScriptedGateway {
    result: Option<FieldErrors>,
    calls: Arc<AsyncMutex<Vec<(Payload, SchemaKey)>>>,
}

impl ScriptedGateway {
    fn passing() -> Self {
        Self {
            result: None,
            calls: Arc::new(AsyncMutex::new(Vec::new())),
        }
    }

    fn failing(errors: FieldErrors) -> Self {
        Self {
            result: Some(errors),
            calls: Arc::new(AsyncMutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ValidationGateway for ScriptedGateway {
    async fn validate(&self, values: &Payload, schema: SchemaKey) -> Option<FieldErrors> {
        self.calls.lock().await.push((values.clone(), schema));
        self.result.clone()
    }
}

/// Blocks validation until the test releases it.
struct GatedGateway {
    gate: AsyncMutex<Option<oneshot::Receiver<Option<FieldErrors>>>>,
}

#[async_trait]
impl ValidationGateway for GatedGateway {
    async fn validate(&self, _values: &Payload, _schema: SchemaKey) -> Option<FieldErrors> {
        let rx = self.gate.lock().await.take()?;
        rx.await.ok().flatten()
    }
}

type Calls = Arc<AsyncMutex<Vec<(Operation, Payload)>>>;

fn recording_dispatcher() -> (OperationDispatcher, Calls) {
    let calls: Calls = Arc::new(AsyncMutex::new(Vec::new()));
    let mut dispatcher = OperationDispatcher::new();
    for operation in Operation::ALL.iter().copied() {
        let calls = Arc::clone(&calls);
        dispatcher = dispatcher.with(operation, move |payload| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().await.push((operation, payload));
                Ok(())
            }
        });
    }
    (dispatcher, calls)
}

fn auth_form(gateway: impl ValidationGateway + 'static) -> (FormOrchestrator, Calls) {
    let (dispatcher, calls) = recording_dispatcher();
    let form = FormOrchestrator::authentication(
        Arc::new(gateway),
        &dispatcher,
        &ClientSettings::default(),
    )
    .expect("orchestrator");
    (form, calls)
}

fn errors_for(pairs: Vec<(&str, Vec<&str>)>) -> FieldErrors {
    pairs
        .into_iter()
        .map(|(field, messages)| {
            (
                field.to_string(),
                messages.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

fn fill_sign_up(form: &FormOrchestrator) {
    form.on_field_change("firstName", "A");
    form.on_field_change("lastName", "B");
    form.on_field_change("email", "a@b.com");
    form.on_field_change("username", "ab");
    form.on_field_change("password", "x");
    form.on_field_change("confirmPassword", "x");
}

async fn submit(form: &FormOrchestrator, trigger: &str) -> (SubmitOutcome, bool) {
    let mut event = SubmitEvent::new();
    let pending = form.on_submit_trigger(trigger).handle(&mut event);
    let prevented = event.is_default_prevented();
    (pending.await, prevented)
}

async fn settle(outcome: SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Dispatched(task) => task.await.expect("operation task"),
        other => panic!("expected dispatch, got {other:?}"),
    }
}

#[test]
fn mounts_with_empty_authentication_fields() {
    let (form, _) = auth_form(ScriptedGateway::passing());
    let state = form.snapshot();

    assert_eq!(state.values().len(), 6);
    assert!(state.values().values().all(String::is_empty));
    assert!(state.errors().is_empty());
    assert!(state.is_valid());
}

#[test]
fn change_updates_only_that_field() {
    let (form, _) = auth_form(ScriptedGateway::passing());
    form.on_field_change("email", "a@b.com");
    let before = form.snapshot();

    form.on_field_change("username", "ab");
    let after = form.snapshot();

    assert_eq!(after.values()["username"], "ab");
    for (field, value) in before.values() {
        if field != "username" {
            assert_eq!(&after.values()[field], value);
        }
    }
    assert_eq!(after.errors(), before.errors());
}

#[tokio::test]
async fn change_leaves_errors_untouched() {
    let errors = errors_for(vec![("email", vec!["Email is required"])]);
    let (form, _) = auth_form(ScriptedGateway::failing(errors.clone()));
    submit(&form, "SIGN_UP").await;

    form.on_field_change("email", "a@b.com");

    assert_eq!(form.snapshot().errors(), &errors);
}

#[test]
fn change_for_unknown_field_is_ignored() {
    let (form, _) = auth_form(ScriptedGateway::passing());
    let before = form.snapshot();

    form.on_field_change("nickname", "zed");

    assert_eq!(form.snapshot(), before);
    assert!(!form.snapshot().has_field("nickname"));
}

#[tokio::test]
async fn blur_with_value_clears_only_that_field() {
    let errors = errors_for(vec![
        ("email", vec!["Email is required"]),
        ("password", vec!["Password is required", "too short"]),
    ]);
    let (form, _) = auth_form(ScriptedGateway::failing(errors));
    submit(&form, "SIGN_UP").await;

    form.on_field_blur("password", "still wrong");

    let state = form.snapshot();
    assert!(state.field_errors("password").is_empty());
    assert_eq!(state.field_errors("email"), ["Email is required"]);
}

#[tokio::test]
async fn blur_with_empty_value_is_a_noop() {
    let errors = errors_for(vec![("email", vec!["Email is required"])]);
    let (form, _) = auth_form(ScriptedGateway::failing(errors));
    submit(&form, "SIGN_UP").await;
    let before = form.snapshot();

    form.on_field_blur("email", "");
    form.on_field_blur("email", "");

    assert_eq!(form.snapshot(), before);
}

#[tokio::test]
async fn rejected_submit_never_calls_an_operation() {
    let errors = errors_for(vec![("confirmPassword", vec!["Passwords do not match"])]);
    let (form, calls) = auth_form(ScriptedGateway::failing(errors.clone()));
    fill_sign_up(&form);

    let (outcome, prevented) = submit(&form, "SIGN_UP").await;

    assert!(prevented);
    match outcome {
        SubmitOutcome::Rejected(reported) => assert_eq!(reported, errors),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(form.snapshot().errors(), &errors);
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn rejection_replaces_previous_errors_wholesale() {
    let first = errors_for(vec![("email", vec!["Email is required"])]);
    let second = errors_for(vec![("username", vec!["Username is taken"])]);

    let (dispatcher, _) = recording_dispatcher();
    let gateway = Arc::new(AlternatingGateway {
        results: AsyncMutex::new(vec![second.clone(), first.clone()]),
    });
    let form = FormOrchestrator::authentication(gateway, &dispatcher, &ClientSettings::default())
        .expect("orchestrator");

    submit(&form, "SIGN_UP").await;
    assert_eq!(form.snapshot().errors(), &first);

    submit(&form, "SIGN_UP").await;
    assert_eq!(form.snapshot().errors(), &second);
}

struct AlternatingGateway {
    results: AsyncMutex<Vec<FieldErrors>>,
}

#[async_trait]
impl ValidationGateway for AlternatingGateway {
    async fn validate(&self, _values: &Payload, _schema: SchemaKey) -> Option<FieldErrors> {
        self.results.lock().await.pop()
    }
}

#[tokio::test]
async fn gateway_errors_with_empty_lists_still_reject() {
    let returned = errors_for(vec![("email", vec![])]);
    let (form, calls) = auth_form(ScriptedGateway::failing(returned.clone()));
    fill_sign_up(&form);

    let (outcome, _) = submit(&form, "SIGN_UP").await;
    match outcome {
        SubmitOutcome::Rejected(errors) => assert_eq!(errors, returned),
        other => panic!("expected rejection, got {other:?}"),
    }

    assert_eq!(form.snapshot().errors(), &returned);
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn finish_reports_rejection_as_error() {
    let errors = errors_for(vec![("email", vec!["Email is required"])]);
    let (form, calls) = auth_form(ScriptedGateway::failing(errors.clone()));

    let (outcome, _) = submit(&form, "SIGN_UP").await;
    let err = outcome.finish().await.expect_err("rejected");

    match err.downcast_ref::<OrchestratorError>() {
        Some(OrchestratorError::Rejected { errors: reported }) => assert_eq!(reported, &errors),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn valid_sign_up_dispatches_once_with_redirect_url() {
    let gateway = ScriptedGateway::passing();
    let validations = Arc::clone(&gateway.calls);
    let (form, calls) = auth_form(gateway);
    fill_sign_up(&form);

    let (outcome, prevented) = submit(&form, "SIGN_UP").await;
    assert!(prevented);
    settle(outcome).await.expect("operation");

    let calls = calls.lock().await;
    assert_eq!(calls.len(), 1);
    let (operation, payload) = &calls[0];
    assert_eq!(*operation, Operation::SignUp);

    let mut expected = form.snapshot().values().clone();
    expected.insert(
        "redirectURL".into(),
        "http://localhost:8080/signup/redirect".into(),
    );
    assert_eq!(payload, &expected);
    assert_eq!(payload.len(), 7);
    assert_eq!(payload["firstName"], "A");
    assert_eq!(payload["confirmPassword"], "x");

    let validations = validations.lock().await;
    assert_eq!(validations.len(), 1);
    assert_eq!(validations[0].1, SchemaKey::SignUp);
    assert!(!validations[0].0.contains_key("redirectURL"));
}

#[tokio::test]
async fn configured_redirect_url_is_merged() {
    let (dispatcher, calls) = recording_dispatcher();
    let settings = ClientSettings {
        sign_up_redirect_url: "https://portal.example.com/welcome".into(),
        ..ClientSettings::default()
    };
    let form = FormOrchestrator::authentication(
        Arc::new(ScriptedGateway::passing()),
        &dispatcher,
        &settings,
    )
    .expect("orchestrator");

    let (outcome, _) = submit(&form, "SIGN_UP").await;
    settle(outcome).await.expect("operation");

    assert_eq!(
        calls.lock().await[0].1["redirectURL"],
        "https://portal.example.com/welcome"
    );
}

#[tokio::test]
async fn valid_password_change_uses_its_schema_and_plain_values() {
    let gateway = ScriptedGateway::passing();
    let validations = Arc::clone(&gateway.calls);
    let (form, calls) = auth_form(gateway);
    form.on_field_change("password", "new-secret");
    form.on_field_change("confirmPassword", "new-secret");

    let (outcome, _) = submit(&form, "NEW_PASSWORD").await;
    settle(outcome).await.expect("operation");

    assert_eq!(validations.lock().await[0].1, SchemaKey::ChangePassword);
    let calls = calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Operation::ChangeUserPassword);
    assert_eq!(&calls[0].1, form.snapshot().values());
    assert!(!calls[0].1.contains_key("redirectURL"));
}

#[tokio::test]
async fn unknown_trigger_behaves_like_sign_up() {
    let gateway = ScriptedGateway::passing();
    let validations = Arc::clone(&gateway.calls);
    let (form, calls) = auth_form(gateway);
    fill_sign_up(&form);

    assert_eq!(form.on_submit_trigger("BOGUS").kind(), SubmitKind::SignUp);

    let (bogus, _) = submit(&form, "BOGUS").await;
    settle(bogus).await.expect("operation");
    let (sign_up, _) = submit(&form, "SIGN_UP").await;
    settle(sign_up).await.expect("operation");

    let calls = calls.lock().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0].0, Operation::SignUp);

    let validations = validations.lock().await;
    assert_eq!(validations[0], validations[1]);
}

#[tokio::test]
async fn failing_operation_does_not_surface_to_the_form() {
    let dispatcher = OperationDispatcher::new()
        .with(Operation::SignUp, |_| async {
            Err(anyhow::anyhow!("409 username already taken"))
        })
        .with(Operation::ChangeUserPassword, |_| async { Ok(()) });
    let form = FormOrchestrator::authentication(
        Arc::new(ScriptedGateway::passing()),
        &dispatcher,
        &ClientSettings::default(),
    )
    .expect("orchestrator");

    let (outcome, _) = submit(&form, "SIGN_UP").await;
    let err = settle(outcome).await.expect_err("operation failed");

    assert!(err.to_string().contains("username already taken"));
    assert!(form.snapshot().errors().is_empty());
}

#[test]
fn construction_requires_every_operation() {
    let dispatcher = OperationDispatcher::new().with(Operation::SignUp, |_| async { Ok(()) });
    let result = FormOrchestrator::authentication(
        Arc::new(ScriptedGateway::passing()),
        &dispatcher,
        &ClientSettings::default(),
    );

    match result {
        Err(OrchestratorError::MissingOperation { kind, operation }) => {
            assert_eq!(kind, SubmitKind::NewPassword);
            assert_eq!(operation, Operation::ChangeUserPassword);
        }
        Ok(_) => panic!("expected missing operation error"),
        Err(other) => panic!("expected missing operation error, got {other:?}"),
    }
}

#[tokio::test]
async fn unmount_during_validation_detaches_submission() {
    let (release, gate) = oneshot::channel();
    let gateway = GatedGateway {
        gate: AsyncMutex::new(Some(gate)),
    };
    let (form, calls) = auth_form(gateway);
    fill_sign_up(&form);

    let mut event = SubmitEvent::new();
    let pending = tokio::spawn(form.on_submit(SubmitKind::SignUp).handle(&mut event));
    tokio::task::yield_now().await;

    form.unmount();
    let _ = release.send(None);

    let outcome = pending.await.expect("submission task");
    assert!(matches!(outcome, SubmitOutcome::Detached));
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn submit_after_unmount_is_detached() {
    let (form, calls) = auth_form(ScriptedGateway::passing());
    let handler = form.on_submit(SubmitKind::NewPassword);
    form.unmount();

    let mut event = SubmitEvent::new();
    let outcome = handler.handle(&mut event).await;

    assert!(event.is_default_prevented());
    assert!(matches!(outcome, SubmitOutcome::Detached));
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn overlapping_submissions_last_validation_wins() {
    let (release_first, gate_first) = oneshot::channel();
    let (release_second, gate_second) = oneshot::channel();
    let gateway = SequencedGateway {
        gates: AsyncMutex::new(vec![gate_second, gate_first]),
    };
    let (form, calls) = auth_form(gateway);

    let mut event = SubmitEvent::new();
    let handler = form.on_submit(SubmitKind::SignUp);
    let first = tokio::spawn(handler.handle(&mut event));
    tokio::task::yield_now().await;
    let second = tokio::spawn(handler.handle(&mut event));
    tokio::task::yield_now().await;

    let second_errors = errors_for(vec![("username", vec!["Username is taken"])]);
    let first_errors = errors_for(vec![("email", vec!["Email is required"])]);
    release_second
        .send(Some(second_errors))
        .expect("release second");
    second.await.expect("second submission");
    release_first
        .send(Some(first_errors.clone()))
        .expect("release first");
    first.await.expect("first submission");

    assert_eq!(form.snapshot().errors(), &first_errors);
    assert!(calls.lock().await.is_empty());
}

struct SequencedGateway {
    gates: AsyncMutex<Vec<oneshot::Receiver<Option<FieldErrors>>>>,
}

#[async_trait]
impl ValidationGateway for SequencedGateway {
    async fn validate(&self, _values: &Payload, _schema: SchemaKey) -> Option<FieldErrors> {
        let rx = self.gates.lock().await.pop()?;
        rx.await.ok().flatten()
    }
}

#[test]
fn container_renders_view_with_current_state() {
    struct SummaryView;

    impl FormView for SummaryView {
        type Output = String;

        fn render(&self, props: FormProps<'_>) -> String {
            let filled = props.values.values().filter(|v| !v.is_empty()).count();
            format!("filled={filled} errors={}", props.errors.len())
        }
    }

    let (dispatcher, _) = recording_dispatcher();
    let form = FormOrchestrator::authentication(
        Arc::new(ScriptedGateway::passing()),
        &dispatcher,
        &ClientSettings::default(),
    )
    .expect("orchestrator");
    let container = FormContainer::new(SummaryView, form);

    assert_eq!(container.render(), "filled=0 errors=0");
    container.orchestrator().on_field_change("email", "a@b.com");
    container.orchestrator().on_field_blur("email", "a@b.com");
    assert_eq!(container.render(), "filled=1 errors=1");

    let _view: SummaryView = container.unmount();
}
