use async_trait::async_trait;
use shared::{
    domain::{fields, SchemaKey},
    protocol::{FieldErrors, Payload},
};
use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 8;

#[async_trait]
pub trait ValidationGateway: Send + Sync {
    /// `None` means the payload is valid for `schema`. Any returned mapping
    /// rejects the submission, even one whose message lists are empty.
    async fn validate(&self, values: &Payload, schema: SchemaKey) -> Option<FieldErrors>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

#[async_trait]
impl ValidationGateway for RuleValidator {
    async fn validate(&self, values: &Payload, schema: SchemaKey) -> Option<FieldErrors> {
        let errors = match schema {
            SchemaKey::SignUp => sign_up_errors(values),
            SchemaKey::ChangePassword => change_password_errors(values),
        };
        (!errors.is_empty()).then_some(errors)
    }
}

fn sign_up_errors(values: &Payload) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in fields::AUTHENTICATION {
        if value_of(values, field).trim().is_empty() {
            push(&mut errors, field, format!("{} is required", label(field)));
        }
    }

    let email = value_of(values, fields::EMAIL);
    if !email.trim().is_empty() && !email.validate_email() {
        push(&mut errors, fields::EMAIL, "Email must be a valid email address".into());
    }

    check_passwords(values, &mut errors);
    errors
}

fn change_password_errors(values: &Payload) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if value_of(values, fields::PASSWORD).trim().is_empty() {
        push(
            &mut errors,
            fields::PASSWORD,
            format!("{} is required", label(fields::PASSWORD)),
        );
    }

    check_passwords(values, &mut errors);
    errors
}

fn check_passwords(values: &Payload, errors: &mut FieldErrors) {
    let password = value_of(values, fields::PASSWORD);
    if !password.trim().is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
        push(
            errors,
            fields::PASSWORD,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    if value_of(values, fields::CONFIRM_PASSWORD) != password {
        push(errors, fields::CONFIRM_PASSWORD, "Passwords do not match".into());
    }
}

fn value_of<'a>(values: &'a Payload, field: &str) -> &'a str {
    values.get(field).map(String::as_str).unwrap_or_default()
}

fn push(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

fn label(field: &str) -> &'static str {
    match field {
        fields::FIRST_NAME => "First name",
        fields::LAST_NAME => "Last name",
        fields::EMAIL => "Email",
        fields::USERNAME => "Username",
        fields::PASSWORD => "Password",
        fields::CONFIRM_PASSWORD => "Password confirmation",
        _ => "Field",
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
