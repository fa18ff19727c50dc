use shared::protocol::{FieldErrors, Payload};

/// The field set is fixed at construction and `errors` never holds a key that
/// is not also a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: Payload,
    errors: FieldErrors,
}

impl FormState {
    pub fn with_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|field| (field.as_ref().to_string(), String::new()))
                .collect(),
            errors: FieldErrors::new(),
        }
    }

    pub fn values(&self) -> &Payload {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    pub(crate) fn set_value(&mut self, field: &str, value: String) -> bool {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_errors(&mut self, field: &str) -> bool {
        if !self.has_field(field) {
            return false;
        }
        self.errors.insert(field.to_string(), Vec::new());
        true
    }

    /// Replaces all errors. Entries for unknown fields are dropped and their
    /// names returned.
    pub(crate) fn replace_errors(&mut self, mut errors: FieldErrors) -> Vec<String> {
        let unknown: Vec<String> = errors
            .keys()
            .filter(|field| !self.values.contains_key(field.as_str()))
            .cloned()
            .collect();
        for field in &unknown {
            errors.remove(field);
        }
        self.errors = errors;
        unknown
    }
}
