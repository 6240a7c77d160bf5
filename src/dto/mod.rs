use std::fmt;

pub mod products;
pub mod receipts;
pub mod users;

/// Field-level validation messages collected while checking a form.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{field} {message}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, "is required");
        None
    } else {
        Some(value.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
