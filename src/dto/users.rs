use serde::Deserialize;

use super::{FormErrors, optional, required};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub current_products: String,
    pub past_products: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub current_products: Option<String>,
    pub past_products: Option<String>,
}

impl UserForm {
    pub fn validate(&self) -> Result<UserInput, FormErrors> {
        let mut errors = FormErrors::default();
        let first_name = required(&mut errors, "first_name", &self.first_name);
        let last_name = required(&mut errors, "last_name", &self.last_name);
        let age = required(&mut errors, "age", &self.age).and_then(|raw| {
            match raw.parse::<i32>() {
                Ok(age) if age >= 0 => Some(age),
                _ => {
                    errors.push("age", "must be a whole number");
                    None
                }
            }
        });

        match (first_name, last_name, age) {
            (Some(first_name), Some(last_name), Some(age)) if errors.is_empty() => Ok(UserInput {
                first_name,
                last_name,
                age,
                current_products: optional(&self.current_products),
                past_products: optional(&self.past_products),
            }),
            _ => Err(errors),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Form used to attach an existing product to a user.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LinkProductForm {
    pub product_id: String,
}
