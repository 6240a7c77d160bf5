use chrono::NaiveDate;
use serde::Deserialize;

use super::{FormErrors, optional, required};

/// Raw product form as posted by the browser. Every field defaults to empty so
/// missing inputs surface as validation messages instead of extractor rejections.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub weight: String,
    pub quantity: String,
    pub date_purchased: String,
    pub image_link: String,
}

/// Validated product fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub weight: String,
    pub quantity: String,
    pub date_purchased: NaiveDate,
    pub image_link: Option<String>,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = required(&mut errors, "name", &self.name);
        let weight = required(&mut errors, "weight", &self.weight);
        let quantity = required(&mut errors, "quantity", &self.quantity);
        let date_purchased = required(&mut errors, "date_purchased", &self.date_purchased)
            .and_then(|raw| match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("date_purchased", "must be a date (YYYY-MM-DD)");
                    None
                }
            });

        match (name, weight, quantity, date_purchased) {
            (Some(name), Some(weight), Some(quantity), Some(date_purchased))
                if errors.is_empty() =>
            {
                Ok(ProductInput {
                    name,
                    description: optional(&self.description),
                    weight,
                    quantity,
                    date_purchased,
                    image_link: optional(&self.image_link),
                })
            }
            _ => Err(errors),
        }
    }
}
