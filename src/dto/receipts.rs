use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Quantity reported when the receipt carries no `Qty` token.
pub const DEFAULT_QUANTITY: &str = "90";

/// One region of text recognized by the OCR service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextFragment {
    pub text: String,
    #[serde(default)]
    pub bounding_poly: Vec<Vertex>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounding_poly: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ColorChannels {
    #[serde(rename = "Red")]
    pub red: u8,
    #[serde(rename = "Green")]
    pub green: u8,
    #[serde(rename = "Blue")]
    pub blue: u8,
}

/// Fields read off a pharmacy receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceiptFields {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Fill Date")]
    pub fill_date: Option<String>,
    #[serde(rename = "RX")]
    pub rx_number: Option<String>,
    #[serde(rename = "Qty")]
    pub quantity: String,
    #[serde(rename = "date-to-take")]
    pub date_to_take: Option<String>,
    #[serde(flatten)]
    pub color_channels: ColorChannels,
}

impl Default for ReceiptFields {
    fn default() -> Self {
        Self {
            name: None,
            fill_date: None,
            rx_number: None,
            quantity: DEFAULT_QUANTITY.to_string(),
            date_to_take: None,
            color_channels: ColorChannels::default(),
        }
    }
}
