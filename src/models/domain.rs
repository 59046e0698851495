use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque product identifier as issued by the catalog service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl Default for ProductId {
    fn default() -> Self {
        ProductId::Text(String::new())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// Product as returned by the catalog service
///
/// Fields the client does not know about are kept in `extra`, and the price is
/// kept as the raw JSON value, so that liked products go back to the
/// recommendation endpoint as received. Known fields sent as `null` decode to
/// their empty defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub price: Value,
    #[serde(rename = "picture", default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(rename = "url", default, deserialize_with = "null_as_default")]
    pub detail_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: ProductId::Text(id.into()),
            name: name.into(),
            price: Value::from(price),
            images: Vec::new(),
            detail_url: String::new(),
            extra: Map::new(),
        }
    }

    /// First image, used as the card thumbnail
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Numeric price; prices arrive either as JSON numbers or as numeric strings
    pub fn price_amount(&self) -> Option<f64> {
        match &self.price {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Output of the recommendation service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub gender_recommendations: Vec<Product>,
    #[serde(default)]
    pub additional_recommendations: Vec<Product>,
}

/// Top-level phase of a user session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Quiz,
    Swipe,
    Results,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Quiz => "quiz",
            Stage::Swipe => "swipe",
            Stage::Results => "results",
        };
        f.write_str(name)
    }
}
