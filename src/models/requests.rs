use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::Product;

/// Answer the active quiz question
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1))]
    pub label: String,
}

/// Like or dislike the current card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeRequest {
    pub liked: bool,
}

/// Body of `POST /products/swipe` on the catalog service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesRequest {
    pub answers: Vec<String>,
    #[serde(default)]
    pub excluded_ids: Vec<String>,
}

/// Body of `POST /products/recommendations` on the catalog service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsRequest {
    pub liked_products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}
