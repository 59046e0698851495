use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::{Quiz, SessionState};
use crate::models::domain::{Product, ProductId, Stage};

/// Response of the catalog swipe endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatesResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Product as rendered on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: serde_json::Value,
    pub image: Option<String>,
    pub url: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price.clone(),
            image: product.primary_image().map(str::to_string),
            url: product.detail_url.clone(),
        }
    }
}

fn cards(products: &[Product]) -> Vec<ProductCard> {
    products.iter().map(ProductCard::from).collect()
}

/// Question awaiting an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub index: usize,
    pub key: String,
    pub prompt: String,
    pub options: Vec<String>,
}

/// Card awaiting a decision; `position` is one-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub product: ProductCard,
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub liked: Vec<ProductCard>,
    pub gender_recommendations: Vec<ProductCard>,
    pub additional_recommendations: Vec<ProductCard>,
}

/// Everything a client needs to render the current session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub stage: Stage,
    pub loading: bool,
    pub error: Option<String>,
    pub answers: Vec<String>,
    pub question: Option<QuestionView>,
    pub card: Option<CardView>,
    pub results: Option<ResultsView>,
}

impl SessionView {
    pub fn render(session_id: Uuid, state: &SessionState) -> Self {
        let stage = state.ui.stage;

        let question = match stage {
            Stage::Quiz => state.quiz.current_index().and_then(|index| {
                state.quiz.current_step().map(|step| QuestionView {
                    index,
                    key: step.key.clone(),
                    prompt: step.prompt.clone(),
                    options: step.options.iter().map(|o| o.label.clone()).collect(),
                })
            }),
            _ => None,
        };

        let card = match stage {
            Stage::Swipe => state.swipe.current().map(|product| CardView {
                product: ProductCard::from(product),
                position: state.swipe.cursor() + 1,
                total: state.swipe.len(),
            }),
            _ => None,
        };

        let results = match (stage, &state.result) {
            (Stage::Results, Some(result)) => Some(ResultsView {
                liked: cards(&state.swipe.liked()),
                gender_recommendations: cards(&result.gender_recommendations),
                additional_recommendations: cards(&result.additional_recommendations),
            }),
            _ => None,
        };

        Self {
            session_id,
            stage,
            loading: state.ui.loading,
            error: state.ui.error.map(|e| e.to_string()),
            answers: state.quiz.trail().labels(),
            question,
            card,
            results,
        }
    }
}

/// Quiz definition as published to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub gender_step: String,
    pub steps: Vec<QuizStepView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStepView {
    pub key: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub conditional: bool,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            gender_step: quiz.gender_step().to_string(),
            steps: quiz
                .steps()
                .iter()
                .map(|s| QuizStepView {
                    key: s.key.clone(),
                    prompt: s.prompt.clone(),
                    options: s.options.iter().map(|o| o.label.clone()).collect(),
                    conditional: s.is_conditional(),
                })
                .collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub active_sessions: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
