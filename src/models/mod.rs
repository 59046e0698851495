// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Product, ProductId, Recommendations, Stage};
pub use requests::{AnswerRequest, CandidatesRequest, RecommendationsRequest, SwipeRequest};
pub use responses::{
    CandidatesResponse, CardView, ErrorResponse, HealthResponse, ProductCard, QuestionView, QuizView,
    ResultsView, SessionView,
};
