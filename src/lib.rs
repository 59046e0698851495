//! Swipe Quiz - quiz-and-swipe product recommender sessions
//!
//! This library walks a user through a branching questionnaire, a like/dislike
//! pass over products picked by the remote catalog, and finally the catalog's
//! recommendations. Session logic is a pure reducer; remote calls are issued as
//! commands and fed back as ticketed events.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{Event, Quiz, QuizEngine, SessionState, StageController, SwipeSession};
pub use models::{Product, Recommendations, SessionView, Stage};
pub use services::{CatalogClient, CatalogService, SessionStore};
