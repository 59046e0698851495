// Core session logic exports
pub mod controller;
pub mod quiz;
pub mod swipe;

pub use controller::{Command, ControllerError, Event, FetchFailure, SessionState, StageController, Transition, UiState};
pub use quiz::{Answer, AnswerTrail, QuestionStep, Quiz, QuizEngine, QuizError, QuizOption, QuizProgress};
pub use swipe::{SwipeError, SwipeProgress, SwipeSession};
