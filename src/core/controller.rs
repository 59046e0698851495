use crate::core::quiz::{Quiz, QuizEngine, QuizError, QuizProgress};
use crate::core::swipe::{SwipeError, SwipeProgress, SwipeSession};
use crate::models::{Product, Recommendations, Stage};
use std::sync::Arc;
use thiserror::Error;

/// Failure of one of the two remote catalog calls, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("Не вдалося завантажити товари для свайпу")]
    CandidatesFetchFailed,

    #[error("Не вдалося отримати рекомендації")]
    RecommendationsFetchFailed,
}

/// Inputs the controller refuses in its current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("a request is already in flight")]
    Busy,

    #[error("expected stage {expected}, session is in {actual}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("nothing to retry")]
    NothingToRetry,

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Swipe(#[from] SwipeError),
}

/// Visible UI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub stage: Stage,
    pub loading: bool,
    pub error: Option<FetchFailure>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            stage: Stage::Quiz,
            loading: false,
            error: None,
        }
    }
}

/// Everything that can change a session
#[derive(Debug, Clone)]
pub enum Event {
    Answer(String),
    Swipe(bool),
    Retry,
    Restart,
    CandidatesLoaded {
        ticket: u64,
        outcome: Result<Vec<Product>, FetchFailure>,
    },
    RecommendationsLoaded {
        ticket: u64,
        outcome: Result<Recommendations, FetchFailure>,
    },
}

/// Remote call the caller must perform and report back as an event
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchCandidates {
        ticket: u64,
        answers: Vec<String>,
    },
    FetchRecommendations {
        ticket: u64,
        liked: Vec<Product>,
        gender: Option<String>,
    },
}

impl Command {
    pub fn ticket(&self) -> u64 {
        match self {
            Command::FetchCandidates { ticket, .. } | Command::FetchRecommendations { ticket, .. } => {
                *ticket
            }
        }
    }
}

/// Immutable snapshot of one user session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub quiz: QuizEngine,
    pub swipe: SwipeSession,
    pub result: Option<Recommendations>,
    pub ui: UiState,
    pub generation: u64,
}

/// Result of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub command: Option<Command>,
}

impl SessionState {
    /// Fresh session at the first question
    ///
    /// A quiz with no visible steps completes immediately, so the first
    /// transition may already carry a candidates request.
    pub fn start(quiz: Arc<Quiz>) -> Transition {
        Self::fresh(quiz, 0)
    }

    fn fresh(quiz: Arc<Quiz>, generation: u64) -> Transition {
        let mut state = SessionState {
            quiz: QuizEngine::new(quiz),
            swipe: SwipeSession::new(),
            result: None,
            ui: UiState::default(),
            generation,
        };

        let command = if state.quiz.is_complete() {
            Some(state.request_candidates())
        } else {
            None
        };

        Transition { state, command }
    }

    /// Pure transition function: `(state, event) -> (state, command)`
    pub fn reduce(&self, event: Event) -> Result<Transition, ControllerError> {
        match event {
            Event::Restart => Ok(Self::fresh(
                Arc::clone(self.quiz.quiz()),
                self.generation + 1,
            )),
            Event::Answer(label) => self.on_answer(&label),
            Event::Swipe(is_liked) => self.on_swipe(is_liked),
            Event::Retry => self.on_retry(),
            Event::CandidatesLoaded { ticket, outcome } => Ok(self.on_candidates(ticket, outcome)),
            Event::RecommendationsLoaded { ticket, outcome } => {
                Ok(self.on_recommendations(ticket, outcome))
            }
        }
    }

    fn expect_input(&self, expected: Stage) -> Result<(), ControllerError> {
        if self.ui.loading {
            return Err(ControllerError::Busy);
        }
        if self.ui.stage != expected {
            return Err(ControllerError::WrongStage {
                expected,
                actual: self.ui.stage,
            });
        }
        Ok(())
    }

    fn on_answer(&self, label: &str) -> Result<Transition, ControllerError> {
        self.expect_input(Stage::Quiz)?;

        let mut next = self.clone();
        let command = match next.quiz.answer(label)? {
            QuizProgress::Next { .. } => None,
            QuizProgress::Complete { .. } => Some(next.request_candidates()),
        };

        Ok(Transition { state: next, command })
    }

    fn on_swipe(&self, is_liked: bool) -> Result<Transition, ControllerError> {
        self.expect_input(Stage::Swipe)?;

        let mut next = self.clone();
        let command = match next.swipe.decide(is_liked)? {
            SwipeProgress::Next { .. } => None,
            SwipeProgress::Complete { .. } => Some(next.request_recommendations()),
        };

        Ok(Transition { state: next, command })
    }

    fn on_retry(&self) -> Result<Transition, ControllerError> {
        if self.ui.loading {
            return Err(ControllerError::Busy);
        }

        let mut next = self.clone();
        let command = match (self.ui.stage, self.ui.error) {
            (Stage::Quiz, Some(FetchFailure::CandidatesFetchFailed)) if self.quiz.is_complete() => {
                next.request_candidates()
            }
            (Stage::Swipe, Some(FetchFailure::RecommendationsFetchFailed))
                if self.swipe.is_complete() =>
            {
                next.request_recommendations()
            }
            _ => return Err(ControllerError::NothingToRetry),
        };

        Ok(Transition {
            state: next,
            command: Some(command),
        })
    }

    fn on_candidates(&self, ticket: u64, outcome: Result<Vec<Product>, FetchFailure>) -> Transition {
        if !self.awaits(ticket, Stage::Quiz) {
            tracing::debug!(ticket, generation = self.generation, "Ignoring stale candidates response");
            return self.unchanged();
        }

        let mut next = self.clone();
        next.ui.loading = false;

        let command = match outcome {
            Ok(candidates) => {
                tracing::debug!(count = candidates.len(), "Swipe candidates received");
                next.swipe.initialize(candidates);
                next.ui.stage = Stage::Swipe;
                next.ui.error = None;
                if next.swipe.is_complete() {
                    Some(next.request_recommendations())
                } else {
                    None
                }
            }
            Err(failure) => {
                next.ui.error = Some(failure);
                None
            }
        };

        Transition { state: next, command }
    }

    fn on_recommendations(
        &self,
        ticket: u64,
        outcome: Result<Recommendations, FetchFailure>,
    ) -> Transition {
        if !self.awaits(ticket, Stage::Swipe) {
            tracing::debug!(ticket, generation = self.generation, "Ignoring stale recommendations response");
            return self.unchanged();
        }

        let mut next = self.clone();
        next.ui.loading = false;

        match outcome {
            Ok(result) => {
                next.result = Some(result);
                next.ui.stage = Stage::Results;
                next.ui.error = None;
            }
            Err(failure) => {
                next.ui.error = Some(failure);
            }
        }

        Transition {
            state: next,
            command: None,
        }
    }

    /// Whether a completion tagged `ticket` belongs to the call now outstanding
    fn awaits(&self, ticket: u64, stage: Stage) -> bool {
        ticket == self.generation && self.ui.loading && self.ui.stage == stage
    }

    fn unchanged(&self) -> Transition {
        Transition {
            state: self.clone(),
            command: None,
        }
    }

    fn request_candidates(&mut self) -> Command {
        self.ui.loading = true;
        self.ui.error = None;
        Command::FetchCandidates {
            ticket: self.generation,
            answers: self.quiz.trail().labels(),
        }
    }

    fn request_recommendations(&mut self) -> Command {
        self.ui.loading = true;
        self.ui.error = None;
        Command::FetchRecommendations {
            ticket: self.generation,
            liked: self.swipe.liked(),
            gender: self.gender(),
        }
    }

    /// Answer to the configured gender step, if that step was presented
    pub fn gender(&self) -> Option<String> {
        let quiz = self.quiz.quiz();
        self.quiz
            .trail()
            .answer_for(quiz.gender_step())
            .map(str::to_string)
    }
}

/// Owner of a session's state; applies events and hands back commands
#[derive(Debug, Clone)]
pub struct StageController {
    state: SessionState,
}

impl StageController {
    /// Create a controller and return any command the initial state needs
    pub fn new(quiz: Arc<Quiz>) -> (Self, Option<Command>) {
        let Transition { state, command } = SessionState::start(quiz);
        (Self { state }, command)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dispatch(&mut self, event: Event) -> Result<Option<Command>, ControllerError> {
        let Transition { state, command } = self.state.reduce(event)?;
        self.state = state;
        Ok(command)
    }

    pub fn handle_answer(&mut self, label: impl Into<String>) -> Result<Option<Command>, ControllerError> {
        self.dispatch(Event::Answer(label.into()))
    }

    pub fn handle_swipe(&mut self, is_liked: bool) -> Result<Option<Command>, ControllerError> {
        self.dispatch(Event::Swipe(is_liked))
    }

    pub fn retry(&mut self) -> Result<Option<Command>, ControllerError> {
        self.dispatch(Event::Retry)
    }

    pub fn restart(&mut self) -> Result<Option<Command>, ControllerError> {
        self.dispatch(Event::Restart)
    }
}
