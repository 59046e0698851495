use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced while defining or answering a quiz
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("\"{label}\" is not an option of step \"{step}\"")]
    UnknownOption { step: String, label: String },

    #[error("quiz is already complete")]
    Complete,

    #[error("invalid quiz definition: {0}")]
    InvalidDefinition(String),

    #[error("failed to read quiz definition: {0}")]
    Parse(String),
}

/// Visibility predicate evaluated against the answers given so far
pub type Visibility = Arc<dyn Fn(&AnswerTrail) -> bool + Send + Sync>;

/// Single selectable option of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub label: String,
}

/// One question of the quiz
#[derive(Clone)]
pub struct QuestionStep {
    pub key: String,
    pub prompt: String,
    pub options: Vec<QuizOption>,
    visible: Option<Visibility>,
}

impl QuestionStep {
    pub fn new<I, S>(key: impl Into<String>, prompt: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            options: options
                .into_iter()
                .map(|label| QuizOption { label: label.into() })
                .collect(),
            visible: None,
        }
    }

    /// Only present this step when `predicate` holds for the answers so far
    pub fn show_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AnswerTrail) -> bool + Send + Sync + 'static,
    {
        self.visible = Some(Arc::new(predicate));
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.visible.is_some()
    }

    pub fn is_visible(&self, trail: &AnswerTrail) -> bool {
        self.visible.as_ref().map_or(true, |predicate| predicate(trail))
    }

    pub fn has_option(&self, label: &str) -> bool {
        self.options.iter().any(|o| o.label == label)
    }
}

impl fmt::Debug for QuestionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionStep")
            .field("key", &self.key)
            .field("prompt", &self.prompt)
            .field("options", &self.options)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}

/// Answer given to one presented step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub step: String,
    pub label: String,
}

/// Ordered record of the answers given during one quiz pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerTrail {
    answers: Vec<Answer>,
}

impl AnswerTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Into<String>, label: impl Into<String>) {
        self.answers.push(Answer {
            step: step.into(),
            label: label.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Label of the answer at `position` in presentation order
    pub fn get(&self, position: usize) -> Option<&str> {
        self.answers.get(position).map(|a| a.label.as_str())
    }

    /// Label given to the step named `key`, if that step was presented
    pub fn answer_for(&self, key: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.step == key)
            .map(|a| a.label.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.label.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.answers.iter()
    }
}

/// Immutable quiz definition shared by every session
#[derive(Debug, Clone)]
pub struct Quiz {
    steps: Vec<QuestionStep>,
    gender_step: String,
}

pub const DEFAULT_GENDER_STEP: &str = "gender";

impl Quiz {
    pub fn new(steps: Vec<QuestionStep>) -> Result<Self, QuizError> {
        for (i, step) in steps.iter().enumerate() {
            if step.key.trim().is_empty() {
                return Err(QuizError::InvalidDefinition(format!("step {} has an empty key", i)));
            }
            if step.options.is_empty() {
                return Err(QuizError::InvalidDefinition(format!(
                    "step \"{}\" has no options",
                    step.key
                )));
            }
            if steps[..i].iter().any(|earlier| earlier.key == step.key) {
                return Err(QuizError::InvalidDefinition(format!(
                    "duplicate step key \"{}\"",
                    step.key
                )));
            }
        }

        Ok(Self {
            steps,
            gender_step: DEFAULT_GENDER_STEP.to_string(),
        })
    }

    /// Name the step whose answer is forwarded as the gender hint
    pub fn with_gender_step(mut self, key: impl Into<String>) -> Self {
        self.gender_step = key.into();
        self
    }

    /// The questionnaire shipped with the storefront
    pub fn builtin() -> Self {
        let steps = vec![
            QuestionStep::new(
                "audience",
                "Для кого ви шукаєте товар?",
                ["Для себе", "Для нас обох", "Для гігієни та здоров'я", "Для подарунка"],
            ),
            QuestionStep::new(DEFAULT_GENDER_STEP, "Яка ваша стать?", ["Жінка", "Чоловік"])
                .show_if(|trail| trail.answer_for("audience") == Some("Для себе")),
        ];

        Self {
            steps,
            gender_step: DEFAULT_GENDER_STEP.to_string(),
        }
    }

    /// Load a quiz from a TOML definition file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| QuizError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    /// Parse a quiz from TOML
    ///
    /// ```toml
    /// [[steps]]
    /// key = "audience"
    /// prompt = "For whom?"
    /// options = ["Self", "Gift"]
    ///
    /// [[steps]]
    /// key = "gender"
    /// prompt = "Gender?"
    /// options = ["F", "M"]
    /// show_if = { step = "audience", equals = "Self" }
    /// ```
    pub fn from_toml(raw: &str) -> Result<Self, QuizError> {
        let definition: QuizDefinition =
            toml::from_str(raw).map_err(|e| QuizError::Parse(e.to_string()))?;
        definition.compile()
    }

    pub fn steps(&self) -> &[QuestionStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&QuestionStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn gender_step(&self) -> &str {
        &self.gender_step
    }

    /// First index at or after `from` whose step is visible for `trail`
    fn next_visible(&self, from: usize, trail: &AnswerTrail) -> Option<usize> {
        (from..self.steps.len()).find(|&i| self.steps[i].is_visible(trail))
    }
}

/// Declarative quiz file format
#[derive(Debug, Deserialize)]
struct QuizDefinition {
    #[serde(default)]
    gender_step: Option<String>,
    #[serde(default)]
    steps: Vec<StepDefinition>,
}

#[derive(Debug, Deserialize)]
struct StepDefinition {
    key: String,
    prompt: String,
    options: Vec<String>,
    #[serde(default)]
    show_if: Option<ShowIf>,
}

/// Condition on the answer given to an earlier step
#[derive(Debug, Clone, Deserialize)]
struct ShowIf {
    step: String,
    #[serde(default)]
    equals: Option<String>,
    #[serde(default)]
    any_of: Vec<String>,
}

impl QuizDefinition {
    fn compile(self) -> Result<Quiz, QuizError> {
        let mut steps = Vec::with_capacity(self.steps.len());

        for def in self.steps {
            let mut step = QuestionStep::new(def.key, def.prompt, def.options);

            if let Some(cond) = def.show_if {
                if !steps.iter().any(|s: &QuestionStep| s.key == cond.step) {
                    return Err(QuizError::InvalidDefinition(format!(
                        "step \"{}\" depends on \"{}\", which is not an earlier step",
                        step.key, cond.step
                    )));
                }

                let mut accepted = cond.any_of;
                accepted.extend(cond.equals);
                if accepted.is_empty() {
                    return Err(QuizError::InvalidDefinition(format!(
                        "show_if of step \"{}\" needs `equals` or `any_of`",
                        step.key
                    )));
                }

                let dependency = cond.step;
                step = step.show_if(move |trail| {
                    trail
                        .answer_for(&dependency)
                        .is_some_and(|label| accepted.iter().any(|a| a == label))
                });
            }

            steps.push(step);
        }

        let quiz = Quiz::new(steps)?;
        Ok(match self.gender_step {
            Some(key) => quiz.with_gender_step(key),
            None => quiz,
        })
    }
}

/// Outcome of answering the active step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizProgress {
    Next { index: usize },
    Complete { answers: AnswerTrail },
}

/// Walks a quiz forward, skipping hidden steps
#[derive(Debug, Clone)]
pub struct QuizEngine {
    quiz: Arc<Quiz>,
    current: Option<usize>,
    trail: AnswerTrail,
}

impl QuizEngine {
    pub fn new(quiz: Arc<Quiz>) -> Self {
        let trail = AnswerTrail::new();
        let current = quiz.next_visible(0, &trail);
        Self { quiz, current, trail }
    }

    pub fn quiz(&self) -> &Arc<Quiz> {
        &self.quiz
    }

    /// Index of the step awaiting an answer
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_step(&self) -> Option<&QuestionStep> {
        self.current.and_then(|i| self.quiz.step(i))
    }

    pub fn trail(&self) -> &AnswerTrail {
        &self.trail
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_none()
    }

    /// Record `label` for the active step and move to the next visible one
    pub fn answer(&mut self, label: &str) -> Result<QuizProgress, QuizError> {
        let index = self.current.ok_or(QuizError::Complete)?;
        let step = &self.quiz.steps[index];

        if !step.has_option(label) {
            return Err(QuizError::UnknownOption {
                step: step.key.clone(),
                label: label.to_string(),
            });
        }

        self.trail.push(step.key.clone(), label);
        self.current = self.quiz.next_visible(index + 1, &self.trail);

        Ok(match self.current {
            Some(index) => QuizProgress::Next { index },
            None => QuizProgress::Complete {
                answers: self.trail.clone(),
            },
        })
    }

    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.quiz));
    }
}
