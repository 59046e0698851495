use crate::models::Product;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwipeError {
    #[error("no candidates left to decide on")]
    Exhausted,
}

/// Outcome of a like/dislike decision
#[derive(Debug, Clone, PartialEq)]
pub enum SwipeProgress {
    /// Another card is pending; `position` is zero-based
    Next { position: usize },
    Complete { liked: Vec<Product> },
}

/// Cursor over the fetched candidates plus the liked subset
///
/// Likes are kept as ascending candidate indices, so the liked list is always
/// a duplicate-free subsequence of the candidates.
#[derive(Debug, Clone, Default)]
pub struct SwipeSession {
    candidates: Vec<Product>,
    cursor: usize,
    liked: Vec<usize>,
}

impl SwipeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&mut self, candidates: Vec<Product>) {
        self.candidates = candidates;
        self.cursor = 0;
        self.liked.clear();
    }

    pub fn decide(&mut self, is_liked: bool) -> Result<SwipeProgress, SwipeError> {
        if self.is_complete() {
            return Err(SwipeError::Exhausted);
        }

        if is_liked {
            self.liked.push(self.cursor);
        }
        self.cursor += 1;

        Ok(if self.is_complete() {
            SwipeProgress::Complete { liked: self.liked() }
        } else {
            SwipeProgress::Next { position: self.cursor }
        })
    }

    pub fn current(&self) -> Option<&Product> {
        self.candidates.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    pub fn candidates(&self) -> &[Product] {
        &self.candidates
    }

    pub fn liked(&self) -> Vec<Product> {
        self.liked.iter().map(|&i| self.candidates[i].clone()).collect()
    }

    pub fn liked_count(&self) -> usize {
        self.liked.len()
    }

    pub fn reset(&mut self) {
        self.initialize(Vec::new());
    }
}
