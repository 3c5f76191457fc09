use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(Arc<reqwest::Error>),
    #[error("pokemon #{0} not found")]
    NotFound(u32),
    #[error("pokemon #{0} has no artwork")]
    MissingSprite(u32),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<LookupError>,
    },
}

impl LookupError {
    /// Soft failures are retried with a different subject without
    /// surfacing anything to the player.
    pub fn is_soft(&self) -> bool {
        matches!(self, LookupError::MissingSprite(_) | LookupError::NotFound(_))
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(Arc::new(error))
    }
}
