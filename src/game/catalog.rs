//! Name catalog: the pool distractors are drawn from

use super::capitalize;

/// In-memory list of every known display name.
///
/// Empty until the listing arrives (or forever, if it failed), in which case
/// rounds degrade to offering only the correct answer.
#[derive(Debug, Clone, Default)]
pub struct NameCatalog {
    names: Vec<String>,
}

impl NameCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw API names, capitalizing each one
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: raw.into_iter().map(|n| capitalize(n.as_ref())).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
