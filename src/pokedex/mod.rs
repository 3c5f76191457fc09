//! Pokémon data: subjects, the lookup seam, and the PokéAPI client
//!
//! This module provides:
//! - `Subject`, the Pokémon a round is about
//! - `PokemonLookup`, the trait every data source implements
//! - `PokeApi`, a blocking HTTP client for PokéAPI v2
//! - bounded retry with backoff for picking a random usable subject
//! - `Fetcher`, a worker thread that keeps lookups off the UI loop

pub mod api;
pub mod error;
pub mod fetcher;
pub mod retry;

pub use api::PokeApi;
pub use error::LookupError;
pub use fetcher::{Completion, FetchSettings, Fetcher};
pub use retry::{fetch_random_subject, RetryPolicy};

use std::fmt;

/// How a subject is pictured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Official artwork URL from the remote data source
    Sprite(String),
    /// Placeholder glyph from the local roster
    Emoji(String),
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Sprite(url) => f.write_str(url),
            ImageRef::Emoji(glyph) => f.write_str(glyph),
        }
    }
}

/// The Pokémon to identify in the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub image: ImageRef,
    pub types: Vec<String>,
    /// Height in decimeters
    pub height_dm: u32,
    /// Weight in hectograms (tenths of a kilogram)
    pub weight_hg: u32,
}

impl Subject {
    pub fn height_meters(&self) -> f64 {
        self.height_dm as f64 / 10.0
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_hg as f64 / 10.0
    }

    pub fn weight_lbs(&self) -> f64 {
        self.weight_kg() * 2.20462
    }

    /// One-line reference facts, e.g. `Electric-type · 0.4 m · 13.2 lbs`
    pub fn facts(&self) -> String {
        format!(
            "{}-type · {:.1} m · {:.1} lbs",
            self.types.join(" / "),
            self.height_meters(),
            self.weight_lbs()
        )
    }
}

/// A source of Pokémon records.
///
/// Implementations block; callers run them on the [`Fetcher`] thread.
pub trait PokemonLookup: Send {
    /// Fetch one record. A record without usable artwork is a
    /// [`LookupError::MissingSprite`].
    fn fetch_by_id(&self, id: u32) -> Result<Subject, LookupError>;

    /// Raw names of the first `limit` Pokémon
    fn list_names(&self, limit: u32) -> Result<Vec<String>, LookupError>;
}
