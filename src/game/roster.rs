//! Built-in local roster for Classic games
//!
//! Classic games run entirely offline: subjects and distractors both come
//! from this fixed list, and every subject guessed correctly is held back
//! until the roster is exhausted.

use crate::pokedex::{ImageRef, Subject};
use rand::prelude::*;
use std::collections::HashSet;

/// A roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: &'static str,
    pub emoji: &'static str,
    pub types: &'static [&'static str],
    pub height_dm: u32,
    pub weight_hg: u32,
}

impl Entry {
    pub fn to_subject(&self) -> Subject {
        Subject {
            name: self.name.to_string(),
            image: ImageRef::Emoji(self.emoji.to_string()),
            types: self.types.iter().map(|t| t.to_string()).collect(),
            height_dm: self.height_dm,
            weight_hg: self.weight_hg,
        }
    }
}

macro_rules! entry {
    ($name:literal, $emoji:literal, [$($ty:literal),+], $height:literal, $weight:literal) => {
        Entry {
            name: $name,
            emoji: $emoji,
            types: &[$($ty),+],
            height_dm: $height,
            weight_hg: $weight,
        }
    };
}

pub const LOCAL_ROSTER: [Entry; 12] = [
    entry!("Pikachu", "⚡", ["Electric"], 4, 60),
    entry!("Charizard", "🔥", ["Fire", "Flying"], 17, 905),
    entry!("Bulbasaur", "🌱", ["Grass", "Poison"], 7, 69),
    entry!("Squirtle", "💧", ["Water"], 5, 90),
    entry!("Jigglypuff", "🎵", ["Normal", "Fairy"], 5, 55),
    entry!("Meowth", "😺", ["Normal"], 4, 42),
    entry!("Psyduck", "🦆", ["Water"], 8, 196),
    entry!("Gengar", "👻", ["Ghost", "Poison"], 15, 405),
    entry!("Snorlax", "😴", ["Normal"], 21, 4600),
    entry!("Mewtwo", "🧬", ["Psychic"], 20, 1220),
    entry!("Eevee", "🦊", ["Normal"], 3, 65),
    entry!("Dragonite", "🐉", ["Dragon", "Flying"], 22, 2100),
];

/// Roster plus the set of subjects already guessed this game
#[derive(Debug, Clone)]
pub struct Roster {
    entries: &'static [Entry],
    guessed: HashSet<&'static str>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// The built-in twelve-entry roster
    pub fn new() -> Self {
        Self::with_entries(&LOCAL_ROSTER)
    }

    pub fn with_entries(entries: &'static [Entry]) -> Self {
        Self {
            entries,
            guessed: HashSet::new(),
        }
    }

    pub fn entries(&self) -> &'static [Entry] {
        self.entries
    }

    /// Every name on the roster, used as the distractor pool
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.to_string()).collect()
    }

    /// Entries not yet guessed
    pub fn remaining(&self) -> impl Iterator<Item = &'static Entry> + '_ {
        self.entries
            .iter()
            .filter(|e| !self.guessed.contains(e.name))
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().next().is_none()
    }

    /// Pick a random subject among those not yet guessed
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Subject> {
        let remaining: Vec<&Entry> = self.remaining().collect();
        remaining.choose(rng).map(|e| e.to_subject())
    }

    /// Hold a subject back for the rest of the game
    pub fn mark_guessed(&mut self, name: &str) {
        if let Some(entry) = self.entries.iter().find(|e| e.name == name) {
            self.guessed.insert(entry.name);
        }
    }

    pub fn is_guessed(&self, name: &str) -> bool {
        self.guessed.contains(name)
    }

    pub fn guessed_count(&self) -> usize {
        self.guessed.len()
    }

    /// Forget every guess
    pub fn reset(&mut self) {
        self.guessed.clear();
    }
}
