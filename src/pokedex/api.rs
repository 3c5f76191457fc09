use crate::game::capitalize;
use crate::pokedex::{ImageRef, LookupError, PokemonLookup, Subject};

use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Blocking client for PokéAPI v2
#[derive(Debug, Clone)]
pub struct PokeApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PokeApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::info!("PokéAPI session started ({base_url})");

        Ok(Self { client, base_url })
    }
}

impl PokemonLookup for PokeApi {
    fn fetch_by_id(&self, id: u32) -> Result<Subject, LookupError> {
        let url = format!("{}/pokemon/{id}", self.base_url);
        tracing::debug!("Fetching pokemon: {url}");

        let response = self.client.get(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(id));
        }

        let record: PokemonRecord = response.error_for_status()?.json()?;
        record.into_subject()
    }

    fn list_names(&self, limit: u32) -> Result<Vec<String>, LookupError> {
        let url = format!("{}/pokemon?limit={limit}", self.base_url);
        tracing::info!("Fetching name listing: {url}");

        let listing: Listing = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(listing.results.into_iter().map(|r| r.name).collect())
    }
}

#[derive(Debug, Deserialize)]
struct PokemonRecord {
    id: u32,
    name: String,
    height: u32,
    weight: u32,
    sprites: Sprites,
    types: Vec<TypeSlot>,
}

impl PokemonRecord {
    fn into_subject(self) -> Result<Subject, LookupError> {
        let sprite = self
            .sprites
            .other
            .and_then(|other| other.official_artwork)
            .and_then(|artwork| artwork.front_default)
            .filter(|url| !url.is_empty())
            .ok_or(LookupError::MissingSprite(self.id))?;

        Ok(Subject {
            name: capitalize(&self.name),
            image: ImageRef::Sprite(sprite),
            types: self
                .types
                .into_iter()
                .map(|slot| capitalize(&slot.kind.name))
                .collect(),
            height_dm: self.height,
            weight_hg: self.weight,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Sprites {
    #[serde(default)]
    other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<Artwork>,
}

#[derive(Debug, Deserialize)]
struct Artwork {
    #[serde(default)]
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    results: Vec<NamedResource>,
}
