//! Wire types for the public creature catalog.
//!
//! Only the subset of the catalog payload the viewer reads is modelled; every
//! other key in the response body is ignored during decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the static artwork entry inside `sprites.other`.
pub const OFFICIAL_ARTWORK_KEY: &str = "official-artwork";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedResource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NamedResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbilitySlot {
    pub slot: u8,
    #[serde(default)]
    pub is_hidden: bool,
    pub ability: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ArtworkSprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<ArtworkSprites>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SpriteSet {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

/// A single catalog entry as returned by `GET {base}/{id}`.
///
/// Height is in tenths of a metre and weight in tenths of a kilogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatureRecord {
    pub id: u32,
    pub name: String,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub sprites: SpriteSet,
}

impl CreatureRecord {
    /// Category names in slot order.
    pub fn category_names(&self) -> Vec<&str> {
        let mut slots: Vec<&TypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|slot| slot.slot);
        slots.into_iter().map(|slot| slot.kind.name.as_str()).collect()
    }

    /// Trait (ability) names in slot order.
    pub fn trait_names(&self) -> Vec<&str> {
        let mut slots: Vec<&AbilitySlot> = self.abilities.iter().collect();
        slots.sort_by_key(|slot| slot.slot);
        slots
            .into_iter()
            .map(|slot| slot.ability.name.as_str())
            .collect()
    }

    pub fn official_artwork(&self) -> Option<&str> {
        self.sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn front_default(&self) -> Option<&str> {
        self.sprites
            .front_default
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum RecordDecodeError {
    #[error("invalid record json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record has non-positive identifier")]
    InvalidId,
    #[error("record {0} lists no categories")]
    MissingCategories(u32),
}

/// Decode and validate a catalog response body.
pub fn decode_record_json(data: &str) -> Result<CreatureRecord, RecordDecodeError> {
    let record: CreatureRecord = serde_json::from_str(data)?;
    if record.id == 0 {
        return Err(RecordDecodeError::InvalidId);
    }
    if record.types.is_empty() {
        return Err(RecordDecodeError::MissingCategories(record.id));
    }
    Ok(record)
}

pub fn encode_record_json(record: &CreatureRecord) -> serde_json::Result<String> {
    serde_json::to_string(record)
}
