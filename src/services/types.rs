//! Inputs and payloads of the character service

use crate::models::{
    CharacterAffinities, CharacterBaseInfo, CharacterBodyTypes, CharacterItem, CharacterSkills,
    CharacterStrength, CharacterWallet, CharacterWeapons,
};
use serde::{Deserialize, Serialize};

/// Request to create a character
///
/// Satellites left as `None` are not created. Their `id` and `character_id`
/// are assigned during creation and may be omitted from JSON input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub name: String,
    #[serde(default)]
    pub affinities: Option<CharacterAffinities>,
    #[serde(default)]
    pub strength: Option<CharacterStrength>,
    #[serde(default)]
    pub body_types: Option<CharacterBodyTypes>,
    #[serde(default)]
    pub skills: Option<CharacterSkills>,
    #[serde(default)]
    pub weapons: Option<CharacterWeapons>,
    #[serde(default)]
    pub wallet: Option<CharacterWallet>,
}

impl NewCharacter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Base row plus every satellite and inventory row that exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAggregate {
    pub base_info: CharacterBaseInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinities: Option<CharacterAffinities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<CharacterStrength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_types: Option<CharacterBodyTypes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<CharacterSkills>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapons: Option<CharacterWeapons>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<CharacterWallet>,
    #[serde(default)]
    pub items: Vec<CharacterItem>,
}

/// State after a successful breakthrough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakthroughOutcome {
    pub base_info: CharacterBaseInfo,
    pub strength: CharacterStrength,
}

/// Row counts across the character and catalog tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub character_count: i64,
    pub realm_count: i64,
    pub skill_count: i64,
    pub weapon_count: i64,
    pub item_count: i64,
}
