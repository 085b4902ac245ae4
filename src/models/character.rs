//! Base-info row of a character and its 1:1 satellite tables
//!
//! Satellites are correlated to the base row through `character_id`, declared
//! with `#[aggregate_id]`. The column is UNIQUE, so each character owns at
//! most one row per satellite table.

use crate::models::catalog::Realm;
use table_derive::model;
use uuid::Uuid;

/// Realm level every new character starts at
pub const STARTING_REALM_LEVEL: i32 = 1;

#[model]
#[table(name = "character_base_info")]
pub struct CharacterBaseInfo {
    #[primary_key]
    #[field(create)]
    pub id: Uuid,

    #[field(create, update)]
    pub name: String,

    #[field(create, update)]
    pub realm_level: i32,

    #[field(create, update)]
    pub cultivation: i64,

    #[field(create, update)]
    pub breakthrough_enabled: bool,

    #[field(create, update)]
    pub breakthrough_items_enabled: bool,

    #[field(create, update)]
    pub breakthrough_in_progress: bool,
}

impl CharacterBaseInfo {
    /// Fresh character at the starting realm with no progress
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            realm_level: STARTING_REALM_LEVEL,
            cultivation: 0,
            breakthrough_enabled: false,
            breakthrough_items_enabled: false,
            breakthrough_in_progress: false,
        }
    }

    /// Both enabling flags set and no breakthrough already running
    pub fn is_ready_for_breakthrough(&self) -> bool {
        self.breakthrough_enabled
            && self.breakthrough_items_enabled
            && !self.breakthrough_in_progress
    }
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_affinities", auto_increment)]
pub struct CharacterAffinities {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub metal: i32,

    #[field(create, update)]
    pub wood: i32,

    #[field(create, update)]
    pub water: i32,

    #[field(create, update)]
    pub fire: i32,

    #[field(create, update)]
    pub earth: i32,
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_strength", auto_increment)]
pub struct CharacterStrength {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub health: i64,

    #[field(create, update)]
    pub mana: i64,

    #[field(create, update)]
    pub attack: i32,

    #[field(create, update)]
    pub defense: i32,

    #[field(create, update)]
    pub speed: i32,
}

impl CharacterStrength {
    /// Strength matching the base values of `realm`
    pub fn from_realm(character_id: Uuid, realm: &Realm) -> Self {
        Self {
            id: 0,
            character_id,
            health: realm.base_health,
            mana: realm.base_mana,
            attack: realm.base_attack,
            defense: realm.base_defense,
            speed: realm.base_speed,
        }
    }
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_body_types", auto_increment)]
pub struct CharacterBodyTypes {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub body_type_slot_1: Option<i32>,

    #[field(create, update)]
    pub body_type_slot_2: Option<i32>,

    #[field(create, update)]
    pub body_type_slot_3: Option<i32>,
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_skills", auto_increment)]
pub struct CharacterSkills {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub skill_slot_1: Option<i32>,

    #[field(create, update)]
    pub skill_slot_2: Option<i32>,

    #[field(create, update)]
    pub skill_slot_3: Option<i32>,

    #[field(create, update)]
    pub skill_slot_4: Option<i32>,
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_weapons", auto_increment)]
pub struct CharacterWeapons {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub weapon_slot_1: Option<i32>,

    #[field(create, update)]
    pub weapon_slot_2: Option<i32>,
}

#[model]
#[derive(Default)]
#[serde(default)]
#[table(name = "character_wallets", auto_increment)]
pub struct CharacterWallet {
    #[primary_key]
    pub id: i64,

    #[aggregate_id]
    #[unique]
    #[field(create)]
    pub character_id: Uuid,

    #[field(create, update)]
    pub spirit_stones: i64,

    #[field(create, update)]
    pub gold: i64,

    #[field(create, update)]
    pub contribution: i64,
}
