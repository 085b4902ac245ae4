//! Inventory rows (1:n per character)

use table_derive::model;
use uuid::Uuid;

/// One stack or single instance of a catalog item held by a character
///
/// At most one row per (character, slot) may be equipped at a time.
#[model]
#[table(name = "character_items")]
pub struct CharacterItem {
    #[primary_key]
    #[field(create)]
    pub instance_id: Uuid,

    #[aggregate_id]
    #[field(create)]
    pub character_id: Uuid,

    #[index]
    #[field(create)]
    pub item_id: i32,

    #[field(create, update)]
    pub count: i32,

    #[field(create, update)]
    pub level: i32,

    #[field(create, update)]
    pub equipped: bool,

    #[field(create, update)]
    pub slot: Option<i32>,
}

impl CharacterItem {
    /// Unequipped row with a fresh instance id
    pub fn new(character_id: Uuid, item_id: i32, count: i32, level: i32) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            character_id,
            item_id,
            count,
            level,
            equipped: false,
            slot: None,
        }
    }
}
