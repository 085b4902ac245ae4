//! Static reference catalogs
//!
//! Catalog rows are keyed by externally assigned ids and only read by the
//! character service.

use table_derive::model;

#[model]
#[table(name = "realms", reference)]
pub struct Realm {
    #[primary_key]
    #[field(create)]
    pub level: i32,

    #[field(create, update)]
    pub name: String,

    #[field(create, update)]
    pub base_health: i64,

    #[field(create, update)]
    pub base_mana: i64,

    #[field(create, update)]
    pub base_attack: i32,

    #[field(create, update)]
    pub base_defense: i32,

    #[field(create, update)]
    pub base_speed: i32,
}

#[model]
#[table(name = "items", reference)]
pub struct Item {
    #[primary_key]
    #[field(create)]
    pub id: i32,

    #[field(create, update)]
    pub name: String,

    #[field(create, update)]
    pub stackable: bool,

    #[field(create, update)]
    pub max_stack: i32,
}

impl Item {
    /// Largest count one inventory row may hold
    pub fn effective_max_stack(&self) -> i32 {
        if self.stackable { self.max_stack.max(1) } else { 1 }
    }
}

#[model]
#[table(name = "skills", reference)]
pub struct Skill {
    #[primary_key]
    #[field(create)]
    pub id: i32,

    #[field(create, update)]
    pub name: String,

    #[field(create, update)]
    pub power: i32,
}

#[model]
#[table(name = "weapons", reference)]
pub struct Weapon {
    #[primary_key]
    #[field(create)]
    pub id: i32,

    #[field(create, update)]
    pub name: String,

    #[field(create, update)]
    pub attack: i32,
}
