//! Table models of the character aggregate and the reference catalogs

pub mod catalog;
pub mod character;
pub mod inventory;

pub use catalog::{Item, ItemColumn, Realm, RealmColumn, Skill, SkillColumn, Weapon, WeaponColumn};
pub use character::{
    CharacterAffinities, CharacterAffinitiesColumn, CharacterBaseInfo, CharacterBaseInfoColumn,
    CharacterBodyTypes, CharacterBodyTypesColumn, CharacterSkills, CharacterSkillsColumn,
    CharacterStrength, CharacterStrengthColumn, CharacterWallet, CharacterWalletColumn,
    CharacterWeapons, CharacterWeaponsColumn,
};
pub use inventory::{CharacterItem, CharacterItemColumn};
