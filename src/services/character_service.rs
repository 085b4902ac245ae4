//! Character domain service
//!
//! Composes the table stores into multi-table operations. Every operation
//! that writes more than one row runs inside one `Transaction`; breakthrough,
//! equip and item removal additionally hold a row lock so concurrent calls
//! for the same character or stack are serialized.

use crate::core::Registry;
use crate::errors::ServiceError;
use crate::models::{
    CharacterAffinities, CharacterBaseInfo, CharacterBaseInfoColumn, CharacterBodyTypes,
    CharacterItem, CharacterItemColumn, CharacterSkills, CharacterStrength,
    CharacterStrengthColumn, CharacterWallet, CharacterWeapons, Item, Realm, Skill, Weapon,
};
use crate::services::types::{
    BreakthroughOutcome, CharacterAggregate, NewCharacter, Statistics,
};
use config::ServiceConfig;
use sqlx::PgConnection;
use std::sync::Arc;
use store_object::{
    AggregateOwned, AggregateScoped, Conditions, DatabaseExecutor, IsolationLevel, Page,
    QueryOptions, ReferenceStore, StoreError, StoreObject, TableStore, UpdateSet,
};
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 64;

/// Attempts at merging into an existing stack before a new row is created
const MAX_STACK_ATTEMPTS: usize = 3;

/// Stores of every table in the character aggregate
#[derive(Clone)]
struct AggregateStores {
    base: Arc<TableStore<CharacterBaseInfo>>,
    affinities: Arc<TableStore<CharacterAffinities>>,
    strength: Arc<TableStore<CharacterStrength>>,
    body_types: Arc<TableStore<CharacterBodyTypes>>,
    skills: Arc<TableStore<CharacterSkills>>,
    weapons: Arc<TableStore<CharacterWeapons>>,
    wallet: Arc<TableStore<CharacterWallet>>,
    items: Arc<TableStore<CharacterItem>>,
}

impl AggregateStores {
    fn from_registry(registry: &Registry) -> Self {
        Self {
            base: registry.store(),
            affinities: registry.store(),
            strength: registry.store(),
            body_types: registry.store(),
            skills: registry.store(),
            weapons: registry.store(),
            wallet: registry.store(),
            items: registry.store(),
        }
    }

    /// Read every satellite and the inventory of `base_info` on one connection
    async fn load_on(
        &self,
        conn: &mut PgConnection,
        base_info: CharacterBaseInfo,
    ) -> Result<CharacterAggregate, StoreError> {
        let id = base_info.id;
        Ok(CharacterAggregate {
            affinities: self.affinities.find_by_aggregate_id_on(conn, id).await?,
            strength: self.strength.find_by_aggregate_id_on(conn, id).await?,
            body_types: self.body_types.find_by_aggregate_id_on(conn, id).await?,
            skills: self.skills.find_by_aggregate_id_on(conn, id).await?,
            weapons: self.weapons.find_by_aggregate_id_on(conn, id).await?,
            wallet: self.wallet.find_by_aggregate_id_on(conn, id).await?,
            items: self.items.find_all_by_aggregate_id_on(conn, id).await?,
            base_info,
        })
    }
}

async fn create_satellite_on<T>(
    store: &TableStore<T>,
    conn: &mut PgConnection,
    character_id: Uuid,
    data: Option<T>,
) -> Result<Option<T>, StoreError>
where
    T: AggregateOwned<AggregateId = Uuid> + DatabaseExecutor,
{
    match data {
        Some(row) => Ok(Some(
            store.create_for_aggregate_on(conn, character_id, row).await?,
        )),
        None => Ok(None),
    }
}

fn validate_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

fn require_positive(field: &str, value: i32) -> Result<(), ServiceError> {
    if value < 1 {
        return Err(ServiceError::validation(format!(
            "{} must be at least 1, got {}",
            field, value
        )));
    }
    Ok(())
}

fn ensure_ready(base: &CharacterBaseInfo) -> Result<(), ServiceError> {
    if base.is_ready_for_breakthrough() {
        return Ok(());
    }
    if !base.breakthrough_enabled {
        return Err(ServiceError::rule_violation("breakthrough is not enabled"));
    }
    if !base.breakthrough_items_enabled {
        return Err(ServiceError::rule_violation(
            "breakthrough items are not enabled",
        ));
    }
    Err(ServiceError::rule_violation(
        "a breakthrough is already in progress",
    ))
}

fn next_realm_level(level: i32) -> Result<i32, ServiceError> {
    level.checked_add(1).ok_or_else(|| {
        ServiceError::rule_violation(format!("no realm beyond level {}", level))
    })
}

fn owned_item(
    item: Option<CharacterItem>,
    character_id: Uuid,
    instance_id: Uuid,
) -> Result<CharacterItem, ServiceError> {
    item.filter(|item| item.character_id == character_id)
        .ok_or_else(|| ServiceError::not_found("inventory item", instance_id))
}

fn unequip_diff() -> UpdateSet<CharacterItemColumn> {
    UpdateSet::new()
        .set(CharacterItemColumn::Equipped, false)
        .set(CharacterItemColumn::Slot, None::<i32>)
}

/// Character operations over the shared registry
#[derive(Clone)]
pub struct CharacterService {
    registry: Arc<Registry>,
    config: ServiceConfig,
}

impl CharacterService {
    pub fn new(registry: Arc<Registry>, config: ServiceConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn stores(&self) -> AggregateStores {
        AggregateStores::from_registry(&self.registry)
    }

    fn realms(&self) -> Arc<ReferenceStore<Realm>> {
        self.registry.reference_store()
    }

    fn catalog_items(&self) -> Arc<ReferenceStore<Item>> {
        self.registry.reference_store()
    }

    async fn require_character(
        &self,
        stores: &AggregateStores,
        id: Uuid,
    ) -> Result<CharacterBaseInfo, ServiceError> {
        stores
            .base
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found("character", id))
    }

    /// Create the base row and every supplied satellite atomically
    pub async fn create_character(
        &self,
        new: NewCharacter,
    ) -> Result<CharacterAggregate, ServiceError> {
        let name = validate_name(&new.name)?;
        let id = Uuid::new_v4();
        let base = CharacterBaseInfo::new(id, name);
        let stores = self.stores();

        let mut tx = self.registry.create_transaction();
        let aggregate = tx
            .execute::<_, ServiceError, _>(move |conn| {
                Box::pin(async move {
                    let base_info = stores.base.create_on(conn, &base).await?;
                    Ok(CharacterAggregate {
                        affinities: create_satellite_on(&stores.affinities, conn, id, new.affinities)
                            .await?,
                        strength: create_satellite_on(&stores.strength, conn, id, new.strength)
                            .await?,
                        body_types: create_satellite_on(&stores.body_types, conn, id, new.body_types)
                            .await?,
                        skills: create_satellite_on(&stores.skills, conn, id, new.skills).await?,
                        weapons: create_satellite_on(&stores.weapons, conn, id, new.weapons)
                            .await?,
                        wallet: create_satellite_on(&stores.wallet, conn, id, new.wallet).await?,
                        items: Vec::new(),
                        base_info,
                    })
                })
            })
            .await?;

        tracing::info!(character_id = %id, name = %aggregate.base_info.name, "Character created");
        Ok(aggregate)
    }

    /// Base row plus concurrent reads of satellites and inventory
    ///
    /// The reads do not share a snapshot; use
    /// [`CharacterService::get_character_snapshot`] when that matters.
    pub async fn get_complete_character_info(
        &self,
        id: Uuid,
    ) -> Result<CharacterAggregate, ServiceError> {
        let stores = self.stores();
        let base_info = self.require_character(&stores, id).await?;

        let (affinities, strength, body_types, skills, weapons, wallet, items) = tokio::try_join!(
            stores.affinities.find_by_aggregate_id(id),
            stores.strength.find_by_aggregate_id(id),
            stores.body_types.find_by_aggregate_id(id),
            stores.skills.find_by_aggregate_id(id),
            stores.weapons.find_by_aggregate_id(id),
            stores.wallet.find_by_aggregate_id(id),
            stores.items.find_all_by_aggregate_id(id),
        )?;

        Ok(CharacterAggregate {
            base_info,
            affinities,
            strength,
            body_types,
            skills,
            weapons,
            wallet,
            items,
        })
    }

    /// Same payload as `get_complete_character_info`, read inside one
    /// REPEATABLE READ transaction
    pub async fn get_character_snapshot(
        &self,
        id: Uuid,
    ) -> Result<CharacterAggregate, ServiceError> {
        let stores = self.stores();
        let mut tx = self.registry.create_transaction();
        tx.execute_with::<_, ServiceError, _>(IsolationLevel::RepeatableRead, move |conn| {
            Box::pin(async move {
                let base_info = stores
                    .base
                    .find_by_id_on(conn, &id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("character", id))?;
                Ok(stores.load_on(conn, base_info).await?)
            })
        })
        .await
    }

    /// Delete the character with every satellite and inventory row
    pub async fn delete_character(&self, id: Uuid) -> Result<(), ServiceError> {
        let stores = self.stores();
        let mut tx = self.registry.create_transaction();
        let removed_items = tx
            .execute::<_, ServiceError, _>(move |conn| {
                Box::pin(async move {
                    if stores.base.lock_by_id_on(conn, &id).await?.is_none() {
                        return Err(ServiceError::not_found("character", id));
                    }

                    stores.affinities.delete_by_aggregate_id_on(conn, id).await?;
                    stores.strength.delete_by_aggregate_id_on(conn, id).await?;
                    stores.body_types.delete_by_aggregate_id_on(conn, id).await?;
                    stores.skills.delete_by_aggregate_id_on(conn, id).await?;
                    stores.weapons.delete_by_aggregate_id_on(conn, id).await?;
                    stores.wallet.delete_by_aggregate_id_on(conn, id).await?;
                    let removed_items = stores.items.delete_by_aggregate_id_on(conn, id).await?;
                    stores.base.delete_on(conn, &id).await?;
                    Ok(removed_items)
                })
            })
            .await?;

        tracing::info!(character_id = %id, removed_items, "Character deleted");
        Ok(())
    }

    pub async fn update_cultivation(
        &self,
        id: Uuid,
        value: i64,
    ) -> Result<CharacterBaseInfo, ServiceError> {
        if value < 0 {
            return Err(ServiceError::validation(format!(
                "cultivation must not be negative, got {}",
                value
            )));
        }

        let diff = UpdateSet::new().set(CharacterBaseInfoColumn::Cultivation, value);
        self.stores()
            .base
            .update(&id, diff)
            .await?
            .ok_or_else(|| ServiceError::not_found("character", id))
    }

    pub async fn set_breakthrough_flags(
        &self,
        id: Uuid,
        enabled: bool,
        items_enabled: bool,
    ) -> Result<CharacterBaseInfo, ServiceError> {
        let diff = UpdateSet::new()
            .set(CharacterBaseInfoColumn::BreakthroughEnabled, enabled)
            .set(CharacterBaseInfoColumn::BreakthroughItemsEnabled, items_enabled);
        self.stores()
            .base
            .update(&id, diff)
            .await?
            .ok_or_else(|| ServiceError::not_found("character", id))
    }

    /// Advance the character one realm
    ///
    /// Preconditions are checked up front and again under the row lock, so of
    /// two concurrent calls for one character at most one succeeds.
    pub async fn breakthrough(&self, id: Uuid) -> Result<BreakthroughOutcome, ServiceError> {
        let stores = self.stores();
        let realms = self.realms();

        let current = self.require_character(&stores, id).await?;
        ensure_ready(&current)?;
        let next_level = next_realm_level(current.realm_level)?;
        if realms.find_by_id(&next_level).await?.is_none() {
            return Err(ServiceError::rule_violation(format!(
                "realm level {} does not exist",
                next_level
            )));
        }

        let mut tx = self.registry.create_transaction();
        let outcome = tx
            .execute::<_, ServiceError, _>(move |conn| {
                Box::pin(async move {
                    let locked = stores
                        .base
                        .lock_by_id_on(conn, &id)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("character", id))?;
                    ensure_ready(&locked)?;

                    let next_level = next_realm_level(locked.realm_level)?;
                    let realm = realms.find_by_id_on(conn, &next_level).await?.ok_or_else(|| {
                        ServiceError::rule_violation(format!(
                            "realm level {} does not exist",
                            next_level
                        ))
                    })?;

                    let advance = UpdateSet::new()
                        .set(CharacterBaseInfoColumn::RealmLevel, realm.level)
                        .set(CharacterBaseInfoColumn::Cultivation, 0_i64)
                        .set(CharacterBaseInfoColumn::BreakthroughEnabled, false)
                        .set(CharacterBaseInfoColumn::BreakthroughItemsEnabled, false);
                    let base_info = stores
                        .base
                        .update_on(conn, &id, advance)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("character", id))?;

                    let strength = match stores.strength.find_by_aggregate_id_on(conn, id).await? {
                        Some(existing) => {
                            let rebase = UpdateSet::new()
                                .set(CharacterStrengthColumn::Health, realm.base_health)
                                .set(CharacterStrengthColumn::Mana, realm.base_mana)
                                .set(CharacterStrengthColumn::Attack, realm.base_attack)
                                .set(CharacterStrengthColumn::Defense, realm.base_defense)
                                .set(CharacterStrengthColumn::Speed, realm.base_speed);
                            stores
                                .strength
                                .update_on(conn, &existing.id, rebase)
                                .await?
                                .ok_or_else(|| ServiceError::not_found("character strength", id))?
                        }
                        None => {
                            stores
                                .strength
                                .create_on(conn, &CharacterStrength::from_realm(id, &realm))
                                .await?
                        }
                    };

                    Ok(BreakthroughOutcome {
                        base_info,
                        strength,
                    })
                })
            })
            .await?;

        tracing::info!(
            character_id = %id,
            realm_level = outcome.base_info.realm_level,
            "Breakthrough completed"
        );
        Ok(outcome)
    }

    /// Add `count` of catalog item `item_id`, merging into an existing stack
    /// when it has room
    ///
    /// Any stack of the item with room for the whole `count` may take the
    /// merge, not necessarily the oldest one. The amount is never split
    /// across stacks; when no stack has room a new row is created.
    pub async fn add_item_to_character(
        &self,
        id: Uuid,
        item_id: i32,
        count: i32,
        level: i32,
    ) -> Result<CharacterItem, ServiceError> {
        require_positive("count", count)?;
        if level < 0 {
            return Err(ServiceError::validation(format!(
                "level must not be negative, got {}",
                level
            )));
        }

        let stores = self.stores();
        self.require_character(&stores, id).await?;
        let item = self
            .catalog_items()
            .find_by_id(&item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("item", item_id))?;

        let max_stack = item.effective_max_stack();
        if count > max_stack {
            return Err(ServiceError::validation(format!(
                "count {} exceeds the max stack of {} for item {}",
                count, max_stack, item_id
            )));
        }

        if item.stackable {
            let room_for = Conditions::new()
                .eq(CharacterItemColumn::CharacterId, id)
                .eq(CharacterItemColumn::ItemId, item_id)
                .lte(CharacterItemColumn::Count, max_stack - count);

            for _ in 0..MAX_STACK_ATTEMPTS {
                let Some(stack) = stores
                    .items
                    .find_one_where(room_for.clone(), QueryOptions::new())
                    .await?
                else {
                    break;
                };

                // only applies while the stack still has room
                let guard = Conditions::new()
                    .eq(CharacterItemColumn::InstanceId, stack.instance_id)
                    .lte(CharacterItemColumn::Count, max_stack - count);
                let merge = UpdateSet::new().increment(CharacterItemColumn::Count, count);
                if stores.items.update_many(guard, merge).await? == 1 {
                    if let Some(merged) = stores.items.find_by_id(&stack.instance_id).await? {
                        store_object::debug_log!(
                            "[character_items] merged {} into stack {}",
                            count,
                            merged.instance_id
                        );
                        return Ok(merged);
                    }
                }
            }
        }

        let created = stores
            .items
            .create(CharacterItem::new(id, item_id, count, level))
            .await?;
        Ok(created)
    }

    /// Equip an owned item into `slot`, unequipping whatever held that slot
    pub async fn equip_item(
        &self,
        id: Uuid,
        instance_id: Uuid,
        slot: i32,
    ) -> Result<CharacterItem, ServiceError> {
        if slot < 0 {
            return Err(ServiceError::validation(format!(
                "slot must not be negative, got {}",
                slot
            )));
        }

        let stores = self.stores();
        owned_item(stores.items.find_by_id(&instance_id).await?, id, instance_id)?;

        let mut tx = self.registry.create_transaction();
        let equipped = tx
            .execute::<_, ServiceError, _>(move |conn| {
                Box::pin(async move {
                    // serializes equip calls of one character
                    if stores.base.lock_by_id_on(conn, &id).await?.is_none() {
                        return Err(ServiceError::not_found("character", id));
                    }
                    owned_item(
                        stores.items.find_by_id_on(conn, &instance_id).await?,
                        id,
                        instance_id,
                    )?;

                    let holders = Conditions::new()
                        .eq(CharacterItemColumn::CharacterId, id)
                        .eq(CharacterItemColumn::Slot, slot)
                        .eq(CharacterItemColumn::Equipped, true)
                        .ne(CharacterItemColumn::InstanceId, instance_id);
                    stores.items.update_many_on(conn, &holders, unequip_diff()).await?;

                    let equip = UpdateSet::new()
                        .set(CharacterItemColumn::Equipped, true)
                        .set(CharacterItemColumn::Slot, slot);
                    stores
                        .items
                        .update_on(conn, &instance_id, equip)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("inventory item", instance_id))
                })
            })
            .await?;

        tracing::info!(character_id = %id, %instance_id, slot, "Item equipped");
        Ok(equipped)
    }

    pub async fn unequip_item(
        &self,
        id: Uuid,
        instance_id: Uuid,
    ) -> Result<CharacterItem, ServiceError> {
        let items = self.stores().items;
        owned_item(items.find_by_id(&instance_id).await?, id, instance_id)?;
        items
            .update(&instance_id, unequip_diff())
            .await?
            .ok_or_else(|| ServiceError::not_found("inventory item", instance_id))
    }

    /// Take `count` off a stack; returns `None` once the stack is used up and
    /// its row deleted
    pub async fn remove_item_from_character(
        &self,
        id: Uuid,
        instance_id: Uuid,
        count: i32,
    ) -> Result<Option<CharacterItem>, ServiceError> {
        require_positive("count", count)?;

        let items = self.stores().items;
        let mut tx = self.registry.create_transaction();
        tx.execute::<_, ServiceError, _>(move |conn| {
            Box::pin(async move {
                let stack = owned_item(
                    items.lock_by_id_on(conn, &instance_id).await?,
                    id,
                    instance_id,
                )?;
                if count > stack.count {
                    return Err(ServiceError::validation(format!(
                        "cannot remove {} from a stack of {}",
                        count, stack.count
                    )));
                }

                if count == stack.count {
                    items.delete_on(conn, &instance_id).await?;
                    return Ok(None);
                }

                let diff = UpdateSet::new().decrement(CharacterItemColumn::Count, count);
                Ok(items.update_on(conn, &instance_id, diff).await?)
            })
        })
        .await
    }

    pub async fn get_inventory(&self, id: Uuid) -> Result<Vec<CharacterItem>, ServiceError> {
        let stores = self.stores();
        self.require_character(&stores, id).await?;
        Ok(stores.items.find_all_by_aggregate_id(id).await?)
    }

    /// One page of characters in id order; the page size is defaulted and
    /// capped by the service configuration
    pub async fn list_characters(
        &self,
        page: i64,
        page_size: Option<i64>,
    ) -> Result<Page<CharacterBaseInfo>, ServiceError> {
        let page_size = self.config.effective_page_size(page_size);
        Ok(self
            .stores()
            .base
            .find_paginated(page, page_size, QueryOptions::new())
            .await?)
    }

    pub async fn get_statistics(&self) -> Result<Statistics, ServiceError> {
        let characters = self.stores().base;
        let realms = self.realms();
        let skills = self.registry.reference_store::<Skill>();
        let weapons = self.registry.reference_store::<Weapon>();
        let items = self.catalog_items();

        let (character_count, realm_count, skill_count, weapon_count, item_count) = tokio::try_join!(
            characters.count(Conditions::new()),
            realms.count(Conditions::new()),
            skills.count(Conditions::new()),
            weapons.count(Conditions::new()),
            items.count(Conditions::new()),
        )?;

        Ok(Statistics {
            character_count,
            realm_count,
            skill_count,
            weapon_count,
            item_count,
        })
    }
}
