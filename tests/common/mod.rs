//! Shared setup for database integration tests
//!
//! Every test gets its own schema, selected through `search_path`, and
//! creates the tables from the models' generated DDL. Tests are skipped when
//! `DATABASE_URL` is not set.

#![allow(dead_code)]

use realmstore::prelude::*;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Evaluates to a fresh [`TestDb`], or returns from the test when no
/// database is configured
macro_rules! test_db {
    () => {
        match common::TestDb::setup().await {
            Some(db) => db,
            None => return,
        }
    };
}

pub struct TestDb {
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

impl TestDb {
    pub async fn setup() -> Option<Self> {
        init_tracing();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL is not set; skipping database test");
            return None;
        };

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("Failed to connect to database");

        let schema = format!("realmstore_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
            .execute(&admin)
            .await
            .expect("Failed to create test schema");

        let options = PgConnectOptions::from_str(&url)
            .expect("Invalid DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .expect("Failed to connect with test schema");

        let db = Self {
            pool,
            admin,
            schema,
        };
        db.migrate_all().await;
        Some(db)
    }

    pub async fn migrate_table<T: TableMetadata>(&self) {
        sqlx::query(&T::create_table_sql())
            .execute(&self.pool)
            .await
            .expect("Failed to create table");
        for index_sql in T::create_indexes_sql() {
            sqlx::query(&index_sql)
                .execute(&self.pool)
                .await
                .expect("Failed to create index");
        }
    }

    async fn migrate_all(&self) {
        self.migrate_table::<CharacterBaseInfo>().await;
        self.migrate_table::<CharacterAffinities>().await;
        self.migrate_table::<CharacterStrength>().await;
        self.migrate_table::<CharacterBodyTypes>().await;
        self.migrate_table::<CharacterSkills>().await;
        self.migrate_table::<CharacterWeapons>().await;
        self.migrate_table::<CharacterWallet>().await;
        self.migrate_table::<CharacterItem>().await;
        self.migrate_table::<Realm>().await;
        self.migrate_table::<Item>().await;
        self.migrate_table::<Skill>().await;
        self.migrate_table::<Weapon>().await;
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::new(Registry::from_pool(self.pool.clone()))
    }

    pub fn service(&self) -> CharacterService {
        CharacterService::new(self.registry(), ServiceConfig::new(2, 5))
    }

    /// Realms 1..=levels with base values growing per level
    pub async fn seed_realms(&self, levels: i32) {
        let store = TableStore::<Realm>::new(self.pool.clone());
        for level in 1..=levels {
            store
                .create(Realm {
                    level,
                    name: format!("Realm {}", level),
                    base_health: 100 * level as i64,
                    base_mana: 50 * level as i64,
                    base_attack: 10 * level,
                    base_defense: 8 * level,
                    base_speed: 5 * level,
                })
                .await
                .expect("Failed to seed realm");
        }
    }

    pub async fn seed_item(&self, id: i32, stackable: bool, max_stack: i32) -> Item {
        TableStore::<Item>::new(self.pool.clone())
            .create(Item {
                id,
                name: format!("Item {}", id),
                stackable,
                max_stack,
            })
            .await
            .expect("Failed to seed item")
    }

    pub async fn teardown(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("Failed to drop test schema");
    }
}
