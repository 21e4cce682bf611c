use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    ResultEngine,
    cache::{BalanceCache, BalanceStore, DEFAULT_TTL, InvalidationPolicy, MemoryBalanceStore},
    store::SqlExpenseStore,
};

mod balances;
mod expenses;
mod users;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    expenses: SqlExpenseStore,
    balances: BalanceCache,
    invalidation: InvalidationPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The authoritative expense log.
    pub fn expense_store(&self) -> &SqlExpenseStore {
        &self.expenses
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    balance_store: Option<Arc<dyn BalanceStore>>,
    ttl: Option<Duration>,
    invalidation: InvalidationPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Backend for cached balances. Defaults to an in-process map.
    pub fn balance_store(mut self, store: Arc<dyn BalanceStore>) -> EngineBuilder {
        self.balance_store = Some(store);
        self
    }

    /// Lifetime of cached balances. Defaults to [`DEFAULT_TTL`].
    pub fn ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.ttl = Some(ttl);
        self
    }

    pub fn invalidation(mut self, policy: InvalidationPolicy) -> EngineBuilder {
        self.invalidation = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let backend = self
            .balance_store
            .unwrap_or_else(|| Arc::new(MemoryBalanceStore::new()));
        let ttl = self.ttl.unwrap_or(DEFAULT_TTL);

        Ok(Engine {
            expenses: SqlExpenseStore::new(self.database.clone()),
            database: self.database,
            balances: BalanceCache::new(backend, ttl),
            invalidation: self.invalidation,
        })
    }
}
