//! Cache-aside layer for derived balances.
//!
//! Recomputing a balance scans the user's whole expense history, so results
//! are kept in a [`BalanceStore`] keyed by user:
//!
//! - [`BalanceCache::get`] reads through: on a miss (or an expired entry) it
//!   lists the user's expenses, runs [`compute_balance`] and stores the full
//!   result with a TTL.
//! - [`BalanceCache::put`] writes through: the acting user's fresh balance
//!   replaces whatever was cached.
//!
//! There is no locking around recompute-and-store. Two concurrent writers for
//! the same user may both compute from a view missing the other's expense;
//! the last write wins until the TTL expires and the next read recomputes.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{Balance, ResultEngine, UserId, compute_balance, store::ExpenseStore};

pub use self::memory::MemoryBalanceStore;
pub use self::redis::RedisBalanceStore;

mod memory;
mod redis;

/// Default lifetime of a cached balance.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Key-value backend holding one [`Balance`] per user.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// The cached balance, or `None` when absent or expired.
    async fn load(&self, user_id: UserId) -> ResultEngine<Option<Balance>>;

    /// Overwrite the entry for `user_id`, expiring after `ttl`.
    async fn save(&self, user_id: UserId, balance: &Balance, ttl: Duration) -> ResultEngine<()>;

    async fn remove(&self, user_id: UserId) -> ResultEngine<()>;
}

/// Which cached balances a new expense touches besides the submitter's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidationPolicy {
    /// Only the submitter is refreshed; other participants see their cached
    /// balance until it expires.
    #[default]
    WriteThroughOwner,
    /// The submitter is refreshed and every other participant's entry is
    /// dropped, so their next read recomputes.
    InvalidateParticipants,
}

#[derive(Clone)]
pub struct BalanceCache {
    backend: Arc<dyn BalanceStore>,
    ttl: Duration,
}

impl fmt::Debug for BalanceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BalanceCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl BalanceCache {
    pub fn new(backend: Arc<dyn BalanceStore>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    /// Cached balance of `subject`, recomputed from `store` on a miss.
    pub async fn get(&self, store: &dyn ExpenseStore, subject: UserId) -> ResultEngine<Balance> {
        if let Some(balance) = self.backend.load(subject).await? {
            tracing::debug!(user_id = subject, "balance cache hit");
            return Ok(balance);
        }

        tracing::debug!(user_id = subject, "balance cache miss");
        let expenses = store.list_for_user(subject).await?;
        let balance = compute_balance(&expenses, subject);
        self.backend.save(subject, &balance, self.ttl).await?;

        Ok(balance)
    }

    /// Replace the cached balance of `subject` with a fresh TTL.
    pub async fn put(&self, subject: UserId, balance: &Balance) -> ResultEngine<()> {
        self.backend.save(subject, balance, self.ttl).await
    }

    pub async fn invalidate(&self, subject: UserId) -> ResultEngine<()> {
        tracing::debug!(user_id = subject, "balance cache invalidated");
        self.backend.remove(subject).await
    }
}
