use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::{sync::RwLock, time::Instant};

use super::BalanceStore;
use crate::{Balance, ResultEngine, UserId};

#[derive(Clone, Debug)]
struct Entry {
    balance: Balance,
    expires_at: Instant,
}

/// Process-local [`BalanceStore`]. Expiry is checked when an entry is read.
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    entries: RwLock<HashMap<UserId, Entry>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn load(&self, user_id: UserId) -> ResultEngine<Option<Balance>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&user_id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.balance.clone()))
    }

    async fn save(&self, user_id: UserId, balance: &Balance, ttl: Duration) -> ResultEngine<()> {
        let entry = Entry {
            balance: balance.clone(),
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.expires_at > Instant::now());
        entries.insert(user_id, entry);
        Ok(())
    }

    async fn remove(&self, user_id: UserId) -> ResultEngine<()> {
        self.entries.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryBalanceStore::new();
        let balance = Balance {
            balance: 1.5,
            ..Default::default()
        };

        store.save(1, &balance, Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), Some(balance));
        assert_eq!(store.load(2).await.unwrap(), None);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.load(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_drops_entry() {
        let store = MemoryBalanceStore::new();
        store
            .save(1, &Balance::default(), Duration::from_secs(60))
            .await
            .unwrap();
        store.remove(1).await.unwrap();
        assert_eq!(store.load(1).await.unwrap(), None);
    }
}
