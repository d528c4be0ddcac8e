use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::manager::DatabaseError;
use crate::services::user::{User, UserFilter, UserStore};

/// Write-through cache in front of another user store. Entries are keyed
/// by both id and email; list queries always go to the inner store.
pub struct UserCache {
    store: Arc<dyn UserStore>,
    cache: RwLock<HashMap<String, User>>,
}

impl UserCache {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn read(&self, key: &str) -> Option<User> {
        self.cache.read().await.get(key).cloned()
    }

    async fn write(&self, usr: &User) {
        let mut cache = self.cache.write().await;

        // Drop a stale email key when the address changed.
        let stale = cache
            .get(&usr.id.to_string())
            .filter(|old| old.email != usr.email)
            .map(|old| old.email.clone());
        if let Some(stale) = stale {
            cache.remove(&stale);
        }

        cache.insert(usr.id.to_string(), usr.clone());
        cache.insert(usr.email.clone(), usr.clone());
    }

    async fn evict(&self, usr: &User) {
        let mut cache = self.cache.write().await;
        cache.remove(&usr.id.to_string());
        cache.remove(&usr.email);
    }
}

#[async_trait]
impl UserStore for UserCache {
    async fn create(&self, usr: &User) -> Result<(), DatabaseError> {
        self.store.create(usr).await?;
        self.write(usr).await;
        Ok(())
    }

    async fn update(&self, usr: &User) -> Result<(), DatabaseError> {
        self.store.update(usr).await?;
        self.write(usr).await;
        Ok(())
    }

    async fn delete(&self, usr: &User) -> Result<(), DatabaseError> {
        self.store.delete(usr).await?;
        self.evict(usr).await;
        Ok(())
    }

    async fn query(
        &self,
        filter: &UserFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<User>, DatabaseError> {
        self.store.query(filter, order_by, page_number, rows_per_page).await
    }

    async fn count(&self, filter: &UserFilter) -> Result<i64, DatabaseError> {
        self.store.count(filter).await
    }

    async fn query_by_id(&self, user_id: Uuid) -> Result<User, DatabaseError> {
        if let Some(usr) = self.read(&user_id.to_string()).await {
            return Ok(usr);
        }

        debug!(%user_id, "usercache miss");
        let usr = self.store.query_by_id(user_id).await?;
        self.write(&usr).await;
        Ok(usr)
    }

    async fn query_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        if let Some(usr) = self.read(email).await {
            return Ok(usr);
        }

        debug!(email, "usercache miss");
        let usr = self.store.query_by_email(email).await?;
        self.write(&usr).await;
        Ok(usr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryUserStore;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Cached".into(),
            email: email.into(),
            roles: vec![],
            password_hash: String::new(),
            department: None,
            enabled: true,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reads_are_served_from_cache() {
        let inner = Arc::new(MemoryUserStore::default());
        let cache = UserCache::new(inner.clone());
        let usr = user("cached@example.com");
        cache.create(&usr).await.unwrap();

        // Remove behind the cache's back; it should still answer.
        inner.delete(&usr).await.unwrap();
        assert_eq!(cache.query_by_id(usr.id).await.unwrap(), usr);
        assert_eq!(cache.query_by_email(&usr.email).await.unwrap(), usr);
    }

    #[tokio::test]
    async fn delete_evicts_both_keys() {
        let cache = UserCache::new(Arc::new(MemoryUserStore::default()));
        let usr = user("gone@example.com");
        cache.create(&usr).await.unwrap();
        cache.delete(&usr).await.unwrap();

        assert!(matches!(cache.query_by_id(usr.id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(cache.query_by_email(&usr.email).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn email_change_drops_old_key() {
        let cache = UserCache::new(Arc::new(MemoryUserStore::default()));
        let mut usr = user("old@example.com");
        cache.create(&usr).await.unwrap();

        usr.email = "new@example.com".into();
        cache.update(&usr).await.unwrap();

        assert!(cache.query_by_email("old@example.com").await.is_err());
        assert_eq!(cache.query_by_email("new@example.com").await.unwrap().id, usr.id);
    }
}
