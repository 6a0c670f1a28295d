//! In-memory store for development and testing

use crate::error::DiligentResult;
use crate::traits::{ConfigStore, UserStore};
use crate::types::{ConfigSummary, Configuration, NewConfiguration, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    configs: Arc<RwLock<Vec<Configuration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn config_count(&self) -> usize {
        self.configs.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> DiligentResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert_user_if_absent(&self, user: User) -> DiligentResult<User> {
        let mut users = self.users.write().await;
        let stored = users.entry(user.username.clone()).or_insert_with(|| {
            debug!("Creating user record: {}", user.username);
            user
        });
        Ok(stored.clone())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn find_configs_by_creator(&self, creator: &str) -> DiligentResult<Vec<ConfigSummary>> {
        let configs = self.configs.read().await;
        Ok(configs
            .iter()
            .filter(|c| c.creator == creator)
            .map(Configuration::summary)
            .collect())
    }

    async fn find_config_by_id(&self, id: &str) -> DiligentResult<Option<Configuration>> {
        let configs = self.configs.read().await;
        Ok(configs.iter().find(|c| c.id == id).cloned())
    }

    async fn find_config_by_title(
        &self,
        creator: &str,
        title: &str,
    ) -> DiligentResult<Option<ConfigSummary>> {
        let configs = self.configs.read().await;
        Ok(configs
            .iter()
            .find(|c| c.creator == creator && c.title == title)
            .map(Configuration::summary))
    }

    async fn insert_config(&self, config: NewConfiguration) -> DiligentResult<String> {
        let id = Uuid::new_v4().to_string();
        self.configs.write().await.push(config.into_stored(id.clone()));
        Ok(id)
    }

    async fn delete_config_by_id(&self, id: &str) -> DiligentResult<bool> {
        let mut configs = self.configs.write().await;
        let before = configs.len();
        configs.retain(|c| c.id != id);
        Ok(configs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckEntry;

    fn user(username: &str, firstname: &str) -> User {
        User {
            username: username.to_string(),
            firstname: firstname.to_string(),
            surname: String::new(),
            is_student: false,
        }
    }

    fn new_config(creator: &str, title: &str) -> NewConfiguration {
        NewConfiguration {
            title: title.to_string(),
            creator: creator.to_string(),
            high: vec![CheckEntry::new("config-2")],
            medium: vec![],
            low: vec![],
            course_code: None,
            exercise_num: None,
        }
    }

    #[tokio::test]
    async fn test_insert_user_if_absent_keeps_first_record() {
        let store = MemoryStore::new();

        let first = store.insert_user_if_absent(user("jdoe", "John")).await.unwrap();
        let second = store.insert_user_if_absent(user("jdoe", "Johnny")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.firstname, "John");
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_inserts_produce_one_record() {
        let store = MemoryStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_user_if_absent(user("jdoe", &format!("John{i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            winners.push(handle.await.unwrap());
        }

        assert_eq!(store.user_count().await, 1);
        assert!(winners.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_config_lifecycle() {
        let store = MemoryStore::new();

        let id = store.insert_config(new_config("jdoe", "Lab 1")).await.unwrap();
        store.insert_config(new_config("asmith", "Lab 1")).await.unwrap();

        let mine = store.find_configs_by_creator("jdoe").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, id);

        assert!(store.find_config_by_title("jdoe", "Lab 1").await.unwrap().is_some());
        assert!(store.find_config_by_title("jdoe", "Lab 2").await.unwrap().is_none());

        let stored = store.find_config_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.creator, "jdoe");

        assert!(store.delete_config_by_id(&id).await.unwrap());
        assert!(!store.delete_config_by_id(&id).await.unwrap());
        assert!(store.find_config_by_id(&id).await.unwrap().is_none());
        assert_eq!(store.config_count().await, 1);
    }
}
