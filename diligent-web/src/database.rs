//! SQLite-backed user and configuration storage

use async_trait::async_trait;
use diligent_core::{
    CheckEntry, ConfigStore, ConfigSummary, Configuration, DiligentError, DiligentResult,
    ErrorContext, NewConfiguration, User, UserStore,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{WebError, WebResult};

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    username: String,
    firstname: String,
    surname: String,
    is_student: bool,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            firstname: record.firstname,
            surname: record.surname,
            is_student: record.is_student,
        }
    }
}

/// Database configuration record, check lists as JSON arrays
#[derive(Debug, sqlx::FromRow)]
struct ConfigRecord {
    id: String,
    title: String,
    creator: String,
    high: String,
    medium: String,
    low: String,
    course_code: Option<String>,
    exercise_num: Option<String>,
}

impl ConfigRecord {
    fn into_configuration(self) -> DiligentResult<Configuration> {
        Ok(Configuration {
            high: parse_checks(&self.high)?,
            medium: parse_checks(&self.medium)?,
            low: parse_checks(&self.low)?,
            id: self.id,
            title: self.title,
            creator: self.creator,
            course_code: self.course_code,
            exercise_num: self.exercise_num,
        })
    }
}

fn parse_checks(json: &str) -> DiligentResult<Vec<CheckEntry>> {
    Ok(serde_json::from_str(json)?)
}

/// Wrap a sqlx error with the failing operation
fn query_failed(operation: &'static str) -> impl FnOnce(sqlx::Error) -> DiligentError {
    move |e| {
        error!("Database operation {} failed: {}", operation, e);
        DiligentError::Storage {
            message: format!("{} failed: {}", operation, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("sqlite_store").with_operation(operation),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url` and create the tables
    pub async fn connect(database_url: &str) -> WebResult<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    info!("Creating database directory: {}", parent.display());
                    std::fs::create_dir_all(parent).map_err(|e| {
                        WebError::Database(format!("Failed to create directory: {}", e))
                    })?;
                }
            }
        }

        // Every connection to an in-memory database sees its own database,
        // so the pool must hold on to exactly one.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            error!("Database connection failed: {}", e);
            WebError::Database(format!("Failed to connect to database: {}", e))
        })?;

        let store = Self { pool };
        store
            .create_tables()
            .await
            .map_err(|e| WebError::Database(e.to_string()))?;

        info!("Database ready");
        Ok(store)
    }

    async fn create_tables(&self) -> DiligentResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                firstname TEXT NOT NULL,
                surname TEXT NOT NULL,
                is_student BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed("create_users_table"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS configurations (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                creator TEXT NOT NULL,
                high TEXT NOT NULL DEFAULT '[]',
                medium TEXT NOT NULL DEFAULT '[]',
                low TEXT NOT NULL DEFAULT '[]',
                course_code TEXT,
                exercise_num TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed("create_configurations_table"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_configurations_creator ON configurations(creator)",
        )
        .execute(&self.pool)
        .await
        .map_err(query_failed("create_creator_index"))?;

        debug!("Database tables created");
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_user_by_username(&self, username: &str) -> DiligentResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT username, firstname, surname, is_student FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("find_user_by_username"))?;

        Ok(record.map(User::from))
    }

    async fn insert_user_if_absent(&self, user: User) -> DiligentResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, firstname, surname, is_student)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(username) DO NOTHING
            "#,
        )
        .bind(&user.username)
        .bind(&user.firstname)
        .bind(&user.surname)
        .bind(user.is_student)
        .execute(&self.pool)
        .await
        .map_err(query_failed("insert_user"))?;

        if result.rows_affected() > 0 {
            debug!("User record created: {}", user.username);
        }

        self.find_user_by_username(&user.username)
            .await?
            .ok_or_else(|| DiligentError::storage("user vanished after insert", "sqlite_store"))
    }
}

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn find_configs_by_creator(&self, creator: &str) -> DiligentResult<Vec<ConfigSummary>> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>)>(
            r#"
            SELECT id, title, course_code, exercise_num
            FROM configurations
            WHERE creator = ?
            ORDER BY created_at, rowid
            "#,
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("find_configs_by_creator"))?;

        Ok(rows
            .into_iter()
            .map(|(id, title, course_code, exercise_num)| ConfigSummary {
                id,
                title,
                course_code,
                exercise_num,
            })
            .collect())
    }

    async fn find_config_by_id(&self, id: &str) -> DiligentResult<Option<Configuration>> {
        let record = sqlx::query_as::<_, ConfigRecord>(
            r#"
            SELECT id, title, creator, high, medium, low, course_code, exercise_num
            FROM configurations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("find_config_by_id"))?;

        record.map(ConfigRecord::into_configuration).transpose()
    }

    async fn find_config_by_title(
        &self,
        creator: &str,
        title: &str,
    ) -> DiligentResult<Option<ConfigSummary>> {
        let row = sqlx::query_as::<_, (String, String, Option<String>, Option<String>)>(
            r#"
            SELECT id, title, course_code, exercise_num
            FROM configurations
            WHERE creator = ? AND title = ?
            LIMIT 1
            "#,
        )
        .bind(creator)
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("find_config_by_title"))?;

        Ok(row.map(|(id, title, course_code, exercise_num)| ConfigSummary {
            id,
            title,
            course_code,
            exercise_num,
        }))
    }

    async fn insert_config(&self, config: NewConfiguration) -> DiligentResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO configurations
                (id, title, creator, high, medium, low, course_code, exercise_num)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&config.title)
        .bind(&config.creator)
        .bind(serde_json::to_string(&config.high)?)
        .bind(serde_json::to_string(&config.medium)?)
        .bind(serde_json::to_string(&config.low)?)
        .bind(&config.course_code)
        .bind(&config.exercise_num)
        .execute(&self.pool)
        .await
        .map_err(query_failed("insert_config"))?;

        debug!(config_id = %id, creator = %config.creator, "Configuration stored");
        Ok(id)
    }

    async fn delete_config_by_id(&self, id: &str) -> DiligentResult<bool> {
        let result = sqlx::query("DELETE FROM configurations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_failed("delete_config_by_id"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    fn user(firstname: &str) -> User {
        User {
            username: "jdoe".to_string(),
            firstname: firstname.to_string(),
            surname: "Doe".to_string(),
            is_student: true,
        }
    }

    #[tokio::test]
    async fn test_insert_user_if_absent_keeps_first_record() {
        let store = store().await;

        let first = store.insert_user_if_absent(user("John")).await.unwrap();
        let second = store.insert_user_if_absent(user("Johnny")).await.unwrap();

        assert_eq!(first, user("John"));
        assert_eq!(second, first);
        assert!(store.find_user_by_username("asmith").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_configuration_lifecycle() {
        let store = store().await;

        let id = store
            .insert_config(NewConfiguration {
                title: "Lab 1".to_string(),
                creator: "jdoe".to_string(),
                high: vec![CheckEntry::new("config-2")],
                medium: vec![CheckEntry::new("config-12"), CheckEntry::new("config-16")],
                low: vec![],
                course_code: Some("40008".to_string()),
                exercise_num: None,
            })
            .await
            .unwrap();

        let stored = store.find_config_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.medium.len(), 2);
        assert_eq!(stored.course_code.as_deref(), Some("40008"));
        assert!(stored.exercise_num.is_none());

        let mine = store.find_configs_by_creator("jdoe").await.unwrap();
        assert_eq!(mine, vec![stored.summary()]);
        assert!(store.find_configs_by_creator("asmith").await.unwrap().is_empty());

        assert!(store.find_config_by_title("jdoe", "Lab 1").await.unwrap().is_some());
        assert!(store.find_config_by_title("asmith", "Lab 1").await.unwrap().is_none());

        assert!(store.delete_config_by_id(&id).await.unwrap());
        assert!(!store.delete_config_by_id(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_id_is_absent() {
        let store = store().await;
        assert!(store.find_config_by_id("not-a-uuid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("data/diligent.db").display());

        SqliteStore::connect(&url)
            .await
            .unwrap()
            .insert_user_if_absent(user("John"))
            .await
            .unwrap();

        let reopened = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(
            reopened.find_user_by_username("jdoe").await.unwrap(),
            Some(user("John"))
        );
    }
}
