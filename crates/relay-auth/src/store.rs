//! Session persistence collaborator
//!
//! The manager persists the signed-in session through this trait so a
//! restart can restore it without re-prompting for credentials. The sqlite
//! store is the production implementation; the in-memory store backs tests
//! and ephemeral profiles. Token encryption-at-rest is the platform
//! keychain's job, behind this same interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use relay_storage::{Database, StorageError};

use crate::session::UserRecord;

/// The persisted slice of a session: everything needed to restore it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
    pub token_issued_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    async fn load(&self) -> Result<Option<StoredSession>, StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

/// Sqlite-backed store: one row, replaced on every save
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&session.user)?;
        let saved_at = Utc::now().to_rfc3339();

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO auth_session
                 (id, user, access_token, refresh_token, token_issued_at, saved_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    user_json,
                    session.access_token,
                    session.refresh_token,
                    session.token_issued_at.to_rfc3339(),
                    saved_at,
                ],
            )?;
            Ok(())
        })
    }

    async fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let row = self.db.with_connection(|conn| {
            let row = conn
                .query_row(
                    "SELECT user, access_token, refresh_token, token_issued_at
                     FROM auth_session WHERE id = 1",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((user_json, access_token, refresh_token, issued_str)) = row else {
            return Ok(None);
        };

        let user: UserRecord = serde_json::from_str(&user_json)?;
        // A corrupt timestamp must not reset the staleness clock; surface it
        let token_issued_at = DateTime::parse_from_rfc3339(&issued_str)?.with_timezone(&Utc);

        Ok(Some(StoredSession {
            user,
            access_token,
            refresh_token,
            token_issued_at,
        }))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.db.with_connection(|conn| {
            conn.execute("DELETE FROM auth_session WHERE id = 1", [])?;
            Ok(())
        })
    }
}

/// In-memory store for tests and ephemeral profiles
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self.session.lock().clone())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_session() -> StoredSession {
        StoredSession {
            user: UserRecord {
                id: "user_123".to_string(),
                email: "user@example.com".to_string(),
                name: "John Doe".to_string(),
                given_name: "John".to_string(),
                family_name: "Doe".to_string(),
                picture_url: "https://example.com/avatar.png".to_string(),
                email_verified: true,
                subject: "user_123".to_string(),
            },
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            token_issued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_store_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSessionStore::new(db);

        assert!(store.load().await.unwrap().is_none());

        let session = stored_session();
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.user, session.user);
        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token, "refresh-1");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_store_save_replaces_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSessionStore::new(db.clone());

        let mut session = stored_session();
        store.save(&session).await.unwrap();

        session.access_token = "access-2".to_string();
        store.save(&session).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-2");

        // Still a single row
        db.with_connection(|conn| {
            let count: i32 =
                conn.query_row("SELECT COUNT(*) FROM auth_session", [], |row| row.get(0))?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_timestamp() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteSessionStore::new(db.clone());
        store.save(&stored_session()).await.unwrap();

        db.with_connection(|conn| {
            conn.execute(
                "UPDATE auth_session SET token_issued_at = 'a while ago' WHERE id = 1",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(StorageError::Timestamp(_))));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();

        assert!(store.load().await.unwrap().is_none());
        store.save(&stored_session()).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
