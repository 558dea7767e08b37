use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use super::model::{AttendanceRecord, AttendanceRow, AttendanceStatus};

/// Postgres SQLSTATE for a foreign-key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} does not exist")]
    UnknownUser(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Persistence for attendance records keyed by (user, date).
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Atomically create or replace the record for (user, date).
    async fn upsert(
        &self,
        user_id: Uuid,
        date: Date,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError>;

    /// All records of a user in insertion order.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AttendanceRecord>, StoreError>;
}

#[derive(Clone)]
pub struct PgAttendanceStore {
    db: PgPool,
}

impl PgAttendanceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_record(row: AttendanceRow) -> Result<AttendanceRecord, StoreError> {
    // The CHECK constraint keeps status inside the closed set.
    AttendanceRecord::try_from(row)
        .map_err(|e| StoreError::Unavailable(sqlx::Error::Decode(e.to_string().into())))
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        date: Date,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            INSERT INTO attendance (user_id, date, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date)
            DO UPDATE SET status = EXCLUDED.status, updated_at = now()
            RETURNING id, user_id, date, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(status.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let missing_user = matches!(
                &e,
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION)
            );
            if missing_user {
                StoreError::UnknownUser(user_id)
            } else {
                StoreError::Unavailable(e)
            }
        })?;
        into_record(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, user_id, date, status, created_at, updated_at
              FROM attendance
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(into_record).collect()
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashSet;

    use tokio::sync::Mutex;

    use super::*;

    /// Vec-backed store; the single lock stands in for the database's upsert atomicity.
    #[derive(Default)]
    pub struct MemoryAttendanceStore {
        records: Mutex<Vec<AttendanceRecord>>,
        known_users: Option<HashSet<Uuid>>,
        pub fail: std::sync::atomic::AtomicBool,
    }

    impl MemoryAttendanceStore {
        pub fn with_users(users: impl IntoIterator<Item = Uuid>) -> Self {
            Self {
                known_users: Some(users.into_iter().collect()),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AttendanceStore for MemoryAttendanceStore {
        async fn upsert(
            &self,
            user_id: Uuid,
            date: Date,
            status: AttendanceStatus,
        ) -> Result<AttendanceRecord, StoreError> {
            self.check()?;
            if let Some(users) = &self.known_users {
                if !users.contains(&user_id) {
                    return Err(StoreError::UnknownUser(user_id));
                }
            }
            let now = time::OffsetDateTime::now_utc();
            let mut records = self.records.lock().await;
            if let Some(existing) = records
                .iter_mut()
                .find(|r| r.user == user_id && r.date == date)
            {
                existing.status = status;
                existing.updated_at = now;
                return Ok(existing.clone());
            }
            let record = AttendanceRecord {
                id: Uuid::new_v4(),
                user: user_id,
                date,
                status,
                created_at: now,
                updated_at: now,
            };
            records.push(record.clone());
            Ok(record)
        }

        async fn list_by_user(
            &self,
            user_id: Uuid,
        ) -> Result<Vec<AttendanceRecord>, StoreError> {
            self.check()?;
            let records = self.records.lock().await;
            Ok(records.iter().filter(|r| r.user == user_id).cloned().collect())
        }
    }
}
