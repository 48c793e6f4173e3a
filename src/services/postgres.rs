use crate::models::{DiscoverFilters, DiscoverProfile, Location, Match, NewProfile, Profile, ProfileId, SwipeLedger};
use crate::services::password::{hash_password, verify_password};
use crate::services::store::{LedgerStore, LedgerTransaction, ProfileStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

/// PostgreSQL-backed store for profiles, sessions, swipe ledgers and matches
///
/// Swipe transactions lock both profile rows with `SELECT ... FOR UPDATE`,
/// in ascending id order, so two swipes on the same pair run one after the
/// other and the second always sees what the first committed.
pub struct PostgresStore {
    pool: PgPool,
    session_ttl: chrono::Duration,
}

impl PostgresStore {
    /// Connect, run migrations and build the store
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
        session_ttl: chrono::Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, session_ttl })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        database: &crate::config::DatabaseSettings,
        session: &crate::config::SessionSettings,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL (max {} connections)", database.max_connections());

        Self::new(
            &database.url,
            database.max_connections(),
            database.min_connections.unwrap_or(1),
            Duration::from_secs(database.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(database.idle_timeout_secs.unwrap_or(600)),
            session.ttl(),
        )
        .await
    }
}

fn ledger_from_row(row: &PgRow) -> Result<SwipeLedger, sqlx::Error> {
    Ok(SwipeLedger::from_columns(
        row.try_get("id")?,
        row.try_get("swiped_on")?,
        row.try_get("swiped_yes_by")?,
    ))
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    Ok(Match {
        id: row.try_get("id")?,
        user1_id: row.try_get("user1_id")?,
        user2_id: row.try_get("user2_id")?,
        matched_at: row.try_get("matched_at")?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: row.try_get("id")?,
        age: row.try_get("age")?,
        name: row.try_get("name")?,
        gender: row.try_get("gender")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        location: Location {
            lat: row.try_get("lat")?,
            long: row.try_get("long")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

/// A swipe transaction on one pooled connection
struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

#[async_trait]
impl LedgerTransaction for PostgresTransaction {
    async fn load_ledger_pair(
        &mut self,
        first: ProfileId,
        second: ProfileId,
    ) -> Result<Vec<SwipeLedger>, StoreError> {
        let query = r#"
            SELECT id, swiped_on, swiped_yes_by
            FROM profiles
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
        "#;

        let rows = sqlx::query(query)
            .bind(vec![first, second])
            .fetch_all(&mut *self.tx)
            .await?;

        let ledgers = rows
            .iter()
            .map(ledger_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Locked {} ledger rows for pair ({}, {})", ledgers.len(), first, second);

        Ok(ledgers)
    }

    async fn persist_ledger(&mut self, ledger: &SwipeLedger) -> Result<(), StoreError> {
        let query = r#"
            UPDATE profiles
            SET swiped_on = $1, swiped_yes_by = $2
            WHERE id = $3
        "#;

        let result = sqlx::query(query)
            .bind(ledger.swiped_on_column())
            .bind(ledger.swiped_yes_by_column())
            .bind(ledger.id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::Database(format!("profile {} vanished mid-transaction", ledger.id)));
        }

        Ok(())
    }

    async fn create_match(&mut self, first: ProfileId, second: ProfileId) -> Result<Match, StoreError> {
        let (user1_id, user2_id) = Match::normalized_pair(first, second);

        let inserted = sqlx::query(
            r#"
            INSERT INTO matches (user1_id, user2_id)
            VALUES ($1, $2)
            ON CONFLICT (user1_id, user2_id) DO NOTHING
            RETURNING id, user1_id, user2_id, matched_at
            "#,
        )
        .bind(user1_id)
        .bind(user2_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        let row = match inserted {
            Some(row) => row,
            None => {
                tracing::debug!("Match {}-{} already recorded", user1_id, user2_id);
                sqlx::query(
                    "SELECT id, user1_id, user2_id, matched_at FROM matches WHERE user1_id = $1 AND user2_id = $2",
                )
                .bind(user1_id)
                .bind(user2_id)
                .fetch_one(&mut *self.tx)
                .await?
            }
        };

        Ok(match_from_row(&row)?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        let password_hash = hash_password(&profile.password)?;

        let query = r#"
            INSERT INTO profiles (email, password_hash, age, name, gender, lat, long)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, age, name, gender, lat, long, created_at
        "#;

        let row = sqlx::query(query)
            .bind(&profile.email)
            .bind(&password_hash)
            .bind(profile.age)
            .bind(&profile.name)
            .bind(&profile.gender)
            .bind(profile.location.lat)
            .bind(profile.location.long)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::EmailTaken,
                other => other.into(),
            })?;

        let created = profile_from_row(&row)?;
        tracing::info!("Created profile {}", created.id);

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, StoreError> {
        let row = sqlx::query("SELECT id, password_hash FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::LoginFailed)?;

        let user_id: ProfileId = row.try_get("id")?;
        let password_hash: String = row.try_get("password_hash")?;

        if !verify_password(password, &password_hash)? {
            return Err(StoreError::LoginFailed);
        }

        let token = uuid::Uuid::new_v4().to_string();
        let expires_at = chrono::Utc::now() + self.session_ttl;

        let query = r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at
        "#;

        sqlx::query(query)
            .bind(&token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Started session for user {}", user_id);

        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<ProfileId, StoreError> {
        let row = sqlx::query("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > NOW()")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NoValidSession)?;

        Ok(row.try_get("user_id")?)
    }

    async fn list_candidates(
        &self,
        user_id: ProfileId,
        filters: &DiscoverFilters,
    ) -> Result<Vec<DiscoverProfile>, StoreError> {
        let query = r#"
            SELECT id, age, name, gender, lat, long
            FROM profiles
            WHERE id <> $1
              AND NOT (id = ANY (COALESCE(
                    (SELECT swiped_on FROM profiles WHERE id = $1),
                    '{}'::INTEGER[])))
              AND ($2 = 0 OR age >= $2)
              AND ($3 = 0 OR age <= $3)
              AND (cardinality($4::TEXT[]) = 0 OR gender = ANY ($4))
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(filters.min_age)
            .bind(filters.max_age)
            .bind(&filters.genders)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .iter()
            .map(|row| {
                Ok(DiscoverProfile {
                    id: row.try_get("id")?,
                    age: row.try_get("age")?,
                    name: row.try_get("name")?,
                    gender: row.try_get("gender")?,
                    distance_km: 0,
                    location: Location {
                        lat: row.try_get("lat")?,
                        long: row.try_get("long")?,
                    },
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Found {} candidates for user {}", profiles.len(), user_id);

        Ok(profiles)
    }

    async fn get_ledger(&self, id: ProfileId) -> Result<Option<SwipeLedger>, StoreError> {
        let row = sqlx::query("SELECT id, swiped_on, swiped_yes_by FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(ledger_from_row).transpose()?)
    }

    async fn matches_for(&self, id: ProfileId) -> Result<Vec<Match>, StoreError> {
        let query = r#"
            SELECT id, user1_id, user2_id, matched_at
            FROM matches
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY matched_at DESC
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(match_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
