use crate::models::{DiscoverFilters, DiscoverProfile, Match, NewProfile, Profile, ProfileId, Session, SwipeLedger};
use crate::services::password::{hash_password, verify_password};
use crate::services::store::{LedgerStore, LedgerTransaction, ProfileStore, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: BTreeMap<ProfileId, StoredProfile>,
    sessions: HashMap<String, Session>,
    matches: Vec<Match>,
    last_profile_id: ProfileId,
    last_match_id: i32,
}

#[derive(Debug, Clone)]
struct StoredProfile {
    profile: Profile,
    ledger: SwipeLedger,
}

impl MemoryState {
    fn find_match(&self, user1_id: ProfileId, user2_id: ProfileId) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| m.user1_id == user1_id && m.user2_id == user2_id)
    }
}

/// In-process store with the same transactional contract as [`PostgresStore`]
///
/// Every transaction holds the whole state lock from `begin` until it is
/// committed or dropped, so transactions are serializable. Writes are staged
/// and only applied on commit.
///
/// [`PostgresStore`]: crate::services::PostgresStore
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    session_ttl: chrono::Duration,
    fail_match_inserts: AtomicBool,
}

impl InMemoryStore {
    pub fn new(session_ttl: chrono::Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            session_ttl,
            fail_match_inserts: AtomicBool::new(false),
        }
    }

    /// Make every following match insert fail, for exercising rollback
    pub fn fail_match_inserts(&self, fail: bool) {
        self.fail_match_inserts.store(fail, Ordering::SeqCst);
    }

    /// Insert a profile with a precomputed credential and an empty ledger
    pub async fn seed_profile(&self, mut profile: Profile) -> Profile {
        let mut state = self.state.lock().await;
        if profile.id == 0 {
            profile.id = state.last_profile_id + 1;
        }
        state.last_profile_id = state.last_profile_id.max(profile.id);
        state.profiles.insert(
            profile.id,
            StoredProfile {
                ledger: SwipeLedger::empty(profile.id),
                profile: profile.clone(),
            },
        );
        profile
    }

    /// Overwrite a stored ledger outside of any swipe
    pub async fn seed_ledger(&self, ledger: SwipeLedger) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let stored = state
            .profiles
            .get_mut(&ledger.id)
            .ok_or(StoreError::RequestInvalid)?;
        stored.ledger = ledger;
        Ok(())
    }

    pub async fn match_count(&self) -> usize {
        self.state.lock().await.matches.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(chrono::Duration::minutes(20))
    }
}

struct MemoryTransaction {
    state: OwnedMutexGuard<MemoryState>,
    staged_ledgers: BTreeMap<ProfileId, SwipeLedger>,
    staged_matches: Vec<Match>,
    fail_match_inserts: bool,
}

impl MemoryTransaction {
    fn current_ledger(&self, id: ProfileId) -> Option<SwipeLedger> {
        self.staged_ledgers
            .get(&id)
            .cloned()
            .or_else(|| self.state.profiles.get(&id).map(|p| p.ledger.clone()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, StoreError> {
        let state = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            state,
            staged_ledgers: BTreeMap::new(),
            staged_matches: Vec::new(),
            fail_match_inserts: self.fail_match_inserts.load(Ordering::SeqCst),
        }))
    }
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn load_ledger_pair(
        &mut self,
        first: ProfileId,
        second: ProfileId,
    ) -> Result<Vec<SwipeLedger>, StoreError> {
        let mut ids = vec![first, second];
        ids.sort_unstable();
        ids.dedup();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.current_ledger(id))
            .collect())
    }

    async fn persist_ledger(&mut self, ledger: &SwipeLedger) -> Result<(), StoreError> {
        if !self.state.profiles.contains_key(&ledger.id) {
            return Err(StoreError::Database(format!("profile {} does not exist", ledger.id)));
        }
        self.staged_ledgers.insert(ledger.id, ledger.clone());
        Ok(())
    }

    async fn create_match(&mut self, first: ProfileId, second: ProfileId) -> Result<Match, StoreError> {
        if self.fail_match_inserts {
            return Err(StoreError::Database("match insert rejected".to_string()));
        }

        let (user1_id, user2_id) = Match::normalized_pair(first, second);
        let existing = self
            .staged_matches
            .iter()
            .find(|m| m.user1_id == user1_id && m.user2_id == user2_id)
            .or_else(|| self.state.find_match(user1_id, user2_id));
        if let Some(existing) = existing {
            return Ok(existing.clone());
        }

        // Ids are not reused after a rollback, like a database sequence
        self.state.last_match_id += 1;
        let created = Match {
            id: self.state.last_match_id,
            user1_id,
            user2_id,
            matched_at: chrono::Utc::now(),
        };
        self.staged_matches.push(created.clone());
        Ok(created)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            mut state,
            staged_ledgers,
            staged_matches,
            ..
        } = *self;

        for (id, ledger) in staged_ledgers {
            if let Some(stored) = state.profiles.get_mut(&id) {
                stored.ledger = ledger;
            }
        }
        state.matches.extend(staged_matches);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        let password_hash = hash_password(&profile.password)?;

        let mut state = self.state.lock().await;
        if state.profiles.values().any(|p| p.profile.email == profile.email) {
            return Err(StoreError::EmailTaken);
        }

        state.last_profile_id += 1;
        let created = Profile {
            id: state.last_profile_id,
            age: profile.age,
            name: profile.name,
            gender: profile.gender,
            email: profile.email,
            password_hash,
            location: profile.location,
            created_at: chrono::Utc::now(),
        };
        state.profiles.insert(
            created.id,
            StoredProfile {
                profile: created.clone(),
                ledger: SwipeLedger::empty(created.id),
            },
        );

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, StoreError> {
        let (user_id, password_hash) = {
            let state = self.state.lock().await;
            state
                .profiles
                .values()
                .find(|p| p.profile.email == email)
                .map(|p| (p.profile.id, p.profile.password_hash.clone()))
                .ok_or(StoreError::LoginFailed)?
        };

        // Hash verification is slow, keep it outside the state lock
        if !verify_password(password, &password_hash)? {
            return Err(StoreError::LoginFailed);
        }

        let token = uuid::Uuid::new_v4().to_string();
        let mut state = self.state.lock().await;
        state.sessions.retain(|_, s| s.user_id != user_id);
        state.sessions.insert(
            token.clone(),
            Session {
                token: token.clone(),
                user_id,
                expires_at: chrono::Utc::now() + self.session_ttl,
            },
        );

        Ok(token)
    }

    async fn resolve_session(&self, token: &str) -> Result<ProfileId, StoreError> {
        let state = self.state.lock().await;
        state
            .sessions
            .get(token)
            .filter(|s| s.expires_at > chrono::Utc::now())
            .map(|s| s.user_id)
            .ok_or(StoreError::NoValidSession)
    }

    async fn list_candidates(
        &self,
        user_id: ProfileId,
        filters: &DiscoverFilters,
    ) -> Result<Vec<DiscoverProfile>, StoreError> {
        let state = self.state.lock().await;
        let swiped_on = state
            .profiles
            .get(&user_id)
            .map(|p| p.ledger.swiped_on.clone())
            .unwrap_or_default();

        Ok(state
            .profiles
            .values()
            .map(|p| &p.profile)
            .filter(|p| p.id != user_id && !swiped_on.contains(&p.id))
            .filter(|p| filters.accepts(p.age, &p.gender))
            .map(|p| DiscoverProfile {
                id: p.id,
                age: p.age,
                name: p.name.clone(),
                gender: p.gender.clone(),
                distance_km: 0,
                location: p.location,
            })
            .collect())
    }

    async fn get_ledger(&self, id: ProfileId) -> Result<Option<SwipeLedger>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(&id).map(|p| p.ledger.clone()))
    }

    async fn matches_for(&self, id: ProfileId) -> Result<Vec<Match>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.matches.iter().filter(|m| m.involves(id)).cloned().collect())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
