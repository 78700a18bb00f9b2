//! Session storage and per-session serialisation.

use super::controller::{GameController, GuessOutcome, RoundView, SessionSummary};
use super::state::RoundState;
use super::GameError;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Opaque identifier of a player session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a random 128-bit identifier, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Holds round state keyed by session.
///
/// Implementations only need plain get/set semantics; [`GameService`]
/// serialises the read-modify-write of each session.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &SessionId) -> Option<RoundState>;
    fn set(&self, id: &SessionId, state: RoundState);
    fn remove(&self, id: &SessionId) -> Option<RoundState>;

    fn contains(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, RoundState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &SessionId) -> Option<RoundState> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn set(&self, id: &SessionId, state: RoundState) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), state);
    }

    fn remove(&self, id: &SessionId) -> Option<RoundState> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    fn contains(&self, id: &SessionId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

/// Runs controller operations against stored sessions.
///
/// Every operation on a session holds that session's lock for its whole
/// read-modify-write, so concurrent guesses for one player are applied one
/// at a time. Different sessions proceed independently. A lock exists only
/// while some operation on its session is running or waiting.
pub struct GameService {
    controller: GameController,
    store: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl GameService {
    pub fn new(controller: GameController, store: Arc<dyn SessionStore>) -> Self {
        Self {
            controller,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Starts a session and returns its identifier.
    pub fn start_session(&self) -> Result<SessionId, GameError> {
        let state = self.controller.start_session()?;
        let id = SessionId::generate();
        self.store.set(&id, state);
        tracing::debug!(session = %id, "Session stored");
        Ok(id)
    }

    pub fn begin_round(&self, id: &SessionId) -> Result<RoundView, GameError> {
        self.with_session(id, |state| self.controller.begin_round(state))
    }

    pub fn submit_guess(&self, id: &SessionId, guess: &str) -> Result<GuessOutcome, GameError> {
        self.with_session(id, |state| self.controller.submit_guess(state, guess))
    }

    pub fn finalize_session(&self, id: &SessionId) -> Result<SessionSummary, GameError> {
        self.with_session(id, |state| self.controller.finalize_session(state))
    }

    /// Current state of a session, if it exists.
    pub fn state(&self, id: &SessionId) -> Option<RoundState> {
        self.store.get(id)
    }

    /// Drops a session.
    pub fn end_session(&self, id: &SessionId) -> Option<RoundState> {
        let lock = self.acquire_lock(id).ok()?;
        let removed = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.remove(id)
        };
        self.release_lock(id, lock);
        removed
    }

    /// Hands out the lock for an existing session.
    ///
    /// Unknown ids are rejected before anything is inserted into the map.
    fn acquire_lock(&self, id: &SessionId) -> Result<Arc<Mutex<()>>, GameError> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(id) {
            return Ok(Arc::clone(lock));
        }
        if !self.store.contains(id) {
            return Err(GameError::UnknownSession(id.clone()));
        }
        Ok(Arc::clone(locks.entry(id.clone()).or_default()))
    }

    /// Drops the map entry once no other caller holds or waits on it.
    fn release_lock(&self, id: &SessionId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(id)
            .is_some_and(|held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
        if idle {
            locks.remove(id);
        }
    }

    /// Loads, mutates and stores a session under its lock.
    ///
    /// State is written back only on success; the controller leaves state
    /// untouched when it fails.
    fn with_session<T>(
        &self,
        id: &SessionId,
        op: impl FnOnce(&mut RoundState) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let lock = self.acquire_lock(id)?;
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store
                .get(id)
                .ok_or_else(|| GameError::UnknownSession(id.clone()))
                .and_then(|mut state| {
                    let value = op(&mut state)?;
                    self.store.set(id, state);
                    Ok(value)
                })
        };
        self.release_lock(id, lock);
        result
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
