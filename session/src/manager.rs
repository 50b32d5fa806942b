use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use life_defence_core::{Difficulty, InstanceId, Speed};
use tracing::{debug, info};

use crate::{
    seed::session_seed, EngineConfig, GameId, GameSession, GameState, RestartOptions,
    SessionError, StepOutcome,
};

/// Shared handle to a single session.
pub type SessionHandle = Arc<RwLock<GameSession>>;

/// Registry of live sessions.
///
/// The registry lock is only held while a handle is inserted, removed or
/// cloned. Every session operation then runs under that session's own lock,
/// so distinct sessions advance in parallel while operations on one session
/// are applied in a single total order.
#[derive(Debug)]
pub struct SessionManager {
    config: EngineConfig,
    sessions: RwLock<HashMap<GameId, SessionHandle>>,
    created: AtomicU64,
}

impl SessionManager {
    /// Creates an empty registry using the provided engine configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            created: AtomicU64::new(0),
        }
    }

    /// Engine configuration shared by every session.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.sessions).len()
    }

    /// Reports whether no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a running session whose seed is derived from the global seed.
    pub fn create(&self, difficulty: Difficulty) -> GameState {
        let ordinal = self.created.fetch_add(1, Ordering::Relaxed);
        self.create_seeded(difficulty, session_seed(self.config.seed, ordinal))
    }

    /// Creates a running session with an explicit seed.
    pub fn create_seeded(&self, difficulty: Difficulty, seed: u64) -> GameState {
        let id = GameId::new();
        let session = GameSession::new(id, difficulty, self.config.spawning.clone(), seed);
        let state = session.state();
        let _ = write(&self.sessions).insert(id, Arc::new(RwLock::new(session)));
        info!(game_id = %id, ?difficulty, seed, "session created");
        state
    }

    /// Returns the shared handle of a session.
    pub fn handle(&self, id: GameId) -> Result<SessionHandle, SessionError> {
        read(&self.sessions)
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    /// Captures a consistent snapshot of a session.
    pub fn get_state(&self, id: GameId) -> Result<GameState, SessionError> {
        let handle = self.handle(id)?;
        let state = read(&*handle).state();
        Ok(state)
    }

    /// Advances a session by one generation.
    pub fn step(&self, id: GameId) -> Result<StepOutcome, SessionError> {
        self.with_session(id, GameSession::step)
    }

    /// Places a player pattern into a session.
    pub fn place(
        &self,
        id: GameId,
        pattern: &str,
        row: i64,
        col: i64,
    ) -> Result<InstanceId, SessionError> {
        self.with_session(id, |session| session.place(pattern, row, col))?
            .map_err(SessionError::from)
    }

    /// Sets the paused flag of a session.
    pub fn set_paused(&self, id: GameId, paused: bool) -> Result<(), SessionError> {
        self.with_session(id, |session| session.set_paused(paused))
    }

    /// Sets the advisory speed of a session.
    pub fn set_speed(&self, id: GameId, speed: Speed) -> Result<(), SessionError> {
        self.with_session(id, |session| session.set_speed(speed))
    }

    /// Restarts a session and returns its fresh state.
    pub fn restart(
        &self,
        id: GameId,
        options: RestartOptions,
    ) -> Result<GameState, SessionError> {
        self.with_session(id, |session| {
            session.restart(options);
            session.state()
        })
    }

    /// Removes a session from the registry.
    pub fn delete(&self, id: GameId) -> Result<(), SessionError> {
        match write(&self.sessions).remove(&id) {
            Some(_) => {
                info!(game_id = %id, "session deleted");
                Ok(())
            }
            None => {
                debug!(game_id = %id, "delete of unknown session");
                Err(SessionError::NotFound(id))
            }
        }
    }

    fn with_session<R>(
        &self,
        id: GameId,
        operation: impl FnOnce(&mut GameSession) -> R,
    ) -> Result<R, SessionError> {
        let handle = self.handle(id)?;
        let mut session = write(&*handle);
        Ok(operation(&mut *session))
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_defence_core::PlacementError;

    #[test]
    fn unknown_ids_are_not_found() {
        let manager = SessionManager::default();
        let id = GameId::new();
        assert_eq!(manager.get_state(id), Err(SessionError::NotFound(id)));
        assert_eq!(manager.step(id), Err(SessionError::NotFound(id)));
        assert_eq!(manager.delete(id), Err(SessionError::NotFound(id)));
    }

    #[test]
    fn created_sessions_can_be_deleted() {
        let manager = SessionManager::default();
        let state = manager.create(Difficulty::Easy);
        assert_eq!(manager.len(), 1);
        assert_eq!(state.generation, 0);
        assert!(!state.paused);

        manager.delete(state.game_id).expect("session exists");
        assert!(manager.is_empty());
        assert_eq!(
            manager.get_state(state.game_id),
            Err(SessionError::NotFound(state.game_id))
        );
    }

    #[test]
    fn placement_rejections_are_wrapped() {
        let manager = SessionManager::default();
        let id = manager.create(Difficulty::Normal).game_id;
        assert_eq!(
            manager.place(id, "glider", 0, 0),
            Err(SessionError::Placement(PlacementError::WrongZone))
        );
    }

    #[test]
    fn poisoned_sessions_stay_usable() {
        let manager = SessionManager::default();
        let id = manager.create(Difficulty::Normal).game_id;
        let handle = manager.handle(id).expect("session exists");

        let _ = std::thread::spawn(move || {
            let _guard = handle.write().expect("fresh lock");
            panic!("poison the session lock");
        })
        .join();

        assert!(manager.step(id).expect("session exists").is_accepted());
    }
}
