//! Playback sessions.
//!
//! Each session owns one playback task and the request tokens used to drop
//! superseded trace generations. The currency check and the load run under
//! one per-session lock, so an overtaken trace is never applied. [`SessionRegistry`] is backed by `DashMap`
//! for concurrent access from handler tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use stepview_core::ExecutionTrace;
use stepview_playback::{PlaybackError, PlaybackHandle, PlaybackSnapshot};
use stepview_synth::{RequestToken, RequestTokens};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Session identifier (UUID v4 newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

pub struct Session {
    pub id: SessionId,
    pub playback: PlaybackHandle,
    pub tokens: RequestTokens,
    load_gate: Mutex<()>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Session {
            id,
            playback: stepview_playback::spawn(),
            tokens: RequestTokens::new(),
            load_gate: Mutex::new(()),
        }
    }

    /// Loads `trace` if `token` is still the latest issued on this session.
    ///
    /// Returns `Ok(None)` for a superseded token; the playback state is left
    /// untouched. The token is re-checked while holding the load lock, so a
    /// newer load can never be overwritten by an older one.
    pub async fn load_if_current(
        &self,
        token: RequestToken,
        trace: ExecutionTrace,
    ) -> Result<Option<PlaybackSnapshot>, PlaybackError> {
        let _gate = self.load_gate.lock().await;
        if !self.tokens.is_current(token) {
            tracing::debug!(session = %self.id, token = token.value(), "discarding superseded trace");
            return Ok(None);
        }
        self.playback.load(trace).await.map(Some)
    }
}

struct Entry {
    session: Arc<Session>,
    last_active: Instant,
}

pub struct SessionRegistry {
    sessions: DashMap<SessionId, Entry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            sessions: DashMap::new(),
        }
    }

    /// Creates a session with an idle playback task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create(&self) -> Arc<Session> {
        let id = SessionId(Uuid::new_v4());
        let session = Arc::new(Session::new(id));
        self.sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_active: Instant::now(),
            },
        );
        session
    }

    /// Returns the session and marks it active.
    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_active = Instant::now();
            Arc::clone(&entry.session)
        })
    }

    /// Removes a session. Returns `true` if it existed.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Removes sessions idle longer than `ttl`. Returns how many were removed.
    pub fn sweep_inactive(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let active = now.duration_since(entry.last_active) < ttl;
            if !active {
                removed += 1;
            }
            active
        });
        removed
    }

    /// Spawns a task that sweeps idle sessions every `every`.
    pub fn start_sweep(self: &Arc<Self>, ttl: Duration, every: Duration) {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tick.tick().await;
                let removed = registry.sweep_inactive(ttl);
                if removed > 0 {
                    tracing::info!("Swept {} idle session(s)", removed);
                }
            }
        });
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_remove() {
        let registry = SessionRegistry::new();
        let session = registry.create();
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&session.id).is_some());
        assert!(registry.remove(&session.id));
        assert!(!registry.remove(&session.id));
        assert!(registry.get(&session.id).is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_idle_sessions() {
        let registry = SessionRegistry::new();
        let session = registry.create();
        assert_eq!(registry.sweep_inactive(Duration::from_secs(60)), 0);
        assert_eq!(registry.sweep_inactive(Duration::ZERO), 1);
        assert!(registry.get(&session.id).is_none());
        assert!(registry.is_empty());
    }

    fn one_step(code: &str) -> ExecutionTrace {
        ExecutionTrace::new(vec![stepview_core::ExecutionStep::new(0, code)])
    }

    fn loaded_code(session: &Session) -> Option<String> {
        session.playback.snapshot().current_step.map(|step| step.code)
    }

    #[tokio::test]
    async fn superseded_token_loads_nothing() {
        let registry = SessionRegistry::new();
        let session = registry.create();

        let older = session.tokens.issue();
        let newer = session.tokens.issue();
        assert!(session.load_if_current(older, one_step("old")).await.unwrap().is_none());
        assert_eq!(loaded_code(&session), None);

        let snapshot = session.load_if_current(newer, one_step("new")).await.unwrap();
        assert_eq!(snapshot.and_then(|s| s.current_step).map(|s| s.code), Some("new".to_string()));
        assert!(session.load_if_current(older, one_step("old")).await.unwrap().is_none());
        assert_eq!(loaded_code(&session), Some("new".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_loads_keep_the_newest_trace() {
        let registry = SessionRegistry::new();
        for _ in 0..500 {
            let session = registry.create();
            let racers: Vec<_> = ["a", "b"]
                .into_iter()
                .map(|name| {
                    let session = Arc::clone(&session);
                    tokio::spawn(async move {
                        let token = session.tokens.issue();
                        tokio::task::yield_now().await;
                        let loaded = session.load_if_current(token, one_step(name)).await.unwrap();
                        (token, name, loaded.is_some())
                    })
                })
                .collect();

            let mut results = Vec::new();
            for racer in racers {
                results.push(racer.await.unwrap());
            }
            let (_, newest, newest_loaded) = results
                .iter()
                .copied()
                .max_by_key(|(token, _, _)| *token)
                .unwrap();
            assert!(newest_loaded, "latest request must always load");
            assert_eq!(loaded_code(&session), Some(newest.to_string()));
            registry.remove(&session.id);
        }
    }

    #[test]
    fn session_id_parses_uuid() {
        let id: SessionId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }
}
