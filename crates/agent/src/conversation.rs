//! Conversation store
//!
//! Per-session rolling history with a fixed cap and time-based expiry.
//! Index 0 of every history is the system prompt and is never evicted.
//!
//! The map lock is only held for short synchronous sections and never
//! across an `.await`.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use jinny_config::ConversationConfig;
use jinny_core::{SessionId, Turn, TurnRole};

/// State held for one session
#[derive(Debug, Clone)]
struct SessionEntry {
    history: Vec<Turn>,
    preferences: Map<String, Value>,
    /// Stamp of the latest append; a pending disconnect expiry only fires if unchanged
    activity: u64,
}

impl SessionEntry {
    fn seeded(system_prompt: &str, now: DateTime<Utc>, activity: u64) -> Self {
        Self {
            history: vec![Turn::at(TurnRole::System, system_prompt, now)],
            preferences: Map::new(),
            activity,
        }
    }

    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|turn| turn.timestamp)
    }
}

/// Bounded per-session conversation history
pub struct ConversationStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    config: ConversationConfig,
    activity_seq: AtomicU64,
}

impl ConversationStore {
    pub fn new(config: ConversationConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            activity_seq: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    fn next_activity(&self) -> u64 {
        self.activity_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Append a turn stamped with the current time
    pub fn append(&self, session_id: &str, role: TurnRole, content: impl Into<String>) -> Vec<Turn> {
        self.append_at(session_id, role, content, Utc::now())
    }

    /// Append a turn with an explicit timestamp and return the full history
    ///
    /// Creates the session (seeded with the system prompt) if absent, then
    /// evicts the oldest non-system turns until the cap holds.
    pub fn append_at(
        &self,
        session_id: &str,
        role: TurnRole,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Vec<Turn> {
        let activity = self.next_activity();
        let max_turns = self.config.max_turns.max(2);

        let mut sessions = self.sessions.write();
        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            tracing::debug!(session_id, "Creating conversation");
            SessionEntry::seeded(&self.config.system_prompt, now, activity)
        });

        entry.history.push(Turn::at(role, content, now));
        if entry.history.len() > max_turns {
            let excess = entry.history.len() - max_turns;
            entry.history.drain(1..1 + excess);
        }
        entry.activity = activity;

        entry.history.clone()
    }

    /// Drop the session; the next append starts from a fresh system prompt
    pub fn reset(&self, session_id: &str) {
        if self.sessions.write().remove(session_id).is_some() {
            tracing::debug!(session_id, "Conversation reset");
        }
    }

    /// Remove every session whose latest turn is older than the expiry window
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let expiry = self.config.expiry();
        let mut sessions = self.sessions.write();
        let before = sessions.len();

        sessions.retain(|_, entry| match entry.last_activity() {
            Some(last) => match (now - last).to_std() {
                Ok(age) => age <= expiry,
                // Turn stamped in the future
                Err(_) => true,
            },
            None => false,
        });

        before - sessions.len()
    }

    /// Start the periodic sweep
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_sweeper(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let period = store.config.sweep_interval();

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(period);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = store.sweep(Utc::now());
                        if removed > 0 {
                            tracing::info!(
                                "Conversation sweep: removed {} expired sessions ({} remaining)",
                                removed,
                                store.len()
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Conversation sweeper shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Schedule deletion of a disconnected session after `delay`
    ///
    /// Any append before the delay elapses supersedes the deletion. The
    /// returned task resolves to whether the session was removed; `None`
    /// when there is no such session.
    pub fn expire_on_disconnect(
        self: &Arc<Self>,
        session_id: &str,
        delay: Duration,
    ) -> Option<JoinHandle<bool>> {
        let activity = self.sessions.read().get(session_id)?.activity;
        let store = Arc::clone(self);
        let session_id = session_id.to_string();

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut sessions = store.sessions.write();
            match sessions.get(&session_id) {
                Some(entry) if entry.activity == activity => {
                    sessions.remove(&session_id);
                    tracing::debug!(session_id = %session_id, "Disconnected session expired");
                    true
                },
                _ => false,
            }
        }))
    }

    /// Merge a JSON object into the session's preferences
    ///
    /// Non-object values are ignored. Returns whether anything was merged.
    pub fn merge_preferences(&self, session_id: &str, value: &Value) -> bool {
        let Some(object) = value.as_object() else {
            tracing::debug!(session_id, "Ignoring non-object context");
            return false;
        };

        let activity = self.next_activity();
        let mut sessions = self.sessions.write();
        let entry = sessions.entry(session_id.to_string()).or_insert_with(|| {
            SessionEntry::seeded(&self.config.system_prompt, Utc::now(), activity)
        });
        for (key, val) in object {
            entry.preferences.insert(key.clone(), val.clone());
        }
        true
    }

    pub fn preferences(&self, session_id: &str) -> Option<Value> {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| Value::Object(entry.preferences.clone()))
    }

    pub fn history(&self, session_id: &str) -> Option<Vec<Turn>> {
        self.sessions.read().get(session_id).map(|entry| entry.history.clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(ConversationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn store() -> ConversationStore {
        ConversationStore::default()
    }

    #[test]
    fn test_first_append_seeds_system_prompt() {
        let store = store();
        let history = store.append("s1", TurnRole::User, "hi");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, TurnRole::System);
        assert_eq!(history[1].content, "hi");
    }

    #[test]
    fn test_cap_never_exceeded() {
        let store = store();
        for i in 0..30 {
            let role = if i % 2 == 0 { TurnRole::User } else { TurnRole::Assistant };
            let history = store.append("s1", role, format!("turn {}", i));
            assert!(history.len() <= 11);
            assert_eq!(history[0].role, TurnRole::System);
        }
        let history = store.history("s1").unwrap();
        assert_eq!(history.len(), 11);
        // Oldest non-system turns were evicted
        assert_eq!(history[1].content, "turn 20");
        assert_eq!(history[10].content, "turn 29");
    }

    #[test]
    fn test_reset_then_append() {
        let store = store();
        store.append("s1", TurnRole::User, "one");
        store.append("s1", TurnRole::Assistant, "two");
        store.reset("s1");
        assert!(!store.contains("s1"));

        let history = store.append("s1", TurnRole::User, "three");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, TurnRole::System);

        // Resetting an unknown session is a no-op
        store.reset("missing");
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = store();
        store.append("a", TurnRole::User, "from a");
        store.append("b", TurnRole::User, "from b");
        assert_eq!(store.len(), 2);
        assert_eq!(store.history("a").unwrap()[1].content, "from a");
    }

    #[test]
    fn test_sweep_boundary() {
        let store = store();
        let start = Utc::now();
        store.append_at("old", TurnRole::User, "x", start);
        store.append_at("edge", TurnRole::User, "y", start + ChronoDuration::seconds(1));

        // Exactly at the expiry window: kept
        let now = start + ChronoDuration::seconds(3601);
        assert_eq!(store.sweep(now), 1);
        assert!(!store.contains("old"));
        assert!(store.contains("edge"));

        // Idempotent
        assert_eq!(store.sweep(now), 0);
        assert_eq!(store.sweep(now + ChronoDuration::seconds(1)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_uses_latest_turn() {
        let store = store();
        let start = Utc::now();
        store.append_at("s1", TurnRole::User, "x", start);
        store.append_at("s1", TurnRole::User, "y", start + ChronoDuration::minutes(50));
        assert_eq!(store.sweep(start + ChronoDuration::minutes(70)), 0);
    }

    #[test]
    fn test_merge_preferences() {
        let store = store();
        assert!(store.merge_preferences("s1", &serde_json::json!({"voice": "Samantha"})));
        assert!(store.merge_preferences("s1", &serde_json::json!({"lang": "en-GB"})));
        assert!(!store.merge_preferences("s1", &serde_json::json!("not an object")));

        let prefs = store.preferences("s1").unwrap();
        assert_eq!(prefs["voice"], "Samantha");
        assert_eq!(prefs["lang"], "en-GB");
        // Preferences never enter the history
        assert_eq!(store.history("s1").unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_expiry_fires() {
        let store = Arc::new(store());
        store.append("s1", TurnRole::User, "hi");

        let handle = store
            .expire_on_disconnect("s1", Duration::from_secs(3600))
            .unwrap();
        assert!(handle.await.unwrap());
        assert!(!store.contains("s1"));

        // A later append recreates state
        assert_eq!(store.append("s1", TurnRole::User, "back").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_expiry_superseded_by_append() {
        let store = Arc::new(store());
        store.append("s1", TurnRole::User, "hi");

        let handle = store
            .expire_on_disconnect("s1", Duration::from_secs(3600))
            .unwrap();
        store.append("s1", TurnRole::User, "reconnected");

        assert!(!handle.await.unwrap());
        assert_eq!(store.history("s1").unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_expiry_after_reset_and_recreate() {
        let store = Arc::new(store());
        store.append("s1", TurnRole::User, "hi");
        let handle = store
            .expire_on_disconnect("s1", Duration::from_secs(60))
            .unwrap();

        store.reset("s1");
        store.append("s1", TurnRole::User, "fresh");

        assert!(!handle.await.unwrap());
        assert!(store.contains("s1"));
    }

    #[test]
    fn test_expire_unknown_session() {
        let store = Arc::new(store());
        assert!(store.expire_on_disconnect("nope", Duration::from_secs(1)).is_none());
    }
}
