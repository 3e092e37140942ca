use serenity::model::id::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

pub const SPAM_WINDOW: Duration = Duration::from_millis(5000);
pub const SPAM_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRateState {
    pub count: u32,
    pub window_start: Instant,
}

/// Per-user message counts for the current window. Plain map, no locking.
#[derive(Debug, Default)]
pub struct RateTracker {
    users: HashMap<UserId, UserRateState>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one message from `user_id` and returns the resulting state.
    pub fn observe(&mut self, user_id: UserId, now: Instant) -> UserRateState {
        *self
            .users
            .entry(user_id)
            .and_modify(|state| state.count += 1)
            .or_insert(UserRateState {
                count: 1,
                window_start: now,
            })
    }

    pub fn reset(&mut self, user_id: UserId, now: Instant) {
        self.users.insert(
            user_id,
            UserRateState {
                count: 1,
                window_start: now,
            },
        );
    }

    pub fn delete(&mut self, user_id: UserId) -> Option<UserRateState> {
        self.users.remove(&user_id)
    }

    pub fn get(&self, user_id: UserId) -> Option<UserRateState> {
        self.users.get(&user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Drops entries whose window started strictly more than `window` ago.
    /// The next message from such a user would reset the window anyway.
    pub fn evict_expired(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.users.len();
        self.users
            .retain(|_, state| now.saturating_duration_since(state.window_start) <= window);
        before - self.users.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    Allow,
    WindowReset,
    Violation,
}

#[derive(Clone, Default)]
pub struct SpamClassifier {
    tracker: Arc<Mutex<RateTracker>>,
}

impl SpamClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn classify(&self, user_id: UserId, now: Instant) -> SpamVerdict {
        let mut tracker = self.tracker.lock().await;
        let first_seen = tracker.get(user_id).is_none();
        let state = tracker.observe(user_id, now);
        if first_seen {
            return SpamVerdict::Allow;
        }

        let age = now.saturating_duration_since(state.window_start);
        // Equality on purpose: a count that skips past the threshold never fires.
        if state.count == SPAM_THRESHOLD && age <= SPAM_WINDOW {
            tracker.delete(user_id);
            SpamVerdict::Violation
        } else if age >= SPAM_WINDOW {
            tracker.reset(user_id, now);
            SpamVerdict::WindowReset
        } else {
            SpamVerdict::Allow
        }
    }

    pub async fn evict_expired(&self, now: Instant) -> usize {
        self.tracker.lock().await.evict_expired(now, SPAM_WINDOW)
    }

    pub fn get_tracker(&self) -> Arc<Mutex<RateTracker>> {
        self.tracker.clone()
    }
}
