//! In-memory platform double for the moderation tests.

use async_trait::async_trait;
use serenity::all::{ChannelId, MessageId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::platform::{ModerationPlatform, PlatformError};
use super::violations::ModLogRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Delete(ChannelId, MessageId),
    BulkDelete(ChannelId, Vec<MessageId>),
    Timeout(UserId, u128, String),
    Fetch(ChannelId, u8, MessageId),
    /// Log channel and the record's action label.
    Log(ChannelId, String),
    Ban(UserId, String),
}

#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    logged: Mutex<Vec<ModLogRecord>>,
    history: Vec<MessageId>,
    fail_removals: AtomicBool,
    fail_logs: AtomicBool,
    fail_fetches: AtomicBool,
}

impl RecordingPlatform {
    pub fn with_history(history: Vec<MessageId>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Deletes, timeouts and bans all fail from now on.
    pub fn fail_removals(&self) {
        self.fail_removals.store(true, Ordering::SeqCst);
    }

    pub fn fail_logs(&self) {
        self.fail_logs.store(true, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self) {
        self.fail_fetches.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn logged(&self) -> Vec<ModLogRecord> {
        self.logged.lock().unwrap().clone()
    }

    fn record(&self, call: PlatformCall, fails: &AtomicBool) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(call);
        if fails.load(Ordering::SeqCst) {
            Err(PlatformError::Rejected("Missing Permissions".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ModerationPlatform for RecordingPlatform {
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Delete(channel_id, message_id),
            &self.fail_removals,
        )
    }

    async fn bulk_delete(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::BulkDelete(channel_id, message_ids.to_vec()),
            &self.fail_removals,
        )
    }

    async fn timeout_member(
        &self,
        user_id: UserId,
        duration: Duration,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Timeout(user_id, duration.as_millis(), reason.to_string()),
            &self.fail_removals,
        )
    }

    async fn fetch_recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
        before: MessageId,
    ) -> Result<Vec<MessageId>, PlatformError> {
        self.record(
            PlatformCall::Fetch(channel_id, limit, before),
            &self.fail_fetches,
        )?;
        Ok(self
            .history
            .iter()
            .copied()
            .filter(|id| *id < before)
            .take(limit as usize)
            .collect())
    }

    async fn send_log(
        &self,
        channel_id: ChannelId,
        record: &ModLogRecord,
    ) -> Result<(), PlatformError> {
        self.logged.lock().unwrap().push(record.clone());
        self.record(
            PlatformCall::Log(channel_id, record.action().to_string()),
            &self.fail_logs,
        )
    }

    async fn ban_member(&self, user_id: UserId, reason: &str) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Ban(user_id, reason.to_string()),
            &self.fail_removals,
        )
    }
}
