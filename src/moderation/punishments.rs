use serenity::all::{ChannelId, MessageId};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::platform::{ModerationPlatform, PlatformError};
use super::violations::{ModLogRecord, Violation, ViolationKind};

pub const SPAM_TIMEOUT: Duration = Duration::from_millis(3_600_000);
pub const SPAM_CONTEXT_MESSAGES: u8 = 3;
pub const SPAM_TIMEOUT_REASON: &str = "Spam detection";

/// Which steps of one enforcement failed. Nothing here is retried.
#[derive(Debug, Default)]
pub struct EnforcementReport {
    pub delete: Option<PlatformError>,
    pub timeout: Option<PlatformError>,
    pub log: Option<PlatformError>,
}

impl EnforcementReport {
    pub fn is_clean(&self) -> bool {
        self.delete.is_none() && self.timeout.is_none() && self.log.is_none()
    }
}

#[derive(Clone)]
pub struct ModerationActuator {
    platform: Arc<dyn ModerationPlatform>,
    log_channel: ChannelId,
}

impl ModerationActuator {
    pub fn new(platform: Arc<dyn ModerationPlatform>, log_channel: ChannelId) -> Self {
        Self {
            platform,
            log_channel,
        }
    }

    pub fn platform(&self) -> &Arc<dyn ModerationPlatform> {
        &self.platform
    }

    /// Runs the enforcement on its own task so the event handler never waits on Discord.
    pub fn dispatch(&self, violation: Violation) -> JoinHandle<EnforcementReport> {
        let actuator = self.clone();
        tokio::spawn(async move { actuator.enforce(&violation).await })
    }

    /// Remediation first, then the log record, whatever the remediation outcome.
    pub async fn enforce(&self, violation: &Violation) -> EnforcementReport {
        info!(
            "{} violation by {} ({}) in channel {}",
            violation.kind, violation.author.tag, violation.author.id, violation.channel_id
        );

        let mut report = EnforcementReport::default();
        match violation.kind {
            ViolationKind::Link => {
                if let Err(e) = self
                    .platform
                    .delete_message(violation.channel_id, violation.message_id)
                    .await
                {
                    error!("Failed to delete link message: {:?}", e);
                    report.delete = Some(e);
                }
            }
            ViolationKind::Spam => {
                if let Err(e) = self.purge_spam(violation).await {
                    error!("Failed to bulk delete spam: {:?}", e);
                    report.delete = Some(e);
                }
                if let Err(e) = self
                    .platform
                    .timeout_member(violation.author.id, SPAM_TIMEOUT, SPAM_TIMEOUT_REASON)
                    .await
                {
                    error!("Failed to timeout member: {:?}", e);
                    report.timeout = Some(e);
                }
            }
        }

        report.log = self.log(&ModLogRecord::for_violation(violation)).await.err();
        report
    }

    /// Sends a record to the log channel; failures are reported, not raised.
    pub async fn log(&self, record: &ModLogRecord) -> Result<(), PlatformError> {
        self.platform
            .send_log(self.log_channel, record)
            .await
            .inspect_err(|e| error!("Failed to send log record: {:?}", e))
    }

    /// Deletes the trigger even when the earlier messages cannot be fetched.
    async fn purge_spam(&self, violation: &Violation) -> Result<(), PlatformError> {
        let (mut targets, fetch_err) = match self
            .platform
            .fetch_recent_messages(
                violation.channel_id,
                SPAM_CONTEXT_MESSAGES,
                violation.message_id,
            )
            .await
        {
            Ok(ids) => (ids, None),
            Err(e) => {
                error!("Failed to fetch messages before spam: {:?}", e);
                (Vec::new(), Some(e))
            }
        };
        targets.push(violation.message_id);
        self.platform
            .bulk_delete(violation.channel_id, &targets)
            .await?;
        fetch_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::testing::{PlatformCall, RecordingPlatform};
    use crate::moderation::violations::LoggedUser;
    use serenity::all::UserId;

    const LOGS: ChannelId = ChannelId::new(900);
    const GENERAL: ChannelId = ChannelId::new(200);

    fn violation(kind: ViolationKind) -> Violation {
        Violation {
            kind,
            channel_id: GENERAL,
            message_id: MessageId::new(50),
            author: LoggedUser::new(UserId::new(7), "loud"),
            content: "http://x".to_string(),
        }
    }

    fn actuator(platform: &Arc<RecordingPlatform>) -> ModerationActuator {
        ModerationActuator::new(platform.clone(), LOGS)
    }

    #[tokio::test]
    async fn link_violation_deletes_then_logs() {
        let platform = Arc::new(RecordingPlatform::default());
        let report = actuator(&platform)
            .enforce(&violation(ViolationKind::Link))
            .await;

        assert!(report.is_clean());
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::Delete(GENERAL, MessageId::new(50)),
                PlatformCall::Log(LOGS, "Delete Messages".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn spam_violation_purges_times_out_then_logs() {
        let platform = Arc::new(RecordingPlatform::with_history(vec![
            MessageId::new(47),
            MessageId::new(48),
            MessageId::new(49),
        ]));
        let report = actuator(&platform)
            .enforce(&violation(ViolationKind::Spam))
            .await;

        assert!(report.is_clean());
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::Fetch(GENERAL, 3, MessageId::new(50)),
                PlatformCall::BulkDelete(
                    GENERAL,
                    vec![
                        MessageId::new(47),
                        MessageId::new(48),
                        MessageId::new(49),
                        MessageId::new(50),
                    ]
                ),
                PlatformCall::Timeout(UserId::new(7), 3_600_000, "Spam detection".to_string()),
                PlatformCall::Log(LOGS, "Timeout 1 hour".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_remediation_still_logs() {
        let platform = Arc::new(RecordingPlatform::default());
        platform.fail_removals();
        let report = actuator(&platform)
            .enforce(&violation(ViolationKind::Spam))
            .await;

        assert!(report.delete.is_some());
        assert!(report.timeout.is_some());
        assert!(report.log.is_none());
        assert_eq!(
            platform.calls().last(),
            Some(&PlatformCall::Log(LOGS, "Timeout 1 hour".to_string()))
        );
    }

    #[tokio::test]
    async fn failed_fetch_still_deletes_the_trigger() {
        let platform = Arc::new(RecordingPlatform::with_history(vec![MessageId::new(49)]));
        platform.fail_fetches();
        let report = actuator(&platform)
            .enforce(&violation(ViolationKind::Spam))
            .await;

        assert!(report.delete.is_some());
        assert!(report.timeout.is_none());
        assert!(report.log.is_none());
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::Fetch(GENERAL, 3, MessageId::new(50)),
                PlatformCall::BulkDelete(GENERAL, vec![MessageId::new(50)]),
                PlatformCall::Timeout(UserId::new(7), 3_600_000, "Spam detection".to_string()),
                PlatformCall::Log(LOGS, "Timeout 1 hour".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_log_does_not_undo_remediation() {
        let platform = Arc::new(RecordingPlatform::default());
        platform.fail_logs();
        let report = actuator(&platform)
            .enforce(&violation(ViolationKind::Link))
            .await;

        assert!(report.delete.is_none());
        assert!(report.log.is_some());
        assert_eq!(
            platform.calls()[0],
            PlatformCall::Delete(GENERAL, MessageId::new(50))
        );
    }

    #[tokio::test]
    async fn dispatch_runs_on_its_own_task() {
        let platform = Arc::new(RecordingPlatform::default());
        let report = actuator(&platform)
            .dispatch(violation(ViolationKind::Link))
            .await
            .expect("enforcement task panicked");

        assert!(report.is_clean());
        assert_eq!(platform.calls().len(), 2);
    }
}
