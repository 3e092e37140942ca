use async_trait::async_trait;
use serenity::all::{
    ChannelId, Color, CreateEmbed, CreateEmbedAuthor, CreateMessage, EditMember, GetMessages,
    GuildId, MessageId, Timestamp, UserId,
};
use serenity::http::Http;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::violations::ModLogRecord;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("discord request failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error("timeout deadline out of range: {0}s")]
    InvalidDeadline(i64),

    #[error("{0}")]
    Rejected(String),
}

/// Everything the moderation core asks of the chat platform.
#[async_trait]
pub trait ModerationPlatform: Send + Sync {
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError>;

    async fn bulk_delete(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), PlatformError>;

    async fn timeout_member(
        &self,
        user_id: UserId,
        duration: Duration,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn fetch_recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
        before: MessageId,
    ) -> Result<Vec<MessageId>, PlatformError>;

    async fn send_log(
        &self,
        channel_id: ChannelId,
        record: &ModLogRecord,
    ) -> Result<(), PlatformError>;

    async fn ban_member(&self, user_id: UserId, reason: &str) -> Result<(), PlatformError>;
}

/// Serenity HTTP client bound to the one guild the bot moderates.
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

pub fn log_embed(record: &ModLogRecord) -> CreateEmbed {
    CreateEmbed::default()
        .color(Color::from_rgb(0, 0, 0))
        .author(CreateEmbedAuthor::new(record.author().tag.clone()))
        .description(record.description())
}

#[async_trait]
impl ModerationPlatform for SerenityPlatform {
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        channel_id.delete_message(&self.http, message_id).await?;
        Ok(())
    }

    async fn bulk_delete(
        &self,
        channel_id: ChannelId,
        message_ids: &[MessageId],
    ) -> Result<(), PlatformError> {
        match message_ids {
            [] => Ok(()),
            [single] => self.delete_message(channel_id, *single).await,
            _ => {
                channel_id
                    .delete_messages(&self.http, message_ids.iter())
                    .await?;
                Ok(())
            }
        }
    }

    async fn timeout_member(
        &self,
        user_id: UserId,
        duration: Duration,
        reason: &str,
    ) -> Result<(), PlatformError> {
        let deadline = Timestamp::now().unix_timestamp() + duration.as_secs() as i64;
        let until = Timestamp::from_unix_timestamp(deadline)
            .map_err(|_| PlatformError::InvalidDeadline(deadline))?;

        self.guild_id
            .edit_member(
                &self.http,
                user_id,
                EditMember::new()
                    .disable_communication_until_datetime(until)
                    .audit_log_reason(reason),
            )
            .await?;
        Ok(())
    }

    async fn fetch_recent_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
        before: MessageId,
    ) -> Result<Vec<MessageId>, PlatformError> {
        let messages = channel_id
            .messages(&self.http, GetMessages::new().before(before).limit(limit))
            .await?;
        Ok(messages.into_iter().map(|message| message.id).collect())
    }

    async fn send_log(
        &self,
        channel_id: ChannelId,
        record: &ModLogRecord,
    ) -> Result<(), PlatformError> {
        channel_id
            .send_message(&self.http, CreateMessage::new().embed(log_embed(record)))
            .await?;
        Ok(())
    }

    async fn ban_member(&self, user_id: UserId, reason: &str) -> Result<(), PlatformError> {
        self.guild_id
            .ban_with_reason(&self.http, user_id, 0, reason)
            .await?;
        Ok(())
    }
}
