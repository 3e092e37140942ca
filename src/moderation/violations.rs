use serenity::all::{ChannelId, Mentionable, MessageId, UserId};
use std::fmt;

use crate::commands::moderate::MuteDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Link,
    Spam,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Link => f.write_str("link"),
            ViolationKind::Spam => f.write_str("spam"),
        }
    }
}

/// A user as shown in the log channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedUser {
    pub id: UserId,
    pub tag: String,
}

impl LoggedUser {
    pub fn new(id: UserId, tag: impl Into<String>) -> Self {
        Self { id, tag: tag.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub author: LoggedUser,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModLogRecord {
    LinkDeleted {
        user: LoggedUser,
        content: String,
    },
    SpamTimeout {
        user: LoggedUser,
    },
    Banned {
        admin: LoggedUser,
        user: LoggedUser,
        reason: String,
    },
    Muted {
        admin: LoggedUser,
        user: LoggedUser,
        duration: MuteDuration,
    },
}

impl ModLogRecord {
    pub fn for_violation(violation: &Violation) -> Self {
        match violation.kind {
            ViolationKind::Link => ModLogRecord::LinkDeleted {
                user: violation.author.clone(),
                content: violation.content.clone(),
            },
            ViolationKind::Spam => ModLogRecord::SpamTimeout {
                user: violation.author.clone(),
            },
        }
    }

    /// Whose name heads the log entry: the offender for automatic actions,
    /// the admin for commands.
    pub fn author(&self) -> &LoggedUser {
        match self {
            ModLogRecord::LinkDeleted { user, .. } | ModLogRecord::SpamTimeout { user } => user,
            ModLogRecord::Banned { admin, .. } | ModLogRecord::Muted { admin, .. } => admin,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            ModLogRecord::LinkDeleted { .. } => "Delete Messages",
            ModLogRecord::SpamTimeout { .. } => "Timeout 1 hour",
            ModLogRecord::Banned { .. } => "Ban",
            ModLogRecord::Muted { .. } => "Mute",
        }
    }

    pub fn description(&self) -> String {
        match self {
            ModLogRecord::LinkDeleted { user, content } => format!(
                "**User:** {}\n**Sent Link:** {}\n**Response:** Delete Messages",
                user.id.mention(),
                content
            ),
            ModLogRecord::SpamTimeout { user } => format!(
                "**User:** {}\n**Timeout:** 1 hour\n**Response:** Delete Messages",
                user.id.mention()
            ),
            ModLogRecord::Banned { admin, user, reason } => format!(
                "**Admin:** {}\n**Ban - Reason:** {}\n**User:** {}",
                admin.id.mention(),
                reason,
                user.tag
            ),
            ModLogRecord::Muted {
                admin,
                user,
                duration,
            } => format!(
                "**Admin:** {}\n**Mute Duration:** {}\n**User:** {}",
                admin.id.mention(),
                duration.token(),
                user.tag
            ),
        }
    }
}
