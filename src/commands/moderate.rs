use serenity::all::{RoleId, User};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandOptionType, ResolvedOption, ResolvedValue};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::moderation::platform::PlatformError;
use crate::moderation::punishments::ModerationActuator;
use crate::moderation::violations::{LoggedUser, ModLogRecord};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("You do not have permission to use this command.")]
    MissingPermission,

    #[error("Missing required option `{0}`")]
    MissingOption(&'static str),

    #[error("Unknown mute duration `{0}`. Use one of: 1min, 1hour, 1day, 1week")]
    UnknownDuration(String),

    #[error("This command can only be used in a server.")]
    NotInGuild,

    #[error("Unknown command `/{0}`")]
    UnknownCommand(String),

    #[error("Discord rejected the request: {0}")]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteDuration {
    OneMinute,
    OneHour,
    OneDay,
    OneWeek,
}

impl MuteDuration {
    pub const ALL: [MuteDuration; 4] = [
        MuteDuration::OneMinute,
        MuteDuration::OneHour,
        MuteDuration::OneDay,
        MuteDuration::OneWeek,
    ];

    pub fn token(self) -> &'static str {
        match self {
            MuteDuration::OneMinute => "1min",
            MuteDuration::OneHour => "1hour",
            MuteDuration::OneDay => "1day",
            MuteDuration::OneWeek => "1week",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MuteDuration::OneMinute => "1 Minute",
            MuteDuration::OneHour => "1 Hour",
            MuteDuration::OneDay => "1 Day",
            MuteDuration::OneWeek => "1 Week",
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(match self {
            MuteDuration::OneMinute => 60_000,
            MuteDuration::OneHour => 3_600_000,
            MuteDuration::OneDay => 86_400_000,
            MuteDuration::OneWeek => 604_800_000,
        })
    }
}

impl FromStr for MuteDuration {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        MuteDuration::ALL
            .into_iter()
            .find(|d| d.token() == token)
            .ok_or_else(|| CommandError::UnknownDuration(token.to_string()))
    }
}

pub fn check_permission(roles: &[RoleId], owner_role: RoleId) -> Result<(), CommandError> {
    if roles.contains(&owner_role) {
        Ok(())
    } else {
        Err(CommandError::MissingPermission)
    }
}

fn user_option<'a>(options: &[ResolvedOption<'a>], name: &'static str) -> Result<&'a User, CommandError> {
    options
        .iter()
        .find_map(|option| match option.value {
            ResolvedValue::User(user, _) if option.name == name => Some(user),
            _ => None,
        })
        .ok_or(CommandError::MissingOption(name))
}

fn string_option<'a>(options: &[ResolvedOption<'a>], name: &'static str) -> Result<&'a str, CommandError> {
    options
        .iter()
        .find_map(|option| match option.value {
            ResolvedValue::String(value) if option.name == name => Some(value),
            _ => None,
        })
        .ok_or(CommandError::MissingOption(name))
}

pub async fn run(
    name: &str,
    options: &[ResolvedOption<'_>],
    admin: &LoggedUser,
    actuator: &ModerationActuator,
) -> Result<String, CommandError> {
    match name {
        "ban" => ban(options, admin, actuator).await,
        "mute" => mute(options, admin, actuator).await,
        _ => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

pub async fn ban(
    options: &[ResolvedOption<'_>],
    admin: &LoggedUser,
    actuator: &ModerationActuator,
) -> Result<String, CommandError> {
    let user = user_option(options, "user")?;
    let reason = string_option(options, "reason")?;
    ban_member(LoggedUser::new(user.id, user.tag()), reason, admin, actuator).await
}

pub async fn ban_member(
    target: LoggedUser,
    reason: &str,
    admin: &LoggedUser,
    actuator: &ModerationActuator,
) -> Result<String, CommandError> {
    actuator.platform().ban_member(target.id, reason).await?;
    info!("{} banned {} ({})", admin.tag, target.tag, reason);

    let reply = format!("Successfully banned {}", target.tag);
    // A failed log send is already reported by the actuator.
    actuator
        .log(&ModLogRecord::Banned {
            admin: admin.clone(),
            user: target,
            reason: reason.to_string(),
        })
        .await
        .ok();
    Ok(reply)
}

pub async fn mute(
    options: &[ResolvedOption<'_>],
    admin: &LoggedUser,
    actuator: &ModerationActuator,
) -> Result<String, CommandError> {
    let user = user_option(options, "user")?;
    let token = string_option(options, "time")?;
    mute_member(LoggedUser::new(user.id, user.tag()), token, admin, actuator).await
}

pub async fn mute_member(
    target: LoggedUser,
    token: &str,
    admin: &LoggedUser,
    actuator: &ModerationActuator,
) -> Result<String, CommandError> {
    let duration: MuteDuration = token.parse()?;
    actuator
        .platform()
        .timeout_member(
            target.id,
            duration.duration(),
            &format!("Muted by {}", admin.tag),
        )
        .await
        .inspect_err(|e| error!("Failed to timeout member: {:?}", e))?;
    info!("{} muted {} for {}", admin.tag, target.tag, duration.token());

    let reply = format!("Successfully muted {} for {}", target.tag, duration.token());
    // A failed log send is already reported by the actuator.
    actuator
        .log(&ModLogRecord::Muted {
            admin: admin.clone(),
            user: target,
            duration,
        })
        .await
        .ok();
    Ok(reply)
}

pub fn register_ban() -> CreateCommand {
    CreateCommand::new("ban")
        .description("Ban a user")
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to ban")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "reason", "Reason for ban")
                .required(true),
        )
}

pub fn register_mute() -> CreateCommand {
    let time = MuteDuration::ALL.into_iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "time", "Mute duration")
            .required(true),
        |option, d| option.add_string_choice(d.label(), d.token()),
    );

    CreateCommand::new("mute")
        .description("Mute a user")
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "The user to mute")
                .required(true),
        )
        .add_option(time)
}
