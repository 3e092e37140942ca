use anyhow::Context as _;
use once_cell::sync::OnceCell;
use serenity::all::{CommandInteraction, Interaction, Message, Ready};
use serenity::async_trait;
use serenity::prelude::*;
use shuttle_runtime::SecretStore;
use std::sync::Arc;
use tracing::{error, info, warn};

mod commands;
mod config;
mod moderation;
mod utils;

use crate::commands::moderate::{self, CommandError};
use crate::config::guard::GuardConfig;
use crate::moderation::links::LinkFilter;
use crate::moderation::platform::SerenityPlatform;
use crate::moderation::punishments::ModerationActuator;
use crate::moderation::spam::SPAM_WINDOW;
use crate::moderation::violations::LoggedUser;
use crate::moderation::{InboundMessage, Moderator};
use crate::utils::util::{create_ephemeral_response, respond_with};

struct Bot {
    config: GuardConfig,
    // Needs the gateway's HTTP client, so it is built on the first Ready.
    moderator: OnceCell<Moderator>,
}

impl Bot {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            moderator: OnceCell::new(),
        }
    }

    async fn run_command(
        &self,
        moderator: &Moderator,
        command: &CommandInteraction,
    ) -> Result<String, CommandError> {
        let roles = command
            .member
            .as_ref()
            .ok_or(CommandError::NotInGuild)?
            .roles
            .clone();
        moderate::check_permission(&roles, self.config.owner_role_id)?;

        let admin = LoggedUser::new(command.user.id, command.user.tag());
        let options = command.data.options();
        moderate::run(&command.data.name, &options, &admin, moderator.actuator()).await
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(moderator) = self.moderator.get() else {
            warn!("Message {} arrived before the bot was ready", msg.id);
            return;
        };
        // Enforcement runs on spawned tasks; nothing to wait for here.
        moderator.handle(&InboundMessage::from(&msg)).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        info!("Received /{} from {}", command.data.name, command.user.tag());

        let Some(moderator) = self.moderator.get() else {
            create_ephemeral_response(&ctx, &command, "The bot is still starting up.").await;
            return;
        };
        let result = self.run_command(moderator, &command).await;
        respond_with(&ctx, &command, result).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let mut first_ready = false;
        let moderator = self.moderator.get_or_init(|| {
            first_ready = true;
            let platform = SerenityPlatform::new(ctx.http.clone(), self.config.guild_id);
            Moderator::new(
                LinkFilter::new(self.config.link_channel_id),
                ModerationActuator::new(Arc::new(platform), self.config.log_channel_id),
            )
        });
        if first_ready {
            moderator.spawn_sweeper(SPAM_WINDOW * 12);
        }

        match self
            .config
            .guild_id
            .set_commands(
                &ctx.http,
                vec![moderate::register_ban(), moderate::register_mute()],
            )
            .await
        {
            Ok(commands) => info!("Commands deployed successfully! ({} registered)", commands.len()),
            Err(e) => error!("Error deploying commands: {:?}", e),
        }
    }
}

#[shuttle_runtime::main]
async fn serenity(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> shuttle_serenity::ShuttleSerenity {
    let token = secrets
        .get("DISCORD_TOKEN")
        .context("'DISCORD_TOKEN' was not found")?;
    let config = GuardConfig::from_secrets(&secrets)?;

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let client = Client::builder(&token, intents)
        .event_handler(Bot::new(config))
        .await
        .context("Err creating client")?;

    Ok(client.into())
}
