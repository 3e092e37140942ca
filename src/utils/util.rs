use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::error;

use crate::commands::moderate::CommandError;

/// Replies only the invoking admin can see.
pub async fn create_ephemeral_response(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) {
    let builder = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );

    if let Err(why) = command.create_response(&ctx.http, builder).await {
        error!("Cannot respond to slash command: {why}");
    }
}

pub async fn respond_with(
    ctx: &Context,
    command: &CommandInteraction,
    result: Result<String, CommandError>,
) {
    let content = match result {
        Ok(reply) => reply,
        Err(e) => {
            error!("/{} failed: {}", command.data.name, e);
            e.to_string()
        }
    };
    create_ephemeral_response(ctx, command, content).await;
}
