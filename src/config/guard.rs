use anyhow::{anyhow, Context as _};
use serenity::all::{ChannelId, GuildId, RoleId};
use shuttle_runtime::SecretStore;

/// Ids the guard needs, read from `Secrets.toml` at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub guild_id: GuildId,
    pub link_channel_id: ChannelId,
    pub log_channel_id: ChannelId,
    pub owner_role_id: RoleId,
}

impl GuardConfig {
    pub fn from_secrets(secrets: &SecretStore) -> anyhow::Result<Self> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let id = |key: &str| -> anyhow::Result<u64> {
            let raw = get(key).ok_or_else(|| anyhow!("'{key}' was not found"))?;
            let id: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse {key}"))?;
            if id == 0 {
                return Err(anyhow!("{key} must not be zero"));
            }
            Ok(id)
        };

        Ok(Self {
            guild_id: GuildId::new(id("GUILD_ID")?),
            link_channel_id: ChannelId::new(id("LINK_CHANNEL_ID")?),
            log_channel_id: ChannelId::new(id("LOG_CHANNEL_ID")?),
            owner_role_id: RoleId::new(id("OWNER_ROLE_ID")?),
        })
    }
}
