pub mod links;
pub mod platform;
pub mod punishments;
pub mod spam;
pub mod violations;

#[cfg(test)]
pub mod testing;

use serenity::all::{ChannelId, GuildId, Message, MessageId};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant};
use tracing::info;

use links::{LinkFilter, LinkVerdict};
use punishments::{EnforcementReport, ModerationActuator};
use spam::{SpamClassifier, SpamVerdict};
use violations::{LoggedUser, Violation, ViolationKind};

/// The parts of a gateway message the guards look at.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: LoggedUser,
    pub from_bot: bool,
    pub content: String,
}

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id,
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            author: LoggedUser::new(msg.author.id, msg.author.tag()),
            from_bot: msg.author.bot,
            content: msg.content.clone(),
        }
    }
}

impl InboundMessage {
    fn violation(&self, kind: ViolationKind) -> Violation {
        Violation {
            kind,
            channel_id: self.channel_id,
            message_id: self.id,
            author: self.author.clone(),
            content: self.content.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Moderator {
    links: LinkFilter,
    spam: SpamClassifier,
    actuator: ModerationActuator,
}

impl Moderator {
    pub fn new(links: LinkFilter, actuator: ModerationActuator) -> Self {
        Self {
            links,
            spam: SpamClassifier::new(),
            actuator,
        }
    }

    pub fn actuator(&self) -> &ModerationActuator {
        &self.actuator
    }

    /// Link check first, then the rate check. Both can flag the same message.
    pub async fn screen(&self, msg: &InboundMessage, now: Instant) -> Vec<Violation> {
        if msg.from_bot || msg.guild_id.is_none() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        if self.links.check(msg.channel_id, &msg.content) == LinkVerdict::Violation {
            violations.push(msg.violation(ViolationKind::Link));
        }
        if self.spam.classify(msg.author.id, now).await == SpamVerdict::Violation {
            violations.push(msg.violation(ViolationKind::Spam));
        }
        violations
    }

    pub async fn handle(&self, msg: &InboundMessage) -> Vec<JoinHandle<EnforcementReport>> {
        self.screen(msg, Instant::now())
            .await
            .into_iter()
            .map(|violation| self.actuator.dispatch(violation))
            .collect()
    }

    /// Periodically forgets users whose window has long expired.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let spam = self.spam.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let evicted = spam.evict_expired(Instant::now()).await;
                if evicted > 0 {
                    info!("Evicted {} idle rate trackers", evicted);
                }
            }
        })
    }
}
