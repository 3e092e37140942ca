use serenity::all::ChannelId;

/// Plain substring match, case-sensitive. "wwwhat" and "https" both count.
pub fn contains_link(content: &str) -> bool {
    content.contains("http") || content.contains("www")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkVerdict {
    Allow,
    Violation,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkFilter {
    exempt_channel: ChannelId,
}

impl LinkFilter {
    pub fn new(exempt_channel: ChannelId) -> Self {
        Self { exempt_channel }
    }

    pub fn check(&self, channel_id: ChannelId, content: &str) -> LinkVerdict {
        if contains_link(content) && channel_id != self.exempt_channel {
            LinkVerdict::Violation
        } else {
            LinkVerdict::Allow
        }
    }
}
