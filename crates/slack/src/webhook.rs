use blockbot_core::config::BotConfig;
use blockbot_core::domain::block::UserId;
use serde::{Deserialize, Serialize};

/// Form fields Slack posts for an outgoing webhook.
///
/// ```text
/// token=abc123&team_id=T0001&channel_id=C123456&channel_name=test
/// &timestamp=1355517523.000005&user_id=U123456&user_name=Steve
/// &text=blockbot set blocker <@U2>&trigger_word=blockbot
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutgoingWebhookPayload {
    pub token: Option<String>,
    pub team_id: Option<String>,
    pub team_domain: Option<String>,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub timestamp: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub text: Option<String>,
    pub trigger_word: Option<String>,
}

impl OutgoingWebhookPayload {
    pub fn requester(&self) -> Option<UserId> {
        non_empty(self.user_id.as_deref())
            .or_else(|| non_empty(self.user_name.as_deref()))
            .map(|id| UserId(id.to_owned()))
    }

    pub fn channel_label(&self) -> String {
        non_empty(self.channel_name.as_deref())
            .or_else(|| non_empty(self.channel_id.as_deref()))
            .unwrap_or("unknown-channel")
            .to_owned()
    }

    /// `team:channel:timestamp`, or `None` when Slack sent none of them.
    pub fn correlation_id(&self) -> Option<String> {
        let parts = [&self.team_id, &self.channel_id, &self.timestamp];
        if parts.iter().all(|part| non_empty(part.as_deref()).is_none()) {
            return None;
        }

        Some(
            parts
                .iter()
                .map(|part| non_empty(part.as_deref()).unwrap_or("-"))
                .collect::<Vec<_>>()
                .join(":"),
        )
    }
}

impl std::fmt::Debug for OutgoingWebhookPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutgoingWebhookPayload")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("team_id", &self.team_id)
            .field("team_domain", &self.team_domain)
            .field("channel_id", &self.channel_id)
            .field("channel_name", &self.channel_name)
            .field("timestamp", &self.timestamp)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("text", &self.text)
            .field("trigger_word", &self.trigger_word)
            .finish()
    }
}

/// JSON body Slack expects back from an outgoing webhook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookReply {
    pub text: String,
    pub link_names: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

impl WebhookReply {
    pub fn new(text: impl Into<String>, bot: &BotConfig) -> Self {
        Self {
            text: text.into(),
            link_names: 1,
            username: bot.username.clone(),
            icon_emoji: bot.icon_emoji.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
