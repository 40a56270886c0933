use async_trait::async_trait;
use blockbot_core::domain::block::UserId;
use blockbot_core::errors::ApplicationError;
use tracing::debug;

use crate::replies;
use crate::webhook::OutgoingWebhookPayload;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockCommand {
    SetBlocker,
    Resolve,
    Ping,
    Help,
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub command: BlockCommand,
    /// Message text with the trigger word removed and whitespace trimmed.
    pub text: String,
    pub requester: Option<UserId>,
    pub channel: String,
    pub correlation_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetBlockerRequest {
    /// `None` when the payload carried neither `user_id` nor `user_name`.
    pub requester: Option<UserId>,
    /// `None` when the text carried no `@USER` mention.
    pub blocker: Option<UserId>,
    pub channel: String,
    pub text: String,
    pub correlation_id: String,
}

/// Removes the first occurrence of `trigger_word` and trims what is left.
pub fn strip_trigger_word(text: &str, trigger_word: &str) -> String {
    if trigger_word.is_empty() {
        return text.trim().to_owned();
    }
    text.replacen(trigger_word, "", 1).trim().to_owned()
}

/// Ordered prefix match; the first pattern that fits wins.
pub fn classify_command(text: &str) -> BlockCommand {
    let normalized = text.to_lowercase();

    if normalized.starts_with("set blocker") {
        BlockCommand::SetBlocker
    } else if normalized.starts_with("resolve") {
        BlockCommand::Resolve
    } else if normalized.starts_with("ping") || normalized.starts_with("status") {
        BlockCommand::Ping
    } else if normalized == "help" {
        BlockCommand::Help
    } else {
        BlockCommand::Invalid
    }
}

/// Pulls the user id out of `<@U123>`, `<@U123|name>` or `@U123`.
pub fn extract_mention(text: &str) -> Option<UserId> {
    let (_, after_at) = text.split_once('@')?;
    let id: String = after_at
        .chars()
        .take_while(|ch| *ch != '>' && *ch != '|' && !ch.is_whitespace())
        .collect();

    if id.is_empty() {
        None
    } else {
        Some(UserId(id))
    }
}

pub fn normalize_webhook(
    payload: &OutgoingWebhookPayload,
    default_trigger_word: &str,
) -> CommandEnvelope {
    let trigger_word = payload
        .trigger_word
        .as_deref()
        .filter(|word| !word.trim().is_empty())
        .unwrap_or(default_trigger_word);
    let text = strip_trigger_word(payload.text.as_deref().unwrap_or_default(), trigger_word);

    CommandEnvelope {
        command: classify_command(&text),
        text,
        requester: payload.requester(),
        channel: payload.channel_label(),
        correlation_id: payload.correlation_id().unwrap_or_else(|| "unassigned".to_owned()),
    }
}

#[async_trait]
pub trait BlockCommandService: Send + Sync {
    async fn set_blocker(&self, request: SetBlockerRequest) -> Result<String, ApplicationError>;

    async fn resolve(&self, envelope: &CommandEnvelope) -> Result<String, ApplicationError>;

    async fn ping(&self, envelope: &CommandEnvelope) -> Result<String, ApplicationError>;
}

pub struct CommandRouter<S> {
    service: S,
    bot_name: String,
}

impl<S> CommandRouter<S>
where
    S: BlockCommandService,
{
    pub fn new(service: S, bot_name: impl Into<String>) -> Self {
        Self { service, bot_name: bot_name.into() }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn route(&self, envelope: &CommandEnvelope) -> Result<String, ApplicationError> {
        debug!(
            event_name = "webhook.command.classified",
            correlation_id = %envelope.correlation_id,
            command = ?envelope.command,
            "routing block command"
        );

        match envelope.command {
            BlockCommand::SetBlocker => {
                self.service
                    .set_blocker(SetBlockerRequest {
                        requester: envelope.requester.clone(),
                        blocker: extract_mention(&envelope.text),
                        channel: envelope.channel.clone(),
                        text: envelope.text.clone(),
                        correlation_id: envelope.correlation_id.clone(),
                    })
                    .await
            }
            BlockCommand::Resolve => self.service.resolve(envelope).await,
            BlockCommand::Ping => self.service.ping(envelope).await,
            BlockCommand::Help => Ok(replies::help(&self.bot_name)),
            BlockCommand::Invalid => Ok(replies::invalid_request(&self.bot_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use blockbot_core::domain::block::UserId;
    use blockbot_core::errors::ApplicationError;

    use super::{
        classify_command, extract_mention, normalize_webhook, strip_trigger_word, BlockCommand,
        BlockCommandService, CommandEnvelope, CommandRouter, SetBlockerRequest,
    };
    use crate::webhook::OutgoingWebhookPayload;

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl BlockCommandService for RecordingService {
        async fn set_blocker(
            &self,
            request: SetBlockerRequest,
        ) -> Result<String, ApplicationError> {
            let blocker = request.blocker.map(|user| user.0).unwrap_or_default();
            let requester = request.requester.map(|user| user.0).unwrap_or_default();
            self.calls.lock().expect("lock").push(format!("set:{blocker}:{requester}"));
            Ok("set".to_owned())
        }

        async fn resolve(&self, _envelope: &CommandEnvelope) -> Result<String, ApplicationError> {
            self.calls.lock().expect("lock").push("resolve".to_owned());
            Ok("resolve".to_owned())
        }

        async fn ping(&self, _envelope: &CommandEnvelope) -> Result<String, ApplicationError> {
            self.calls.lock().expect("lock").push("ping".to_owned());
            Ok("ping".to_owned())
        }
    }

    fn envelope(text: &str, requester: Option<&str>) -> CommandEnvelope {
        normalize_webhook(
            &OutgoingWebhookPayload {
                text: Some(text.to_owned()),
                trigger_word: Some("blockbot".to_owned()),
                user_id: requester.map(str::to_owned),
                channel_name: Some("test".to_owned()),
                ..OutgoingWebhookPayload::default()
            },
            "blockbot",
        )
    }

    #[test]
    fn strips_only_first_trigger_word_occurrence() {
        assert_eq!(strip_trigger_word("blockbot set blocker <@U2>", "blockbot"), "set blocker <@U2>");
        assert_eq!(strip_trigger_word("  blockbot help blockbot ", "blockbot"), "help blockbot");
        assert_eq!(strip_trigger_word(" status ", ""), "status");
    }

    #[test]
    fn classification_is_ordered_and_case_insensitive() {
        assert_eq!(classify_command("set blocker <@U2>"), BlockCommand::SetBlocker);
        assert_eq!(classify_command("SET Blocker @U2"), BlockCommand::SetBlocker);
        assert_eq!(classify_command("resolve now"), BlockCommand::Resolve);
        assert_eq!(classify_command("ping blocker"), BlockCommand::Ping);
        assert_eq!(classify_command("Status"), BlockCommand::Ping);
        assert_eq!(classify_command("HELP"), BlockCommand::Help);
        assert_eq!(classify_command("help me"), BlockCommand::Invalid);
        assert_eq!(classify_command("set blockers"), BlockCommand::SetBlocker);
        assert_eq!(classify_command(""), BlockCommand::Invalid);
        assert_eq!(classify_command("please resolve"), BlockCommand::Invalid);
    }

    #[test]
    fn mention_forms_are_recognized() {
        assert_eq!(extract_mention("set blocker <@U2>"), Some(UserId("U2".to_owned())));
        assert_eq!(extract_mention("set blocker <@U2|steve>"), Some(UserId("U2".to_owned())));
        assert_eq!(extract_mention("set blocker @U3 please"), Some(UserId("U3".to_owned())));
        assert_eq!(extract_mention("set blocker steve"), None);
        assert_eq!(extract_mention("set blocker <@>"), None);
    }

    #[test]
    fn normalize_uses_configured_trigger_word_when_request_has_none() {
        let payload = OutgoingWebhookPayload {
            text: Some("blocky status".to_owned()),
            ..OutgoingWebhookPayload::default()
        };

        let envelope = normalize_webhook(&payload, "blocky");
        assert_eq!(envelope.text, "status");
        assert_eq!(envelope.command, BlockCommand::Ping);
        assert_eq!(envelope.correlation_id, "unassigned");
    }

    #[tokio::test]
    async fn router_dispatches_each_command_once() {
        let router = CommandRouter::new(RecordingService::default(), "blockbot");

        for text in ["blockbot set blocker <@U2>", "blockbot resolve", "blockbot ping", "blockbot status"]
        {
            router.route(&envelope(text, Some("U1"))).await.expect("route");
        }

        let calls = router.service().calls.lock().expect("lock");
        assert_eq!(&*calls, &["set:U2:U1", "resolve", "ping", "ping"]);
    }

    #[tokio::test]
    async fn help_and_invalid_are_answered_without_the_service() {
        let router = CommandRouter::new(RecordingService::default(), "blocky");

        let help = router.route(&envelope("blockbot help", Some("U1"))).await.expect("help");
        assert!(help.contains("`blocky set blocker [@slack_user]`"));

        let invalid = router.route(&envelope("blockbot dance", Some("U1"))).await.expect("invalid");
        assert_eq!(invalid, "Request invalid. Type `blocky help` for acceptable inputs");

        assert!(router.service().calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn set_blocker_without_requester_still_reaches_the_service() {
        let router = CommandRouter::new(RecordingService::default(), "blockbot");

        let reply =
            router.route(&envelope("blockbot set blocker <@U2>", None)).await.expect("route");

        assert_eq!(reply, "set");
        assert_eq!(&*router.service().calls.lock().expect("lock"), &["set:U2:"]);
    }
}
