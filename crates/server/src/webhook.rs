//! `POST /` endpoint for the Slack outgoing webhook.
//!
//! Every request is answered with HTTP 200 and a JSON envelope, including
//! token mismatches and store failures.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    routing::post,
    Form, Json, Router,
};
use blockbot_core::config::{BotConfig, SlackConfig};
use blockbot_core::errors::ApplicationError;
use blockbot_slack::commands::{normalize_webhook, BlockCommandService, CommandRouter};
use blockbot_slack::webhook::{OutgoingWebhookPayload, WebhookReply};
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct WebhookState<S> {
    router: Arc<CommandRouter<S>>,
    slack: SlackConfig,
    bot: BotConfig,
}

impl<S> Clone for WebhookState<S> {
    fn clone(&self) -> Self {
        Self { router: self.router.clone(), slack: self.slack.clone(), bot: self.bot.clone() }
    }
}

impl<S> WebhookState<S>
where
    S: BlockCommandService + 'static,
{
    pub fn new(service: S, slack: SlackConfig, bot: BotConfig) -> Self {
        let router = Arc::new(CommandRouter::new(service, bot.display_name()));
        Self { router, slack, bot }
    }
}

pub fn router<S>(state: WebhookState<S>) -> Router
where
    S: BlockCommandService + 'static,
{
    Router::new().route("/", post(receive::<S>)).with_state(state)
}

pub async fn receive<S>(
    State(state): State<WebhookState<S>>,
    payload: Result<Form<OutgoingWebhookPayload>, FormRejection>,
) -> Json<WebhookReply>
where
    S: BlockCommandService + 'static,
{
    let payload = match payload {
        Ok(Form(payload)) => payload,
        Err(rejection) => {
            warn!(
                event_name = "webhook.request.unreadable",
                error = %rejection,
                "could not decode webhook form body"
            );
            OutgoingWebhookPayload::default()
        }
    };
    let correlation_id =
        payload.correlation_id().unwrap_or_else(|| format!("req-{}", Uuid::new_v4()));

    info!(
        event_name = "webhook.request.received",
        correlation_id = %correlation_id,
        payload = ?payload,
        "webhook request received"
    );

    let text = if state.slack.token_matches(payload.token.as_deref()) {
        let mut envelope = normalize_webhook(&payload, &state.slack.trigger_word);
        envelope.correlation_id = correlation_id.clone();

        match state.router.route(&envelope).await {
            Ok(text) => text,
            Err(failure) => reply_for_failure(&correlation_id, failure),
        }
    } else {
        warn!(
            event_name = "webhook.request.rejected",
            correlation_id = %correlation_id,
            "webhook token mismatch"
        );
        ApplicationError::Unauthorized.user_message().to_owned()
    };

    info!(
        event_name = "webhook.reply.sent",
        correlation_id = %correlation_id,
        reply = %text,
        "webhook reply sent"
    );
    Json(WebhookReply::new(text, &state.bot))
}

fn reply_for_failure(correlation_id: &str, failure: ApplicationError) -> String {
    if failure.is_infrastructure() {
        error!(
            event_name = "webhook.store.error",
            correlation_id = %correlation_id,
            error = %failure,
            "block store failure, replying with empty text"
        );
    } else {
        info!(
            event_name = "webhook.request.invalid",
            correlation_id = %correlation_id,
            error = %failure,
            "request could not be completed"
        );
    }
    failure.user_message().to_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, Form, Json};
    use blockbot_core::clock::FixedClock;
    use blockbot_core::config::{BotConfig, SlackConfig};
    use blockbot_db::{BlockStore, InMemoryKeyValueStore, KeyValueStore};
    use blockbot_slack::webhook::OutgoingWebhookPayload;

    use super::{receive, WebhookState};
    use crate::tracker::BlockTracker;

    fn state() -> (WebhookState<BlockTracker>, Arc<InMemoryKeyValueStore>) {
        let store = Arc::new(InMemoryKeyValueStore::default());
        let tracker =
            BlockTracker::new(BlockStore::new(store.clone()), Arc::new(FixedClock(1_000)));
        let slack = SlackConfig {
            webhook_token: "abc123".to_string().into(),
            trigger_word: "blockbot".to_string(),
        };
        (WebhookState::new(tracker, slack, BotConfig::default()), store)
    }

    fn payload(token: &str, text: &str) -> OutgoingWebhookPayload {
        OutgoingWebhookPayload {
            token: Some(token.to_owned()),
            channel_name: Some("test".to_owned()),
            user_id: Some("U1".to_owned()),
            text: Some(text.to_owned()),
            trigger_word: Some("blockbot".to_owned()),
            ..OutgoingWebhookPayload::default()
        }
    }

    #[tokio::test]
    async fn token_mismatch_never_touches_the_store() {
        let (state, store) = state();

        let Json(reply) =
            receive(State(state), Ok(Form(payload("wrong", "blockbot set blocker <@U2>")))).await;

        assert_eq!(reply.text, "Invalid token");
        assert_eq!(reply.link_names, 1);
        assert!(!store.exists("blocker").await.expect("exists"));
    }

    #[tokio::test]
    async fn valid_token_dispatches_command() {
        let (state, store) = state();

        let Json(reply) =
            receive(State(state), Ok(Form(payload("abc123", "blockbot set blocker <@U2>")))).await;

        assert_eq!(reply.text, "<@U1> is blocked by <@U2> in #test!");
        assert_eq!(store.get("blocker").await.expect("get").as_deref(), Some("U2"));
        assert_eq!(store.get("blocked").await.expect("get").as_deref(), Some("U1"));
        assert_eq!(store.get("time_blocked").await.expect("get").as_deref(), Some("1000"));
    }

    #[tokio::test]
    async fn invalid_blocker_is_reported_to_the_channel() {
        let (state, _store) = state();

        let Json(reply) =
            receive(State(state), Ok(Form(payload("abc123", "blockbot set blocker steve")))).await;

        assert_eq!(reply.text, "Invalid blocker");
    }
}
