use std::sync::Arc;

use async_trait::async_trait;
use blockbot_core::clock::Clock;
use blockbot_core::domain::block::{BlockRecord, BlockRole};
use blockbot_core::errors::{ApplicationError, DomainError};
use blockbot_db::BlockStore;
use blockbot_slack::commands::{BlockCommandService, CommandEnvelope, SetBlockerRequest};
use blockbot_slack::replies;
use tokio::sync::Mutex;
use tracing::info;

/// Set-blocker, resolve and ping over the single global block record.
pub struct BlockTracker {
    blocks: BlockStore,
    clock: Arc<dyn Clock>,
    // Serializes check-then-write in this process only; other processes
    // sharing the store can still interleave.
    write_lock: Mutex<()>,
}

impl BlockTracker {
    pub fn new(blocks: BlockStore, clock: Arc<dyn Clock>) -> Self {
        Self { blocks, clock, write_lock: Mutex::new(()) }
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }
}

#[async_trait]
impl BlockCommandService for BlockTracker {
    async fn set_blocker(&self, request: SetBlockerRequest) -> Result<String, ApplicationError> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now_epoch_seconds();

        if let Some(existing) = self.blocks.current_block().await? {
            info!(
                event_name = "block.create.conflict",
                correlation_id = %request.correlation_id,
                blocker = %existing.blocker,
                blocked = %existing.blocked,
                "block already active, refusing to create another"
            );
            return Ok(replies::block_already_exists(&existing.blocker, existing.elapsed(now)));
        }

        let requester = request.requester.ok_or(DomainError::MissingRequester)?;
        let blocker = request
            .blocker
            .ok_or(DomainError::MissingMention { text: request.text.clone() })?;
        let record = BlockRecord::new(blocker, requester, now);
        self.blocks.create_block(&record).await?;

        info!(
            event_name = "block.created",
            correlation_id = %request.correlation_id,
            blocker = %record.blocker,
            blocked = %record.blocked,
            channel = %request.channel,
            "block recorded"
        );
        Ok(replies::block_created(&record.blocked, &record.blocker, &request.channel))
    }

    async fn resolve(&self, envelope: &CommandEnvelope) -> Result<String, ApplicationError> {
        let _guard = self.write_lock.lock().await;

        let Some(record) = self.blocks.current_block().await? else {
            return Ok(replies::NO_BLOCKS_TO_RESOLVE.to_owned());
        };

        let elapsed = record.elapsed(self.clock.now_epoch_seconds());
        self.blocks.add_time(&record.blocked, BlockRole::Blocked, elapsed.as_secs()).await?;
        self.blocks.add_time(&record.blocker, BlockRole::Blocking, elapsed.as_secs()).await?;
        self.blocks.clear_block().await?;

        info!(
            event_name = "block.resolved",
            correlation_id = %envelope.correlation_id,
            blocker = %record.blocker,
            blocked = %record.blocked,
            elapsed_secs = elapsed.as_secs(),
            "block resolved"
        );
        Ok(replies::block_resolved(&record, elapsed))
    }

    async fn ping(&self, envelope: &CommandEnvelope) -> Result<String, ApplicationError> {
        let Some(record) = self.blocks.current_block().await? else {
            return Ok(replies::NO_ACTIVE_BLOCK.to_owned());
        };

        let elapsed = record.elapsed(self.clock.now_epoch_seconds());
        info!(
            event_name = "block.ping",
            correlation_id = %envelope.correlation_id,
            blocker = %record.blocker,
            elapsed_secs = elapsed.as_secs(),
            "pinging blocker"
        );
        Ok(replies::block_status(&record, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use blockbot_core::clock::Clock;
    use blockbot_core::domain::block::{BlockRecord, UserId, UserTotals};
    use blockbot_core::errors::{ApplicationError, DomainError};
    use blockbot_db::{BlockStore, InMemoryKeyValueStore};
    use blockbot_slack::commands::{
        BlockCommand, BlockCommandService, CommandEnvelope, SetBlockerRequest,
    };

    use super::BlockTracker;

    struct SteppingClock(AtomicI64);

    impl SteppingClock {
        fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for SteppingClock {
        fn now_epoch_seconds(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn user(id: &str) -> UserId {
        UserId(id.to_owned())
    }

    fn tracker() -> (BlockTracker, Arc<SteppingClock>) {
        let clock = Arc::new(SteppingClock(AtomicI64::new(1_700_000_000)));
        let store = Arc::new(InMemoryKeyValueStore::default());
        (BlockTracker::new(BlockStore::new(store), clock.clone()), clock)
    }

    fn set_request(requester: &str, blocker: Option<&str>) -> SetBlockerRequest {
        SetBlockerRequest {
            requester: Some(user(requester)),
            blocker: blocker.map(user),
            channel: "test".to_owned(),
            text: "set blocker".to_owned(),
            correlation_id: "req-1".to_owned(),
        }
    }

    fn envelope(command: BlockCommand) -> CommandEnvelope {
        CommandEnvelope {
            command,
            text: String::new(),
            requester: Some(user("U1")),
            channel: "test".to_owned(),
            correlation_id: "req-1".to_owned(),
        }
    }

    #[tokio::test]
    async fn set_blocker_records_requester_as_blocked() {
        let (tracker, _clock) = tracker();

        let reply = tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("set");

        assert_eq!(reply, "<@U1> is blocked by <@U2> in #test!");
        assert_eq!(
            tracker.blocks().current_block().await.expect("read"),
            Some(BlockRecord::new(user("U2"), user("U1"), 1_700_000_000))
        );
    }

    #[tokio::test]
    async fn second_set_blocker_never_overwrites() {
        let (tracker, clock) = tracker();
        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("first");
        clock.advance(3_725);

        let reply = tracker.set_blocker(set_request("U3", Some("U4"))).await.expect("second");

        assert_eq!(
            reply,
            "Can not create new issue. Current issue has been blocked by <@U2> for 01:02:05"
        );
        let record = tracker.blocks().current_block().await.expect("read").expect("record");
        assert_eq!(record.blocker, user("U2"));
        assert_eq!(record.blocked, user("U1"));
    }

    #[tokio::test]
    async fn conflict_is_reported_even_without_a_mention() {
        let (tracker, _clock) = tracker();
        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("first");

        let reply = tracker.set_blocker(set_request("U3", None)).await.expect("conflict");
        assert!(reply.starts_with("Can not create new issue."));
    }

    #[tokio::test]
    async fn missing_mention_is_an_invalid_blocker() {
        let (tracker, _clock) = tracker();

        let error = tracker.set_blocker(set_request("U1", None)).await.expect_err("no mention");

        assert!(matches!(error, ApplicationError::Domain(DomainError::MissingMention { .. })));
        assert_eq!(error.user_message(), "Invalid blocker");
        assert_eq!(tracker.blocks().current_block().await.expect("read"), None);
    }

    #[tokio::test]
    async fn missing_requester_is_rejected_only_when_no_block_is_active() {
        let (tracker, _clock) = tracker();
        let anonymous = || SetBlockerRequest { requester: None, ..set_request("U1", Some("U2")) };

        let error = tracker.set_blocker(anonymous()).await.expect_err("no requester");
        assert_eq!(error, ApplicationError::Domain(DomainError::MissingRequester));
        assert_eq!(tracker.blocks().current_block().await.expect("read"), None);

        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("set");
        let reply = tracker.set_blocker(anonymous()).await.expect("conflict");
        assert!(reply.starts_with("Can not create new issue."), "{reply}");
    }

    #[tokio::test]
    async fn ping_reports_elapsed_time() {
        let (tracker, clock) = tracker();
        assert_eq!(
            tracker.ping(&envelope(BlockCommand::Ping)).await.expect("ping"),
            "No existing blocks. Yay!"
        );

        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("set");
        clock.advance(3_725);

        assert_eq!(
            tracker.ping(&envelope(BlockCommand::Ping)).await.expect("ping"),
            "<@U2> has been blocking <@U1> for 01:02:05"
        );
    }

    #[tokio::test]
    async fn resolve_folds_duration_into_both_totals_and_clears() {
        let (tracker, clock) = tracker();
        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("set");
        clock.advance(90);

        let reply = tracker.resolve(&envelope(BlockCommand::Resolve)).await.expect("resolve");

        assert_eq!(reply, "<@U2> resolved <@U1>'s issue after 00:01:30");
        assert_eq!(tracker.blocks().current_block().await.expect("read"), None);
        assert_eq!(
            tracker.blocks().totals_for(&user("U1")).await.expect("totals"),
            UserTotals { total_time_blocked: 90, total_time_blocking: 0 }
        );
        assert_eq!(
            tracker.blocks().totals_for(&user("U2")).await.expect("totals"),
            UserTotals { total_time_blocked: 0, total_time_blocking: 90 }
        );

        tracker.set_blocker(set_request("U1", Some("U2"))).await.expect("set again");
        clock.advance(10);
        tracker.resolve(&envelope(BlockCommand::Resolve)).await.expect("resolve again");
        assert_eq!(
            tracker.blocks().totals_for(&user("U1")).await.expect("totals").total_time_blocked,
            100
        );
    }

    #[tokio::test]
    async fn resolve_without_block_is_idempotent() {
        let (tracker, _clock) = tracker();

        for _ in 0..2 {
            let reply = tracker.resolve(&envelope(BlockCommand::Resolve)).await.expect("resolve");
            assert_eq!(reply, "No blocks found.");
        }
        assert_eq!(
            tracker.blocks().totals_for(&user("U1")).await.expect("totals"),
            UserTotals::default()
        );
    }
}
