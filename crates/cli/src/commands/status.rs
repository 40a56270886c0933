use blockbot_core::clock::{Clock, SystemClock};

use crate::commands::{CommandResult, StoreSession, EXIT_STORE_READ};

pub fn run() -> CommandResult {
    let session = match StoreSession::open("status") {
        Ok(session) => session,
        Err(failure) => return failure,
    };

    let result = session.runtime.block_on(async {
        let (pool, blocks) = session.connect_blocks("status").await?;
        let current = blocks.current_block().await;
        pool.close().await;

        current.map_err(|error| {
            CommandResult::failure("status", "store_read", error.to_string(), EXIT_STORE_READ)
        })
    });

    match result {
        Ok(Some(record)) => {
            let elapsed = record.elapsed(SystemClock.now_epoch_seconds());
            CommandResult::success(
                "status",
                format!(
                    "{} has been blocking {} for {elapsed} (since epoch {})",
                    record.blocker, record.blocked, record.blocked_at_epoch_seconds
                ),
            )
        }
        Ok(None) => CommandResult::success("status", "no active block"),
        Err(failure) => failure,
    }
}
