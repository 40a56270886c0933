use blockbot_core::domain::block::UserId;
use blockbot_core::domain::elapsed::ElapsedTime;

use crate::commands::{CommandResult, StoreSession, EXIT_STORE_READ};

pub fn run(user_id: &str) -> CommandResult {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return CommandResult::failure("totals", "invalid_argument", "user id must not be empty", 1);
    }

    let session = match StoreSession::open("totals") {
        Ok(session) => session,
        Err(failure) => return failure,
    };

    let user = UserId(user_id.to_owned());
    let result = session.runtime.block_on(async {
        let (pool, blocks) = session.connect_blocks("totals").await?;
        let totals = blocks.totals_for(&user).await;
        pool.close().await;

        totals.map_err(|error| {
            CommandResult::failure("totals", "store_read", error.to_string(), EXIT_STORE_READ)
        })
    });

    match result {
        Ok(totals) => CommandResult::success(
            "totals",
            format!(
                "{user}: blocked {} / blocking {}",
                ElapsedTime::from_secs(totals.total_time_blocked),
                ElapsedTime::from_secs(totals.total_time_blocking)
            ),
        ),
        Err(failure) => failure,
    }
}
