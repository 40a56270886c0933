use crate::commands::{CommandResult, StoreSession};

pub fn run() -> CommandResult {
    let session = match StoreSession::open("migrate") {
        Ok(session) => session,
        Err(failure) => return failure,
    };

    let result = session.runtime.block_on(async {
        let (pool, _blocks) = session.connect_blocks("migrate").await?;
        pool.close().await;
        Ok::<(), CommandResult>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => failure,
    }
}
