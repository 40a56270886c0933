//! Reply text for every outcome of a webhook command.

use blockbot_core::domain::block::{BlockRecord, UserId};
use blockbot_core::domain::elapsed::ElapsedTime;

pub const NO_BLOCKS_TO_RESOLVE: &str = "No blocks found.";
pub const NO_ACTIVE_BLOCK: &str = "No existing blocks. Yay!";

pub fn block_created(blocked: &UserId, blocker: &UserId, channel: &str) -> String {
    format!("{} is blocked by {} in #{channel}!", blocked.mention(), blocker.mention())
}

pub fn block_already_exists(existing_blocker: &UserId, elapsed: ElapsedTime) -> String {
    format!(
        "Can not create new issue. Current issue has been blocked by {} for {elapsed}",
        existing_blocker.mention()
    )
}

pub fn block_resolved(record: &BlockRecord, elapsed: ElapsedTime) -> String {
    format!(
        "{} resolved {}'s issue after {elapsed}",
        record.blocker.mention(),
        record.blocked.mention()
    )
}

pub fn block_status(record: &BlockRecord, elapsed: ElapsedTime) -> String {
    format!(
        "{} has been blocking {} for {elapsed}",
        record.blocker.mention(),
        record.blocked.mention()
    )
}

pub fn help(bot_name: &str) -> String {
    [
        format!("Type `{bot_name} set blocker [@slack_user]` to set a block."),
        format!("Type `{bot_name} resolve` to resolve an existing block."),
        format!("Type `{bot_name} ping blocker` to ping the blocker and display time blocked."),
        format!("Type `{bot_name} status` to check current block status."),
    ]
    .join("\n")
}

pub fn invalid_request(bot_name: &str) -> String {
    format!("Request invalid. Type `{bot_name} help` for acceptable inputs")
}

#[cfg(test)]
mod tests {
    use blockbot_core::domain::block::{BlockRecord, UserId};
    use blockbot_core::domain::elapsed::ElapsedTime;

    use super::{block_already_exists, block_created, block_resolved, block_status, help};

    fn record() -> BlockRecord {
        BlockRecord::new(UserId("U2".to_owned()), UserId("U1".to_owned()), 0)
    }

    #[test]
    fn created_reply_names_both_parties_and_channel() {
        let text = block_created(&UserId("U1".to_owned()), &UserId("U2".to_owned()), "general");
        assert_eq!(text, "<@U1> is blocked by <@U2> in #general!");
    }

    #[test]
    fn elapsed_replies_embed_formatted_duration() {
        let elapsed = ElapsedTime::from_secs(3_725);

        assert_eq!(
            block_status(&record(), elapsed),
            "<@U2> has been blocking <@U1> for 01:02:05"
        );
        assert_eq!(block_resolved(&record(), elapsed), "<@U2> resolved <@U1>'s issue after 01:02:05");
        assert!(block_already_exists(&UserId("U2".to_owned()), elapsed)
            .ends_with("blocked by <@U2> for 01:02:05"));
    }

    #[test]
    fn help_lists_every_command_with_bot_name() {
        let text = help("blocky");

        assert_eq!(text.lines().count(), 4);
        for command in ["set blocker", "resolve", "ping blocker", "status"] {
            assert!(text.contains(&format!("`blocky {command}")), "missing {command}");
        }
    }
}
