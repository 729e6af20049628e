//! The narrow slice of the chat platform the bot actually consumes.
//!
//! Everything outbound goes through [`ChatPlatform`]: posting a message to a
//! channel, adding a role to a member by exact name, and resolving a display
//! name.  The bot never creates or deletes roles.  The shipped binary plugs
//! in [`ConsolePlatform`], which renders to the terminal.

use crate::ids::{ChannelId, CommunityId, MemberId};
use crate::log_event;
use crate::logging::{Glue, PrintColor};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<()>;

    /// Look the role up by exact name and add it to the member.
    async fn add_role(&self, community: CommunityId, member: MemberId, role: &str) -> Result<()>;

    async fn display_name(&self, _community: CommunityId, member: MemberId) -> String {
        format!("member-{}", member)
    }
}

/// Terminal stand-in for a real platform connection: outbound messages and
/// role grants are printed rather than sent anywhere.
pub struct ConsolePlatform;

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<()> {
        for line in text.lines() {
            log_event!("{} brewbot{} {}", channel.color(), Glue.color(), line);
        }
        Ok(())
    }

    async fn add_role(&self, community: CommunityId, member: MemberId, role: &str) -> Result<()> {
        log_event!(
            "{}{}{} granted role \"{}\"",
            community.color(),
            Glue.color(),
            member.color(),
            role,
        );
        Ok(())
    }
}
