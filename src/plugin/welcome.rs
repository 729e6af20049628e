use crate::ids::ChannelId;
use crate::{event::*, plugin::*};
use anyhow::Result;

/// Greets new members in the configured welcome channel.
pub struct Welcome;

#[async_trait]
impl Plugin for Welcome {
    fn name(&self) -> &'static str {
        "welcome"
    }

    fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::MemberJoin { name, .. } = event else {
            return Ok(EventHandled::No);
        };
        let Some(channel) = ctx.cfg.channels.welcome else {
            return Ok(EventHandled::No);
        };

        ctx.say(
            ChannelId(channel),
            format!(
                "Welcome to the cafe, {}! Grab a seat, the menu is `{}menu`.",
                name, ctx.cfg.general.command_prefix
            ),
        )
        .await;

        Ok(EventHandled::Yes)
    }
}
