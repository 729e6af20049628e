use crate::{event::*, plugin::*};
use anyhow::Result;

pub struct Help;

#[async_trait]
impl Plugin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!("{}{} - show this help message", prefix, self.name()))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, _)) = event.bot_cmd(ctx, self.name()) else {
            return Ok(EventHandled::No);
        };

        let mut reply = String::new();
        reply.push_str("Commands:\n");
        for plugin in crate::plugin::plugins() {
            if let Some(usage) = plugin.usage(ctx) {
                reply.push_str(&usage);
                reply.push('\n');
            }
        }

        ctx.say(msg.channel, &reply).await;
        Ok(EventHandled::Yes)
    }
}
