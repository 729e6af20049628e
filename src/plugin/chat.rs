use crate::profile::MemoryRole;
use crate::{event::*, plugin::*};
use anyhow::Result;
use rand::seq::SliceRandom;

/// Small talk with the cafe.  Replies come from a fixed rotation; the value
/// here is the per-member conversation memory, which persists with the
/// profile and is capped at ten entries.
pub struct Chat;

const RESPONSES: &[&str] = &[
    "That's interesting! Tell me more while I steam this milk.",
    "I love chatting with you! What else is on your mind?",
    "Thanks for sharing that with me! Another refill?",
    "I'm always here behind the counter if you want to talk.",
    "That's a great question! Let me think about it while the kettle boils.",
    "You always have such interesting things to say!",
];

#[async_trait]
impl Plugin for Chat {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}chat <message> - talk with the cafe ({}clearmemory to forget)",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, args)) = event.bot_cmd(ctx, "chat") {
            if args.is_empty() {
                ctx.say(
                    msg.channel,
                    format!("Usage: {}chat <message>", ctx.cfg.general.command_prefix),
                )
                .await;
                return Ok(EventHandled::Yes);
            }

            let line = args.join(" ");
            let reply = *RESPONSES.choose(ctx.rng).expect("non-empty rotation");

            let profile = ctx.store.get_or_create(msg.community, msg.author);
            profile.remember(MemoryRole::User, line);
            profile.remember(MemoryRole::Assistant, reply.to_string());
            ctx.store.persist().await;

            ctx.say(msg.channel, reply).await;
            return Ok(EventHandled::Yes);
        }

        if let Some((msg, _)) = event.bot_cmd(ctx, "clearmemory") {
            ctx.store
                .get_or_create(msg.community, msg.author)
                .memory
                .clear();
            ctx.store.persist().await;
            ctx.say(msg.channel, "Your conversation memory has been cleared!")
                .await;
            return Ok(EventHandled::Yes);
        }

        Ok(EventHandled::No)
    }
}
