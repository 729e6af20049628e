use crate::session::Game;
use crate::{event::*, plugin::*};
use anyhow::Result;

/// Answers `game help` and any `game` invocation no minigame claimed.
/// Keep last in the plugin order so the games get first pick.
pub struct GameHelp;

#[async_trait]
impl Plugin for GameHelp {
    fn name(&self) -> &'static str {
        "game-help"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!("{}game help - minigame list", prefix))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, args)) = event.bot_cmd(ctx, "game") else {
            return Ok(EventHandled::No);
        };

        let prefix = &ctx.cfg.general.command_prefix;
        let mut reply = String::from("Minigames:\n");
        for game in Game::ALL {
            reply.push_str(&format!(
                "{}game {} - {} (+{} points)\n",
                prefix,
                game.key(),
                game.label(),
                game.points()
            ));
        }

        if !matches!(args.first(), Some(&"help") | None) {
            reply.insert_str(0, "Unknown minigame.\n");
        }
        ctx.say(msg.channel, &reply).await;
        Ok(EventHandled::Yes)
    }
}
