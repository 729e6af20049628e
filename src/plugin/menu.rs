use crate::menu;
use crate::{event::*, plugin::*};
use anyhow::Result;

/// The public menu and the per-item serve commands (`!latte [@user]`).
pub struct Menu;

#[async_trait]
impl Plugin for Menu {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}menu - show the menu; {}<item> [@user] - serve something",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = event
            .bot_cmd(ctx, "menu")
            .or_else(|| event.bot_cmd(ctx, "order"))
        {
            let mut reply = String::from("Welcome to the cafe! On the menu today:\n");
            for item in menu::MENU {
                reply.push_str(&format!("{} {} ({})\n", item.emoji, item.label, item.key));
            }
            ctx.say(msg.channel, &reply).await;
            return Ok(EventHandled::Yes);
        }

        // Serve commands take the item key as the command itself
        for item in menu::MENU {
            let Some((msg, _)) = event.bot_cmd(ctx, item.key) else {
                continue;
            };
            let target = msg.mentions.first().copied().unwrap_or(msg.author);
            let name = ctx.display_name(msg.community, target).await;
            let line = item.serve.replace("{user}", &name);
            ctx.say(msg.channel, format!("{} {}", item.emoji, line)).await;
            return Ok(EventHandled::Yes);
        }

        Ok(EventHandled::No)
    }
}
