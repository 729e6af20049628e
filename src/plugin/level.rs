use crate::ids::{CommunityId, MemberId};
use crate::rewards;
use crate::{event::*, log_internal, plugin::*};
use anyhow::Result;
use std::sync::Arc;

/// Levels are managed by hand (or by the external leveling bot); there is no
/// XP accumulation in this bot.  This plugin owns the `level` command and
/// watches the announcements channel for the leveling bot's posts.
pub struct Level;

#[async_trait]
impl Plugin for Level {
    fn name(&self) -> &'static str {
        "level"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}level show [@user] - show a level (admin: set/add)",
            prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some(handled) = infer_from_announcement(ctx, event).await? {
            return Ok(handled);
        }

        let Some((msg, args)) = event.bot_cmd(ctx, "level") else {
            return Ok(EventHandled::No);
        };

        match args.first().copied().unwrap_or("show") {
            "show" => {
                let target = msg.mentions.first().copied().unwrap_or(msg.author);
                let name = ctx.display_name(msg.community, target).await;
                let level = ctx
                    .store
                    .get(msg.community, target)
                    .map(|p| p.level)
                    .unwrap_or(0);
                ctx.say(msg.channel, format!("{} is level {}.", name, level))
                    .await;
            }
            "set" => {
                if !ctx.cfg.is_admin(msg.author) {
                    ctx.say(msg.channel, "Administrator only.").await;
                    return Ok(EventHandled::Yes);
                }
                let (Some(target), Some(level)) = (msg.mentions.first().copied(), numeric_arg(&args))
                else {
                    ctx.say(
                        msg.channel,
                        format!("Usage: {}level set @user <level>", ctx.cfg.general.command_prefix),
                    )
                    .await;
                    return Ok(EventHandled::Yes);
                };
                let name = apply_level(ctx, msg.community, target, level).await;
                ctx.say(msg.channel, format!("Set {}'s level to {}.", name, level))
                    .await;
            }
            "add" => {
                if !ctx.cfg.is_admin(msg.author) {
                    ctx.say(msg.channel, "Administrator only.").await;
                    return Ok(EventHandled::Yes);
                }
                let (Some(target), Some(delta)) = (msg.mentions.first().copied(), signed_arg(&args))
                else {
                    ctx.say(
                        msg.channel,
                        format!("Usage: {}level add @user <delta>", ctx.cfg.general.command_prefix),
                    )
                    .await;
                    return Ok(EventHandled::Yes);
                };
                let prev = ctx.store.get_or_create(msg.community, target).level;
                let next = prev.saturating_add_signed(delta);
                let name = apply_level(ctx, msg.community, target, next).await;
                ctx.say(
                    msg.channel,
                    format!(
                        "Adjusted {}'s level by {}. New level: {}.",
                        name,
                        next as i64 - prev as i64,
                        next
                    ),
                )
                .await;
            }
            _ => {
                ctx.say(
                    msg.channel,
                    format!(
                        "Unknown subcommand. Try `{}level show`.",
                        ctx.cfg.general.command_prefix
                    ),
                )
                .await;
            }
        }

        Ok(EventHandled::Yes)
    }
}

/// Move a member's level, granting every level role crossed on the way up
/// and announcing the level-up.  Returns the member's display name for the
/// reply.
async fn apply_level(
    ctx: &mut Context<'_>,
    community: CommunityId,
    member: MemberId,
    next: u64,
) -> String {
    let profile = ctx.store.get_or_create(community, member);
    let prev = profile.level;
    profile.level = next;

    let roles: Vec<_> = rewards::crossed(rewards::LEVEL_ROLES, prev, next)
        .into_iter()
        .map(|t| t.role)
        .collect();
    if !roles.is_empty() {
        let _ = rewards::spawn_role_grants(Arc::clone(ctx.platform), community, member, roles);
    }
    ctx.store.persist().await;

    let name = ctx.display_name(community, member).await;
    if next > prev {
        ctx.announce(format!("{} has reached level {}!", name, next))
            .await;
    }
    name
}

/// The external leveling bot posts lines like "Nutmeg just advanced to
/// level 4!" with a mention in the announcements channel.  Adopt the level
/// it reports.
async fn infer_from_announcement(
    ctx: &mut Context<'_>,
    event: &Event,
) -> Result<Option<EventHandled>> {
    let Event::Message(msg) = event else {
        return Ok(None);
    };
    if !msg.author_is_bot || Some(msg.channel.0) != ctx.cfg.channels.level_announcements {
        return Ok(None);
    }
    let (Some(level), Some(target)) = (parse_level(&msg.content), msg.mentions.first().copied())
    else {
        return Ok(None);
    };

    apply_level(ctx, msg.community, target, level).await;
    log_internal!("Leveling bot reported {} at level {}", target, level);
    Ok(Some(EventHandled::Yes))
}

/// Find "level N" (case-insensitive, with or without a space) in a message.
fn parse_level(content: &str) -> Option<u64> {
    let mut tokens = content.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        let lower = token.to_lowercase();
        let Some(rest) = lower.strip_prefix("level") else {
            continue;
        };

        // "level12" or "level12!"
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }

        // "level 12!"
        if let Some(next) = tokens.peek() {
            let digits: String = next.chars().take_while(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                return digits.parse().ok();
            }
        }
    }
    None
}

fn numeric_arg(args: &[&str]) -> Option<u64> {
    args.iter().find_map(|a| a.parse().ok())
}

fn signed_arg(args: &[&str]) -> Option<i64> {
    args.iter().find_map(|a| a.parse().ok())
}
