use crate::ids::{CommunityId, MemberId};
use crate::menu;
use crate::profile::{day_index, unix_ms_now, ClaimOutcome};
use crate::rewards;
use crate::{event::*, plugin::*};
use anyhow::Result;
use std::sync::Arc;

/// Daily claims and the streaks they build, plus the admin `streak`
/// subcommands.
pub struct Daily;

#[async_trait]
impl Plugin for Daily {
    fn name(&self) -> &'static str {
        "daily"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}daily item:<key> - claim your daily and build a streak\n\
             {}streak show [@user] - view a streak",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, args)) = event.bot_cmd(ctx, "daily") {
            return claim(ctx, msg, &args).await;
        }
        if let Some((msg, args)) = event.bot_cmd(ctx, "streak") {
            return streak_command(ctx, msg, &args).await;
        }
        Ok(EventHandled::No)
    }
}

async fn claim(ctx: &mut Context<'_>, msg: &MessageEvent, args: &[&str]) -> Result<EventHandled> {
    let chosen = args
        .iter()
        .find_map(|a| a.strip_prefix("item:"))
        .map(str::to_string);

    if let Some(key) = &chosen {
        if menu::find(key).is_none() {
            ctx.say(
                msg.channel,
                format!(
                    "I don't serve `{}`. See `{}menu` for the options.",
                    key, ctx.cfg.general.command_prefix
                ),
            )
            .await;
            return Ok(EventHandled::Yes);
        }
    }

    let now_ms = unix_ms_now();
    let today = day_index(now_ms, ctx.cfg.daily.utc_offset_minutes);
    let profile = ctx.store.get_or_create(msg.community, msg.author);

    if profile.last_claim_day == Some(today) {
        let label = item_label(profile.streak_item.as_deref());
        let streak = profile.streak_count;
        ctx.say(
            msg.channel,
            format!(
                "You already claimed your daily {} today. Streak: {} day(s).",
                label, streak
            ),
        )
        .await;
        return Ok(EventHandled::Yes);
    }

    if chosen.is_some() {
        profile.streak_item = chosen;
    }
    if profile.streak_item.is_none() {
        ctx.say(
            msg.channel,
            format!(
                "Pick your streak item with `{}daily item:<key>` (this sets what you come back for each day).",
                ctx.cfg.general.command_prefix
            ),
        )
        .await;
        return Ok(EventHandled::Yes);
    }

    let prev = profile.streak_count;
    let outcome = profile.claim_daily(today, now_ms);
    let streak = profile.streak_count;
    // Admin overrides can leave an item key the menu no longer carries
    let (emoji, label) = match profile.streak_item.as_deref().and_then(menu::find) {
        Some(item) => (item.emoji, item.label),
        None => ("☕", "daily"),
    };

    if streak > prev {
        let roles: Vec<_> = rewards::crossed(rewards::STREAK_ROLES, prev, streak)
            .into_iter()
            .map(|t| t.role)
            .collect();
        if !roles.is_empty() {
            let _ = rewards::spawn_role_grants(Arc::clone(ctx.platform), msg.community, msg.author, roles);
        }
    }
    ctx.store.persist().await;

    debug_assert!(matches!(
        outcome,
        ClaimOutcome::Started | ClaimOutcome::Continued { .. }
    ));
    ctx.say(
        msg.channel,
        format!("{} Daily {} recorded! Streak: {} day(s).", emoji, label, streak),
    )
    .await;

    if streak % 7 == 0 {
        let name = ctx.display_name(msg.community, msg.author).await;
        ctx.announce(format!(
            "{} kept their {} streak for {} days!",
            name, label, streak
        ))
        .await;
    }

    Ok(EventHandled::Yes)
}

async fn streak_command(
    ctx: &mut Context<'_>,
    msg: &MessageEvent,
    args: &[&str],
) -> Result<EventHandled> {
    let sub = args.first().copied().unwrap_or("show");

    if sub == "show" {
        let target = msg.mentions.first().copied().unwrap_or(msg.author);
        let name = ctx.display_name(msg.community, target).await;
        let (label, streak, last) = match ctx.store.get(msg.community, target) {
            Some(p) => (
                item_label(p.streak_item.as_deref()),
                p.streak_count,
                last_claim_display(p.last_claim_ms),
            ),
            None => ("None".to_string(), 0, "Never".to_string()),
        };
        ctx.say(
            msg.channel,
            format!(
                "{}: item {}, streak {} day(s), last claimed {}",
                name, label, streak, last
            ),
        )
        .await;
        return Ok(EventHandled::Yes);
    }

    if !ctx.cfg.is_admin(msg.author) {
        ctx.say(msg.channel, "Administrator only.").await;
        return Ok(EventHandled::Yes);
    }

    match sub {
        "set" => {
            let (Some(target), Some(count)) = (
                msg.mentions.first().copied(),
                args.iter().find_map(|a| a.parse::<u64>().ok()),
            ) else {
                ctx.say(
                    msg.channel,
                    format!(
                        "Usage: {}streak set @user <count> [item:<key>]",
                        ctx.cfg.general.command_prefix
                    ),
                )
                .await;
                return Ok(EventHandled::Yes);
            };
            let item = args.iter().find_map(|a| a.strip_prefix("item:"));
            set_streak(ctx, msg.community, target, count, item).await;
            let name = ctx.display_name(msg.community, target).await;
            ctx.say(msg.channel, format!("Set {}'s streak to {}.", name, count))
                .await;
        }
        "add" => {
            let (Some(target), Some(delta)) = (
                msg.mentions.first().copied(),
                args.iter().find_map(|a| a.parse::<i64>().ok()),
            ) else {
                ctx.say(
                    msg.channel,
                    format!("Usage: {}streak add @user <delta>", ctx.cfg.general.command_prefix),
                )
                .await;
                return Ok(EventHandled::Yes);
            };
            let prev = ctx.store.get_or_create(msg.community, target).streak_count;
            let next = prev.saturating_add_signed(delta);
            set_streak(ctx, msg.community, target, next, None).await;
            let name = ctx.display_name(msg.community, target).await;
            ctx.say(
                msg.channel,
                format!("Adjusted {}'s streak by {}. New streak: {}.", name, delta, next),
            )
            .await;
        }
        "reset" => {
            let Some(target) = msg.mentions.first().copied() else {
                ctx.say(
                    msg.channel,
                    format!("Usage: {}streak reset @user", ctx.cfg.general.command_prefix),
                )
                .await;
                return Ok(EventHandled::Yes);
            };
            let profile = ctx.store.get_or_create(msg.community, target);
            // Zero the counters but keep the chosen item
            profile.streak_count = 0;
            profile.last_claim_day = None;
            profile.last_claim_ms = 0;
            ctx.store.persist().await;
            let name = ctx.display_name(msg.community, target).await;
            ctx.say(msg.channel, format!("Reset {}'s streak.", name)).await;
        }
        _ => {
            ctx.say(
                msg.channel,
                format!("Unknown subcommand. Try `{}streak show`.", ctx.cfg.general.command_prefix),
            )
            .await;
        }
    }

    Ok(EventHandled::Yes)
}

/// Admin override of a streak count; rewards apply when the count moved up,
/// same as an organic claim.
async fn set_streak(
    ctx: &mut Context<'_>,
    community: CommunityId,
    member: MemberId,
    count: u64,
    item: Option<&str>,
) {
    let profile = ctx.store.get_or_create(community, member);
    let prev = profile.streak_count;
    profile.streak_count = count;
    if let Some(item) = item {
        profile.streak_item = Some(item.to_string());
    }

    if count > prev {
        let roles: Vec<_> = rewards::crossed(rewards::STREAK_ROLES, prev, count)
            .into_iter()
            .map(|t| t.role)
            .collect();
        if !roles.is_empty() {
            let _ = rewards::spawn_role_grants(Arc::clone(ctx.platform), community, member, roles);
        }
    }
    ctx.store.persist().await;
}

fn item_label(key: Option<&str>) -> String {
    key.and_then(menu::find)
        .map(|it| it.label.to_string())
        .unwrap_or_else(|| "your item".to_string())
}

fn last_claim_display(ms: i64) -> String {
    if ms == 0 {
        return "Never".to_string();
    }
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Never".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_claim_formats_or_says_never() {
        assert_eq!(last_claim_display(0), "Never");
        assert_eq!(last_claim_display(86_400_000), "1970-01-02 00:00 UTC");
    }

    #[test]
    fn item_label_falls_back() {
        assert_eq!(item_label(Some("latte")), "Latte");
        assert_eq!(item_label(Some("nope")), "your item");
        assert_eq!(item_label(None), "your item");
    }
}
