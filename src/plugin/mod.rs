use crate::context::Context;
use crate::event::{Event, EventHandled, MessageEvent};
use crate::ids::{CommunityId, MemberId};
use crate::rewards;
use crate::session::Game;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

mod birthday;
mod chat;
mod cider;
mod daily;
mod debug;
mod game_help;
mod heist;
mod help;
mod jumble;
mod level;
mod menu;
mod points;
pub(crate) mod snack;
mod trivia;
mod welcome;

#[async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used for debug
    fn name(&self) -> &'static str;
    /// Help message line.  None if no help message
    fn usage(&self, ctx: &Context<'_>) -> Option<String>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other
    ///   plugin should attempt to handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle
    ///   the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    use crate::plugin::*;

    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(help::Help),
        Box::new(welcome::Welcome),
        // Profile counters
        Box::new(level::Level),
        Box::new(daily::Daily),
        Box::new(points::Points),
        Box::new(birthday::Birthday),
        Box::new(chat::Chat),
        // Cafe front of house
        Box::new(menu::Menu),
        // Minigames.  These also watch plain channel messages for guesses,
        // so they sit after the command plugins.
        Box::new(snack::Snack),
        Box::new(trivia::Trivia),
        Box::new(jumble::Jumble),
        Box::new(heist::Heist),
        Box::new(cider::Cider),
        // Catches `game` invocations none of the games claimed.
        // Keep last.
        Box::new(game_help::GameHelp),
    ]
}

/// Check for `!game <sub>` aimed at one particular game.
pub(crate) fn game_subcommand<'a>(
    ctx: &Context<'_>,
    event: &'a Event,
    sub: &str,
) -> Option<(&'a MessageEvent, Vec<&'a str>)> {
    let (msg, args) = event.bot_cmd(ctx, "game")?;
    if args.first() != Some(&sub) {
        return None;
    }
    Some((msg, args[1..].to_vec()))
}

/// Credit a win: points, win count, and any roles the new counts crossed.
/// The role grants run detached so the winner's reply never waits on the
/// platform.
pub(crate) fn award_and_record(
    ctx: &mut Context<'_>,
    community: CommunityId,
    member: MemberId,
    game: Game,
) -> u64 {
    let profile = ctx.store.get_or_create(community, member);
    let amount = rewards::award_points(profile, game);
    let roles = rewards::record_win(profile, game);
    if !roles.is_empty() {
        let _ = rewards::spawn_role_grants(Arc::clone(ctx.platform), community, member, roles);
    }
    amount
}

/// [`award_and_record`] plus a store flush, for the common single-winner
/// case.  Flushing here shrinks the loss window between periodic ticks.
pub(crate) async fn reward_winner(
    ctx: &mut Context<'_>,
    community: CommunityId,
    member: MemberId,
    game: Game,
) -> u64 {
    let amount = award_and_record(ctx, community, member, game);
    ctx.store.persist().await;
    amount
}
