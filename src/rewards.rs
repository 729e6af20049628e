//! Threshold reward engine.
//!
//! Counter thresholds map to platform role names.  Two deliberately
//! independent readings of the same tables exist: [`crossed`] returns the
//! thresholds passed by one counter update (each granted at most once across
//! a sequence of updates), while [`highest_satisfied`] answers "what is the
//! best threshold this value has ever reached" for display.  Keeping the two
//! paths separate mirrors how the reward semantics are defined; their
//! consistency is pinned by tests rather than by sharing code.

use crate::ids::{CommunityId, MemberId};
use crate::log_internal;
use crate::platform::ChatPlatform;
use crate::profile::Profile;
use crate::session::Game;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, PartialEq, Eq)]
pub struct RoleThreshold {
    pub at: u64,
    pub role: &'static str,
}

const fn at(at: u64, role: &'static str) -> RoleThreshold {
    RoleThreshold { at, role }
}

/// Level milestones, granted when an admin or the external leveling bot
/// moves a member's level across them.
pub const LEVEL_ROLES: &[RoleThreshold] = &[
    at(1, "Member"),
    at(3, "New Patron"),
    at(5, "Sugarcube Sipper"),
    at(10, "Cocoa Companion"),
    at(15, "Latte Luminary"),
    at(20, "Pancake Paladin"),
    at(25, "Caramel Conjurer"),
    at(30, "Mocha Maestro"),
    at(35, "Crystal Creamer"),
    at(40, "Harmony Brewer"),
    at(45, "Starlight Barista"),
    at(50, "Aurora Artisan"),
    at(60, "Prism Patissier"),
    at(70, "Moonbeam Maitre d'"),
    at(80, "Sunlit Sommelier"),
    at(90, "Enchanted Espresso"),
    at(100, "Celestial Connoisseur"),
];

/// Daily-streak milestones
pub const STREAK_ROLES: &[RoleThreshold] = &[
    at(3, "Dawn Drip"),
    at(7, "Weeklong Whisk"),
    at(14, "Fortnight Foam"),
    at(30, "Moonlit Macchiato"),
    at(60, "Celestial Siphon"),
];

/// Total minigame wins across all games
pub const WINNER_ROLES: &[RoleThreshold] = &[
    at(1, "Game Initiate"),
    at(5, "Quiz Connoisseur"),
    at(10, "Arcade Aficionado"),
    at(25, "Cafe Champion"),
    at(50, "Arcade Legend"),
];

const SNACK_ROLES: &[RoleThreshold] = &[
    at(50, "Snack Sleuth"),
    at(150, "Candy Connoisseur"),
    at(300, "Snack Legend"),
];
const CIDER_ROLES: &[RoleThreshold] = &[
    at(50, "Cider Squeezer"),
    at(150, "Apple Ace"),
    at(300, "Press Legend"),
];
const TRIVIA_ROLES: &[RoleThreshold] = &[
    at(50, "Quiz Rookie"),
    at(150, "Knowledge Keeper"),
    at(300, "Trivia Titan"),
];
const JUMBLE_ROLES: &[RoleThreshold] = &[
    at(50, "Word Weaver"),
    at(150, "Puzzle Pro"),
    at(300, "Word Wizard"),
];
const HEIST_ROLES: &[RoleThreshold] = &[
    at(50, "Cookie Cutter"),
    at(150, "Caper Captain"),
    at(300, "Cookie King"),
];

/// Per-game win milestones.  Both the incremental granter and the
/// highest-satisfied display read these against per-game win counts.
pub fn game_roles(game: Game) -> &'static [RoleThreshold] {
    match game {
        Game::Snack => SNACK_ROLES,
        Game::Cider => CIDER_ROLES,
        Game::Trivia => TRIVIA_ROLES,
        Game::Jumble => JUMBLE_ROLES,
        Game::Heist => HEIST_ROLES,
    }
}

/// Thresholds crossed by moving a counter from `prev` to `new`: everything
/// in `(prev, new]`, ascending, so lower rewards are granted before higher
/// ones within one update.
pub fn crossed(table: &'static [RoleThreshold], prev: u64, new: u64) -> Vec<&'static RoleThreshold> {
    table
        .iter()
        .filter(|t| t.at > prev && t.at <= new)
        .collect()
}

/// The largest threshold at or below `value`, or `None` when the value sits
/// below the whole table.  Scans descending; first hit wins.
pub fn highest_satisfied(
    table: &'static [RoleThreshold],
    value: u64,
) -> Option<&'static RoleThreshold> {
    table.iter().rev().find(|t| t.at <= value)
}

/// The best per-game role a member's win counts have reached, across all
/// five games.
pub fn highest_minigame_role(profile: &Profile) -> Option<&'static RoleThreshold> {
    Game::ALL
        .into_iter()
        .filter_map(|game| highest_satisfied(game_roles(game), profile.wins.get(game)))
        .max_by_key(|t| t.at)
}

/// Credit a win's fixed point value to the per-game and total tallies.
/// Returns the amount for the reply message.
pub fn award_points(profile: &mut Profile, game: Game) -> u64 {
    let amount = game.points();
    profile.points.add(game, amount);
    amount
}

/// Record one win and return the roles this win crossed, in the total-wins
/// table and then the game's own table.
pub fn record_win(profile: &mut Profile, game: Game) -> Vec<&'static str> {
    let prev_total = profile.wins.total;
    let prev_game = profile.wins.get(game);
    profile.wins.add(game, 1);

    let mut roles = Vec::new();
    for t in crossed(WINNER_ROLES, prev_total, profile.wins.total) {
        roles.push(t.role);
    }
    for t in crossed(game_roles(game), prev_game, profile.wins.get(game)) {
        roles.push(t.role);
    }
    roles
}

/// Grant roles without making the caller's reply wait on the platform.
/// Failures (role missing, insufficient permission) are logged and never
/// retried.  The handle is only awaited by tests.
pub fn spawn_role_grants(
    platform: Arc<dyn ChatPlatform>,
    community: CommunityId,
    member: MemberId,
    roles: Vec<&'static str>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for role in roles {
            if let Err(e) = platform.add_role(community, member, role).await {
                log_internal!("Role add failed for \"{}\" on {}: {}", role, member, e);
            }
        }
    })
}
