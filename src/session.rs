//! Per-channel minigame rounds.
//!
//! The registry holds at most one active round per (channel, game).  Rounds
//! are created by a start command, mutated by matching user actions, and
//! resolved exactly once: either by the first qualifying action or by the
//! deadline timer, whichever comes first.  [`SessionRegistry::resolve`] is
//! the single check-and-set primitive both paths go through.

use crate::ids::{ChannelId, CommunityId, MemberId};
use std::collections::{HashMap, HashSet};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Snack,
    Cider,
    Trivia,
    Jumble,
    Heist,
}

impl Game {
    pub const ALL: [Game; 5] = [
        Game::Snack,
        Game::Cider,
        Game::Trivia,
        Game::Jumble,
        Game::Heist,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Game::Snack => "snack",
            Game::Cider => "cider",
            Game::Trivia => "trivia",
            Game::Jumble => "jumble",
            Game::Heist => "heist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Game::Snack => "Snack Sleuth",
            Game::Cider => "Cider Press",
            Game::Trivia => "Cafe Trivia",
            Game::Jumble => "Word Jumble",
            Game::Heist => "Cookie Heist",
        }
    }

    pub fn from_key(key: &str) -> Option<Game> {
        Game::ALL.into_iter().find(|g| g.key() == key)
    }

    /// Points a win is worth
    pub fn points(self) -> u64 {
        match self {
            Game::Snack => 10,
            Game::Cider => 15,
            Game::Trivia => 12,
            Game::Jumble => 8,
            Game::Heist => 20,
        }
    }

    /// Round length in seconds
    pub fn round_secs(self) -> u64 {
        match self {
            Game::Snack => 30,
            Game::Cider => 10,
            Game::Trivia => 20,
            Game::Jumble => 20,
            Game::Heist => 15,
        }
    }
}

/// How a guess is compared against the stored answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Lowercased guess contains the lowercased answer
    Substring,
    /// Equal after lowercasing and stripping non-alphanumerics
    Normalized,
}

/// Lowercase and strip everything outside `[a-z0-9]`.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

pub fn guess_matches(mode: MatchMode, answer: &str, guess: &str) -> bool {
    match mode {
        MatchMode::Substring => guess.to_lowercase().contains(&answer.to_lowercase()),
        MatchMode::Normalized => normalize(guess) == normalize(answer),
    }
}

#[derive(Debug)]
pub enum RoundData {
    /// Free-text guessing (snack, jumble)
    Guess {
        answer: String,
        /// Original-cased answer for the reveal message
        display: String,
        mode: MatchMode,
        hint: Option<String>,
    },
    /// Four-choice quiz resolved by button press
    Quiz { correct: char, reveal: String },
    /// Two participants racing button presses
    Duel {
        challenger: MemberId,
        opponent: MemberId,
        scores: HashMap<MemberId, u64>,
    },
    /// Participants accumulate until the deadline
    Team { members: HashSet<MemberId> },
}

#[derive(Debug)]
pub struct Round {
    pub game: Game,
    /// Community the round's channel belongs to; rewards at timeout need it
    pub community: CommunityId,
    pub started_at: Instant,
    pub deadline: Instant,
    resolved: bool,
    pub data: RoundData,
}

impl Round {
    pub fn new(game: Game, community: CommunityId, data: RoundData) -> Self {
        let now = Instant::now();
        Self {
            game,
            community,
            started_at: now,
            deadline: now + std::time::Duration::from_secs(game.round_secs()),
            resolved: false,
            data,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct AlreadyActive;

/// Registry of in-progress rounds, keyed by (channel, game).  Owned by the
/// event dispatcher; the run-to-completion event loop is what makes
/// check-then-resolve safe without a lock.
#[derive(Default)]
pub struct SessionRegistry {
    rounds: HashMap<(ChannelId, Game), Round>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, channel: ChannelId, game: Game) -> bool {
        self.rounds.contains_key(&(channel, game))
    }

    /// Create a round, rejected if one of this game is already running in
    /// the channel.
    pub fn try_start(
        &mut self,
        channel: ChannelId,
        round: Round,
    ) -> Result<&mut Round, AlreadyActive> {
        use std::collections::hash_map::Entry;
        match self.rounds.entry((channel, round.game)) {
            Entry::Occupied(_) => Err(AlreadyActive),
            Entry::Vacant(v) => Ok(v.insert(round)),
        }
    }

    /// Access an active, unresolved round for mid-round mutation (duel
    /// presses, heist joins).
    pub fn get_mut(&mut self, channel: ChannelId, game: Game) -> Option<&mut Round> {
        self.rounds
            .get_mut(&(channel, game))
            .filter(|r| !r.resolved)
    }

    /// Resolve-and-remove: returns the round only if it exists and has not
    /// already been resolved, marking it resolved and removing it from the
    /// registry in the same call.  Both the winning action and the deadline
    /// timer go through here, so whichever arrives second gets `None`.
    pub fn resolve(&mut self, channel: ChannelId, game: Game) -> Option<Round> {
        let round = self.rounds.get_mut(&(channel, game))?;
        if round.resolved {
            return None;
        }
        round.resolved = true;
        self.rounds.remove(&(channel, game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess_round(game: Game, answer: &str, mode: MatchMode) -> Round {
        Round::new(
            game,
            CommunityId(1),
            RoundData::Guess {
                answer: answer.to_lowercase(),
                display: answer.to_string(),
                mode,
                hint: None,
            },
        )
    }

    #[test]
    fn normalize_strips_case_and_punctuation() {
        assert_eq!(normalize("Flat White!"), "flatwhite");
        assert_eq!(normalize("  cafe-au-lait  "), "cafeaulait");
        assert_eq!(normalize("123 GO"), "123go");
    }

    #[test]
    fn substring_and_normalized_matching() {
        assert!(guess_matches(MatchMode::Substring, "espresso", "I bet it's Espresso?"));
        assert!(!guess_matches(MatchMode::Substring, "espresso", "expresso"));
        assert!(guess_matches(MatchMode::Normalized, "Flat White", "flatwhite"));
        assert!(!guess_matches(MatchMode::Normalized, "Flat White", "flat whit"));
    }

    #[test]
    fn second_round_of_same_game_is_rejected() {
        let mut reg = SessionRegistry::new();
        let ch = ChannelId(1);
        reg.try_start(ch, guess_round(Game::Snack, "scone", MatchMode::Substring))
            .unwrap();
        let err = reg
            .try_start(ch, guess_round(Game::Snack, "scone", MatchMode::Substring))
            .unwrap_err();
        assert_eq!(err, AlreadyActive);

        // A different game in the same channel is fine
        reg.try_start(ch, guess_round(Game::Jumble, "scone", MatchMode::Normalized))
            .unwrap();
        // Same game in a different channel is fine
        reg.try_start(
            ChannelId(2),
            guess_round(Game::Snack, "scone", MatchMode::Substring),
        )
        .unwrap();
    }

    #[test]
    fn resolve_is_exactly_once() {
        let mut reg = SessionRegistry::new();
        let ch = ChannelId(1);
        reg.try_start(ch, guess_round(Game::Snack, "scone", MatchMode::Substring))
            .unwrap();

        // First qualifying action wins the race
        assert!(reg.resolve(ch, Game::Snack).is_some());
        // Second near-simultaneous match, and the late deadline timer, both
        // find nothing to resolve
        assert!(reg.resolve(ch, Game::Snack).is_none());
        assert!(!reg.is_active(ch, Game::Snack));
        assert!(reg.get_mut(ch, Game::Snack).is_none());
    }

    #[test]
    fn registry_is_idle_after_resolution() {
        let mut reg = SessionRegistry::new();
        let ch = ChannelId(9);
        reg.try_start(ch, guess_round(Game::Jumble, "mocha", MatchMode::Normalized))
            .unwrap();
        reg.resolve(ch, Game::Jumble);
        // idle again: a new round may start
        reg.try_start(ch, guess_round(Game::Jumble, "chai", MatchMode::Normalized))
            .unwrap();
    }
}
