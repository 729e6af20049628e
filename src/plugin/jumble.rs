use crate::rewards;
use crate::session::{guess_matches, Game, MatchMode, Round, RoundData};
use crate::{event::*, plugin::*};
use anyhow::Result;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;

/// Unscramble a cafe word.  Punctuation and spacing are ignored when
/// guessing; solving within six seconds earns a speed bonus.
pub struct Jumble;

const SPEED_BONUS_POINTS: u64 = 5;
const SPEED_BONUS_WINDOW: Duration = Duration::from_secs(6);
const HINT_AFTER: Duration = Duration::from_secs(10);

pub(crate) const WORDS: &[&str] = &[
    "Espresso",
    "Cappuccino",
    "Macchiato",
    "Cold Brew",
    "Flat White",
    "Americano",
    "Croissant",
    "Cinnamon Roll",
    "Blueberry Muffin",
    "Sugarcube",
    "Percolator",
    "Steamed Milk",
    "Latte Art",
    "Pastry Case",
    "Single Origin",
    "House Blend",
    "Tea Kettle",
    "Chai Spice",
    "Marshmallow",
    "Butterscotch",
];

#[async_trait]
impl Plugin for Jumble {
    fn name(&self) -> &'static str {
        "jumble"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}game jumble - unscramble a cafe word, speed bonus (+{} points)",
            prefix,
            Game::Jumble.points()
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = game_subcommand(ctx, event, "jumble") {
            return start(ctx, msg).await;
        }

        match event {
            Event::Message(msg) if !msg.author_is_bot => guess(ctx, msg).await,
            Event::RoundHint { channel, game: Game::Jumble } => {
                // Only if no one has solved it yet
                let hint = ctx.sessions.get_mut(*channel, Game::Jumble).and_then(|round| {
                    let remaining = round
                        .deadline
                        .saturating_duration_since(tokio::time::Instant::now())
                        .as_secs();
                    match &round.data {
                        RoundData::Guess { hint: Some(hint), .. } => {
                            Some((hint.clone(), remaining))
                        }
                        _ => None,
                    }
                });
                if let Some((hint, remaining)) = hint {
                    ctx.say(
                        *channel,
                        format!("Hint: the answer starts with {} ({}s left)", hint, remaining),
                    )
                    .await;
                }
                Ok(EventHandled::Yes)
            }
            Event::RoundTimeout { channel, game: Game::Jumble } => {
                let Some(round) = ctx.sessions.resolve(*channel, Game::Jumble) else {
                    return Ok(EventHandled::Yes);
                };
                if let RoundData::Guess { display, .. } = &round.data {
                    ctx.say(*channel, format!("Time's up! The word was {}.", display))
                        .await;
                }
                Ok(EventHandled::Yes)
            }
            _ => Ok(EventHandled::No),
        }
    }
}

fn scramble(word: &str, rng: &mut rand::rngs::StdRng) -> String {
    let mut letters: Vec<char> = word.chars().collect();
    letters.shuffle(rng);
    letters.into_iter().collect()
}

async fn start(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    if ctx.sessions.is_active(msg.channel, Game::Jumble) {
        ctx.say(msg.channel, "A jumble round is already running here.")
            .await;
        return Ok(EventHandled::Yes);
    }

    let word = *WORDS.choose(ctx.rng).expect("non-empty word pool");
    let jumbled = scramble(word, ctx.rng);
    let first = word.chars().next().expect("non-empty word");

    let round = Round::new(
        Game::Jumble,
        msg.community,
        RoundData::Guess {
            answer: word.to_string(),
            display: word.to_string(),
            mode: MatchMode::Normalized,
            hint: Some(first.to_string()),
        },
    );
    ctx.sessions
        .try_start(msg.channel, round)
        .expect("checked idle above");
    ctx.timers.schedule(
        Duration::from_secs(Game::Jumble.round_secs()),
        Event::RoundTimeout {
            channel: msg.channel,
            game: Game::Jumble,
        },
    );
    ctx.timers.schedule(
        HINT_AFTER,
        Event::RoundHint {
            channel: msg.channel,
            game: Game::Jumble,
        },
    );

    ctx.say(
        msg.channel,
        format!(
            "Word jumble! Unscramble: {} ({}s)\nPunctuation and spacing are ignored when guessing.",
            jumbled,
            Game::Jumble.round_secs()
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}

async fn guess(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    let matched = match ctx.sessions.get_mut(msg.channel, Game::Jumble) {
        Some(round) => match &round.data {
            RoundData::Guess { answer, mode, .. } => guess_matches(*mode, answer, &msg.content),
            _ => false,
        },
        None => return Ok(EventHandled::No),
    };
    if !matched {
        return Ok(EventHandled::No);
    }

    let Some(round) = ctx.sessions.resolve(msg.channel, Game::Jumble) else {
        return Ok(EventHandled::No);
    };
    let RoundData::Guess { display, .. } = &round.data else {
        return Ok(EventHandled::No);
    };

    let fast = round.elapsed() < SPEED_BONUS_WINDOW;
    let profile = ctx.store.get_or_create(msg.community, msg.author);
    let mut points = rewards::award_points(profile, Game::Jumble);
    if fast {
        profile.points.add(Game::Jumble, SPEED_BONUS_POINTS);
        points += SPEED_BONUS_POINTS;
    }
    let roles = rewards::record_win(profile, Game::Jumble);
    if !roles.is_empty() {
        let _ = rewards::spawn_role_grants(Arc::clone(ctx.platform), msg.community, msg.author, roles);
    }
    ctx.store.persist().await;

    let bonus_note = if fast {
        format!(", including a {}-point speed bonus", SPEED_BONUS_POINTS)
    } else {
        String::new()
    };
    ctx.say(
        msg.channel,
        format!(
            "Correct! {} unscrambled {}! (+{} points{})",
            msg.author_name, display, points, bonus_note
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}
