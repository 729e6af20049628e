use crate::session::{guess_matches, Game, MatchMode, Round, RoundData};
use crate::{event::*, plugin::*};
use anyhow::Result;
use rand::seq::SliceRandom;
use std::time::Duration;

/// "Whose snack is this?": guess the treat from three hints.  First correct
/// guess in the channel wins; the round starter may win their own round.
pub struct Snack;

pub(crate) const ROUNDS: &[(&str, [&str; 3])] = &[
    ("Cinnamon Roll", ["Swirls", "Sticky frosting", "Warm from the oven"]),
    ("Espresso", ["Tiny cup", "Big kick", "Crema on top"]),
    ("Croissant", ["Flaky layers", "Butter", "Crescent moon"]),
    ("Pancakes", ["A tall stack", "Maple syrup", "Sunday morning"]),
    ("Hot Cocoa", ["Marshmallows", "Whipped cream", "Snow day"]),
    ("Matcha Latte", ["Bright green", "Whisked", "Earthy"]),
    ("Lemonade", ["Puckery", "Ice cubes", "Summer stand"]),
    ("Blueberry Muffin", ["Paper wrapper", "Crumb top", "Bursting berries"]),
    ("Waffle", ["Little squares", "Crispy edges", "Holds the syrup"]),
    ("Milkshake", ["Thick straw", "Cold", "Two spoons"]),
    ("Cookie", ["Chocolate chips", "Still gooey", "Glass of milk"]),
    ("Chai", ["Cardamom", "Steamed milk", "Spiced"]),
];

#[async_trait]
impl Plugin for Snack {
    fn name(&self) -> &'static str {
        "snack"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}game snack - guess the treat from hints (+{} points)",
            prefix,
            Game::Snack.points()
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = game_subcommand(ctx, event, "snack") {
            return start(ctx, msg).await;
        }

        match event {
            Event::Message(msg) if !msg.author_is_bot => guess(ctx, msg).await,
            Event::RoundTimeout { channel, game: Game::Snack } => {
                let Some(round) = ctx.sessions.resolve(*channel, Game::Snack) else {
                    return Ok(EventHandled::Yes);
                };
                if let RoundData::Guess { display, .. } = &round.data {
                    ctx.say(*channel, format!("Time's up! The answer was {}.", display))
                        .await;
                }
                Ok(EventHandled::Yes)
            }
            _ => Ok(EventHandled::No),
        }
    }
}

async fn start(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    if ctx.sessions.is_active(msg.channel, Game::Snack) {
        ctx.say(msg.channel, "A snack round is already running here.")
            .await;
        return Ok(EventHandled::Yes);
    }

    let (answer, hints) = ROUNDS.choose(ctx.rng).expect("non-empty round pool");
    let round = Round::new(
        Game::Snack,
        msg.community,
        RoundData::Guess {
            answer: answer.to_lowercase(),
            display: answer.to_string(),
            mode: MatchMode::Substring,
            hint: None,
        },
    );
    ctx.sessions
        .try_start(msg.channel, round)
        .expect("checked idle above");
    ctx.timers.schedule(
        Duration::from_secs(Game::Snack.round_secs()),
        Event::RoundTimeout {
            channel: msg.channel,
            game: Game::Snack,
        },
    );

    let hint_text = hints
        .iter()
        .enumerate()
        .map(|(i, h)| format!("Hint {}: {}", i + 1, h))
        .collect::<Vec<_>>()
        .join("\n");
    ctx.say(
        msg.channel,
        format!(
            "Whose snack is this?\n{}\nReply with the treat's name ({}s)",
            hint_text,
            Game::Snack.round_secs()
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}

async fn guess(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    let matched = match ctx.sessions.get_mut(msg.channel, Game::Snack) {
        Some(round) => match &round.data {
            RoundData::Guess { answer, mode, .. } => guess_matches(*mode, answer, &msg.content),
            _ => false,
        },
        None => return Ok(EventHandled::No),
    };
    if !matched {
        return Ok(EventHandled::No);
    }

    // Mark resolved before awarding so a second matching guess in the same
    // turn sequence finds the round gone.
    let Some(round) = ctx.sessions.resolve(msg.channel, Game::Snack) else {
        return Ok(EventHandled::No);
    };
    let RoundData::Guess { display, .. } = &round.data else {
        return Ok(EventHandled::No);
    };

    let points = reward_winner(ctx, msg.community, msg.author, Game::Snack).await;
    ctx.say(
        msg.channel,
        format!(
            "Correct! {} guessed {}! (+{} points)",
            msg.author_name, display, points
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::{msg, test_handler};
    use crate::ids::ChannelId;
    use crate::session::Game;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expected_answer(seed: u64) -> &'static str {
        let mut rng = StdRng::seed_from_u64(seed);
        ROUNDS.choose(&mut rng).unwrap().0
    }

    #[tokio::test]
    async fn first_correct_guess_wins_exactly_once() {
        let (mut handler, platform) = test_handler(7);
        let answer = expected_answer(7);
        let ch = ChannelId(10);

        handler.dispatch(msg(ch, 1, "!game snack")).await;
        assert!(platform.sent_to(ch).contains("Hint 1"));

        handler.dispatch(msg(ch, 2, "is it toast?")).await;
        // The starter's own guess counts too
        handler
            .dispatch(msg(ch, 1, &format!("maybe {}?", answer)))
            .await;
        // A second, near-simultaneous winning guess is ignored
        handler.dispatch(msg(ch, 2, answer)).await;

        let store = handler.store();
        let winner = store.get(crate::handler::tests::COMMUNITY, crate::ids::MemberId(1)).unwrap();
        assert_eq!(winner.wins.snack, 1);
        assert_eq!(winner.points.snack, Game::Snack.points());
        assert!(store
            .get(crate::handler::tests::COMMUNITY, crate::ids::MemberId(2))
            .map(|p| p.wins.total == 0)
            .unwrap_or(true));
        assert!(!handler.sessions().is_active(ch, Game::Snack));
    }

    #[tokio::test]
    async fn second_start_is_rejected_and_bots_cannot_guess() {
        let (mut handler, platform) = test_handler(7);
        let answer = expected_answer(7).to_string();
        let ch = ChannelId(11);

        handler.dispatch(msg(ch, 1, "!game snack")).await;
        handler.dispatch(msg(ch, 2, "!game snack")).await;
        assert!(platform.sent_to(ch).contains("already running"));

        let mut bot_guess = msg(ch, 3, &answer);
        if let Event::Message(m) = &mut bot_guess {
            m.author_is_bot = true;
        }
        handler.dispatch(bot_guess).await;
        assert!(handler.sessions().is_active(ch, Game::Snack));
    }

    #[tokio::test]
    async fn timeout_reveals_and_clears_the_round() {
        let (mut handler, platform) = test_handler(7);
        let ch = ChannelId(12);

        handler.dispatch(msg(ch, 1, "!game snack")).await;
        handler
            .dispatch(Event::RoundTimeout {
                channel: ch,
                game: Game::Snack,
            })
            .await;

        assert!(platform.sent_to(ch).contains("Time's up!"));
        assert!(!handler.sessions().is_active(ch, Game::Snack));

        // A late duplicate timeout finds nothing
        let before = platform.sent().len();
        handler
            .dispatch(Event::RoundTimeout {
                channel: ch,
                game: Game::Snack,
            })
            .await;
        assert_eq!(platform.sent().len(), before);
    }
}
