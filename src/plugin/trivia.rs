use crate::session::{Game, Round, RoundData};
use crate::{event::*, plugin::*};
use anyhow::Result;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Four-choice cafe trivia, answered by button press.  Wrong presses sting
/// but the round keeps going; the first correct press ends it.
pub struct Trivia;

pub(crate) struct Question {
    pub prompt: &'static str,
    pub choices: [&'static str; 4],
    pub answer: char,
}

const fn q(prompt: &'static str, choices: [&'static str; 4], answer: char) -> Question {
    Question {
        prompt,
        choices,
        answer,
    }
}

pub(crate) const QUESTIONS: &[Question] = &[
    q(
        "Which brew method steeps grounds in cold water overnight?",
        ["A) Pour-over", "B) Cold brew", "C) French press", "D) Moka pot"],
        'B',
    ),
    q(
        "What is a latte topped with when it becomes a cappuccino?",
        ["A) More espresso", "B) Caramel", "C) A thick foam cap", "D) Chocolate"],
        'C',
    ),
    q(
        "Which tea is whisked to a froth with a bamboo whisk?",
        ["A) Earl Grey", "B) Chai", "C) Rooibos", "D) Matcha"],
        'D',
    ),
    q(
        "A 'flat white' originated in which part of the world?",
        ["A) Australia/NZ", "B) Italy", "C) Portugal", "D) Austria"],
        'A',
    ),
    q(
        "What makes a croissant flaky?",
        ["A) Baking soda", "B) Laminated butter layers", "C) Egg wash", "D) Sugar syrup"],
        'B',
    ),
    q(
        "Which bean roast is darkest?",
        ["A) Cinnamon", "B) City", "C) French", "D) Blonde"],
        'C',
    ),
    q(
        "An 'affogato' drowns ice cream in what?",
        ["A) Espresso", "B) Cold brew", "C) Steamed milk", "D) Hot cocoa"],
        'A',
    ),
    q(
        "Chai is traditionally simmered with milk and what?",
        ["A) Honeycomb", "B) Spices", "C) Cream soda", "D) Malt"],
        'B',
    ),
    q(
        "Which pastry shares its name with a crescent moon?",
        ["A) Brioche", "B) Scone", "C) Strudel", "D) Croissant"],
        'D',
    ),
    q(
        "What does 'macchiato' mean?",
        ["A) Stained", "B) Frothed", "C) Doubled", "D) Sweetened"],
        'A',
    ),
];

#[async_trait]
impl Plugin for Trivia {
    fn name(&self) -> &'static str {
        "trivia"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}game trivia - cafe trivia quiz (+{} points)",
            prefix,
            Game::Trivia.points()
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = game_subcommand(ctx, event, "trivia") {
            return start(ctx, msg).await;
        }

        match event {
            Event::ButtonPress(press) if press.id.starts_with("trivia:") => {
                answer(ctx, press).await
            }
            Event::RoundTimeout { channel, game: Game::Trivia } => {
                let Some(round) = ctx.sessions.resolve(*channel, Game::Trivia) else {
                    return Ok(EventHandled::Yes);
                };
                if let RoundData::Quiz { correct, reveal } = &round.data {
                    ctx.say(
                        *channel,
                        format!("Time's up! The correct answer was {}: {}", correct, reveal),
                    )
                    .await;
                }
                Ok(EventHandled::Yes)
            }
            _ => Ok(EventHandled::No),
        }
    }
}

async fn start(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    if ctx.sessions.is_active(msg.channel, Game::Trivia) {
        ctx.say(msg.channel, "A trivia round is already running here.")
            .await;
        return Ok(EventHandled::Yes);
    }

    let question = QUESTIONS.choose(ctx.rng).expect("non-empty question pool");
    let round = Round::new(
        Game::Trivia,
        msg.community,
        RoundData::Quiz {
            correct: question.answer,
            reveal: question.choices[(question.answer as u8 - b'A') as usize].to_string(),
        },
    );
    ctx.sessions
        .try_start(msg.channel, round)
        .expect("checked idle above");
    ctx.timers.schedule(
        Duration::from_secs(Game::Trivia.round_secs()),
        Event::RoundTimeout {
            channel: msg.channel,
            game: Game::Trivia,
        },
    );

    ctx.say(
        msg.channel,
        format!(
            "Cafe trivia:\n{}\n{}\nPress trivia:A-D to answer ({}s)",
            question.prompt,
            question.choices.join("\n"),
            Game::Trivia.round_secs()
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}

async fn answer(ctx: &mut Context<'_>, press: &ButtonEvent) -> Result<EventHandled> {
    let picked = match press.id.split(':').nth(1) {
        Some(s) if s.len() == 1 => s.chars().next().unwrap(),
        _ => return Ok(EventHandled::No),
    };

    let correct = match ctx.sessions.get_mut(press.channel, Game::Trivia) {
        Some(round) => match &round.data {
            RoundData::Quiz { correct, .. } => *correct,
            _ => return Ok(EventHandled::No),
        },
        None => {
            ctx.say(press.channel, "Round over!").await;
            return Ok(EventHandled::Yes);
        }
    };

    if picked != correct {
        ctx.say(press.channel, "Not quite, try again!").await;
        return Ok(EventHandled::Yes);
    }

    let Some(_) = ctx.sessions.resolve(press.channel, Game::Trivia) else {
        return Ok(EventHandled::Yes);
    };
    let points = reward_winner(ctx, press.community, press.member, Game::Trivia).await;
    ctx.say(
        press.channel,
        format!(
            "Correct! {} answered {}! (+{} points)",
            press.member_name, picked, points
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}
