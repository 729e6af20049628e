use crate::session::{Game, Round, RoundData};
use crate::{event::*, plugin::*};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

/// The cider press duel: two members mash a button for ten seconds, the
/// higher press count takes the points.  Ties pay nobody.
pub struct Cider;

#[async_trait]
impl Plugin for Cider {
    fn name(&self) -> &'static str {
        "cider"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}game cider @user - cider press duel (+{} points)",
            prefix,
            Game::Cider.points()
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = game_subcommand(ctx, event, "cider") {
            return start(ctx, msg).await;
        }

        match event {
            Event::ButtonPress(event) if event.id == "cider" => press(ctx, event).await,
            Event::RoundTimeout { channel, game: Game::Cider } => {
                let Some(round) = ctx.sessions.resolve(*channel, Game::Cider) else {
                    return Ok(EventHandled::Yes);
                };
                let community = round.community;
                let RoundData::Duel {
                    challenger,
                    opponent,
                    scores,
                } = round.data
                else {
                    return Ok(EventHandled::Yes);
                };
                settle(ctx, community, *channel, challenger, opponent, scores).await;
                Ok(EventHandled::Yes)
            }
            _ => Ok(EventHandled::No),
        }
    }
}

async fn start(ctx: &mut Context<'_>, msg: &MessageEvent) -> Result<EventHandled> {
    let opponent = msg.mentions.first().copied();
    let opponent = match opponent {
        Some(opponent) if opponent != msg.author => opponent,
        _ => {
            ctx.say(
                msg.channel,
                format!(
                    "Challenge someone with {}game cider @user",
                    ctx.cfg.general.command_prefix
                ),
            )
            .await;
            return Ok(EventHandled::Yes);
        }
    };

    if ctx.sessions.is_active(msg.channel, Game::Cider) {
        ctx.say(msg.channel, "A cider duel is already running here.")
            .await;
        return Ok(EventHandled::Yes);
    }

    let round = Round::new(
        Game::Cider,
        msg.community,
        RoundData::Duel {
            challenger: msg.author,
            opponent,
            scores: HashMap::new(),
        },
    );
    ctx.sessions
        .try_start(msg.channel, round)
        .expect("checked idle above");
    ctx.timers.schedule(
        Duration::from_secs(Game::Cider.round_secs()),
        Event::RoundTimeout {
            channel: msg.channel,
            game: Game::Cider,
        },
    );

    let opponent_name = ctx.display_name(msg.community, opponent).await;
    ctx.say(
        msg.channel,
        format!(
            "{}, you have been challenged to a cider press duel by {}! Mash the cider button! ({}s)",
            opponent_name,
            msg.author_name,
            Game::Cider.round_secs()
        ),
    )
    .await;

    Ok(EventHandled::Yes)
}

async fn press(ctx: &mut Context<'_>, event: &ButtonEvent) -> Result<EventHandled> {
    let Some(round) = ctx.sessions.get_mut(event.channel, Game::Cider) else {
        ctx.say(event.channel, "Round over!").await;
        return Ok(EventHandled::Yes);
    };
    let RoundData::Duel {
        challenger,
        opponent,
        scores,
    } = &mut round.data
    else {
        return Ok(EventHandled::No);
    };

    if event.member != *challenger && event.member != *opponent {
        ctx.say(event.channel, "This duel is not for you!").await;
        return Ok(EventHandled::Yes);
    }

    *scores.entry(event.member).or_insert(0) += 1;
    Ok(EventHandled::Yes)
}

async fn settle(
    ctx: &mut Context<'_>,
    community: crate::ids::CommunityId,
    channel: crate::ids::ChannelId,
    challenger: crate::ids::MemberId,
    opponent: crate::ids::MemberId,
    scores: HashMap<crate::ids::MemberId, u64>,
) {
    let a = scores.get(&challenger).copied().unwrap_or(0);
    let b = scores.get(&opponent).copied().unwrap_or(0);
    let challenger_name = ctx.display_name(community, challenger).await;
    let opponent_name = ctx.display_name(community, opponent).await;

    let mut result = format!(
        "Cider press results: {} {} presses, {} {} presses.\n",
        challenger_name, a, opponent_name, b
    );

    if a == b {
        result.push_str("It's a tie! Both pressers are equally quick.");
        ctx.say(channel, result).await;
        return;
    }

    let (winner, winner_name, winner_score) = if a > b {
        (challenger, challenger_name, a)
    } else {
        (opponent, opponent_name, b)
    };
    let points = reward_winner(ctx, community, winner, Game::Cider).await;
    result.push_str(&format!(
        "{} wins with {} presses! (+{} points)",
        winner_name, winner_score, points
    ));
    ctx.say(channel, result).await;
}
