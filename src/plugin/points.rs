use crate::rewards;
use crate::session::Game;
use crate::{event::*, plugin::*};
use anyhow::Result;

/// Minigame point totals and leaderboards.
pub struct Points;

#[async_trait]
impl Plugin for Points {
    fn name(&self) -> &'static str {
        "points"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}points show [@user] - view points and highest role\n\
             {}points leaderboard <game> - view a leaderboard",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, args)) = event.bot_cmd(ctx, "points") else {
            return Ok(EventHandled::No);
        };

        match args.first().copied().unwrap_or("show") {
            "show" => {
                let target = msg.mentions.first().copied().unwrap_or(msg.author);
                let name = ctx.display_name(msg.community, target).await;

                let profile = ctx.store.get(msg.community, target).cloned().unwrap_or_default();
                let highest = rewards::highest_minigame_role(&profile)
                    .map(|t| t.role)
                    .unwrap_or("No roles yet");

                let mut reply = format!(
                    "{}: {} total points, highest role: {}\n",
                    name, profile.points.total, highest
                );
                for game in Game::ALL {
                    reply.push_str(&format!(
                        "{}: {} points\n",
                        game.label(),
                        profile.points.get(game)
                    ));
                }
                ctx.say(msg.channel, &reply).await;
            }
            "leaderboard" => {
                let Some(key) = args.get(1) else {
                    ctx.say(
                        msg.channel,
                        format!(
                            "Usage: {}points leaderboard <game> (snack, cider, trivia, jumble, heist, total)",
                            ctx.cfg.general.command_prefix
                        ),
                    )
                    .await;
                    return Ok(EventHandled::Yes);
                };

                let (title, game) = match (*key, Game::from_key(key)) {
                    ("total", _) => ("All Games", None),
                    (_, Some(game)) => (game.label(), Some(game)),
                    (_, None) => {
                        ctx.say(
                            msg.channel,
                            format!(
                                "Unknown game `{}`. Try snack, cider, trivia, jumble, heist or total.",
                                key
                            ),
                        )
                        .await;
                        return Ok(EventHandled::Yes);
                    }
                };

                let mut rows: Vec<(crate::ids::MemberId, u64)> = ctx
                    .store
                    .community(msg.community)
                    .map(|members| {
                        members
                            .iter()
                            .map(|(member, p)| {
                                let points = match game {
                                    Some(game) => p.points.get(game),
                                    None => p.points.total,
                                };
                                (*member, points)
                            })
                            .filter(|(_, points)| *points > 0)
                            .collect()
                    })
                    .unwrap_or_default();

                if rows.is_empty() {
                    ctx.say(msg.channel, format!("No one has played {} yet!", title))
                        .await;
                    return Ok(EventHandled::Yes);
                }

                rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                rows.truncate(10);

                let mut reply = format!("{} leaderboard:\n", title);
                for (rank, (member, points)) in rows.iter().enumerate() {
                    let medal = match rank {
                        0 => "🥇".to_string(),
                        1 => "🥈".to_string(),
                        2 => "🥉".to_string(),
                        n => format!("{}.", n + 1),
                    };
                    let name = ctx.display_name(msg.community, *member).await;
                    reply.push_str(&format!("{} {} - {} points\n", medal, name, points));
                }
                ctx.say(msg.channel, &reply).await;
            }
            _ => {
                ctx.say(
                    msg.channel,
                    format!(
                        "Usage: {}points show [@user] or {}points leaderboard <game>",
                        ctx.cfg.general.command_prefix, ctx.cfg.general.command_prefix
                    ),
                )
                .await;
            }
        }

        Ok(EventHandled::Yes)
    }
}
