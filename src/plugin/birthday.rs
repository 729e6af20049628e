use crate::{event::*, plugin::*};
use anyhow::Result;

/// Remembers birthdays.  Month and day are range-checked, but day 31 in a
/// short month is accepted as given.
pub struct Birthday;

#[async_trait]
impl Plugin for Birthday {
    fn name(&self) -> &'static str {
        "birthday"
    }

    fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.general.command_prefix;
        Some(format!(
            "{}birthday set MM-DD - register your birthday (show/remove too)",
            prefix
        ))
    }

    async fn handle(&self, ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, args)) = event.bot_cmd(ctx, "birthday") else {
            return Ok(EventHandled::No);
        };

        match args.first().copied().unwrap_or("show") {
            "set" => {
                let Some((month, day)) = args.get(1).and_then(|a| parse_mm_dd(a)) else {
                    ctx.say(
                        msg.channel,
                        format!("Usage: {}birthday set MM-DD", ctx.cfg.general.command_prefix),
                    )
                    .await;
                    return Ok(EventHandled::Yes);
                };
                let profile = ctx.store.get_or_create(msg.community, msg.author);
                profile.birthday.month = Some(month);
                profile.birthday.day = Some(day);
                ctx.store.persist().await;
                ctx.say(
                    msg.channel,
                    format!("Saved your birthday as {:02}-{:02}.", month, day),
                )
                .await;
            }
            "show" => {
                let birthday = ctx
                    .store
                    .get(msg.community, msg.author)
                    .map(|p| p.birthday.clone())
                    .unwrap_or_default();
                match (birthday.month, birthday.day) {
                    (Some(m), Some(d)) => {
                        ctx.say(
                            msg.channel,
                            format!("Your birthday on file is {:02}-{:02}.", m, d),
                        )
                        .await;
                    }
                    _ => {
                        ctx.say(
                            msg.channel,
                            format!(
                                "You have not set a birthday. Use {}birthday set MM-DD",
                                ctx.cfg.general.command_prefix
                            ),
                        )
                        .await;
                    }
                }
            }
            "remove" => {
                let profile = ctx.store.get_or_create(msg.community, msg.author);
                profile.birthday = Default::default();
                ctx.store.persist().await;
                ctx.say(msg.channel, "Removed your saved birthday.").await;
            }
            _ => {
                ctx.say(
                    msg.channel,
                    format!("Usage: {}birthday set MM-DD", ctx.cfg.general.command_prefix),
                )
                .await;
            }
        }

        Ok(EventHandled::Yes)
    }
}

fn parse_mm_dd(text: &str) -> Option<(u8, u8)> {
    let (m, d) = text.split_once('-')?;
    let month: u8 = m.parse().ok()?;
    let day: u8 = d.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((month, day))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_dates() {
        assert_eq!(parse_mm_dd("02-14"), Some((2, 14)));
        assert_eq!(parse_mm_dd("2-3"), Some((2, 3)));
        // Day 31 is accepted for any month, February included
        assert_eq!(parse_mm_dd("02-31"), Some((2, 31)));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(parse_mm_dd("13-01"), None);
        assert_eq!(parse_mm_dd("00-10"), None);
        assert_eq!(parse_mm_dd("05-32"), None);
        assert_eq!(parse_mm_dd("0514"), None);
        assert_eq!(parse_mm_dd("birthday"), None);
    }
}
