use crate::logging::{Glue, PrintColor};
use crate::{event::*, log_event, plugin::*};
use anyhow::Result;

/// Prints debug information about events to stdout
pub struct Debug;

#[async_trait]
impl Plugin for Debug {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, _ctx: &mut Context<'_>, event: &Event) -> Result<EventHandled> {
        match event {
            Event::Ready => {
                log_event!("Brewbot is open for business");
            }
            Event::Message(msg) => {
                log_event!(
                    "{}{}{}{}{} {}",
                    msg.community.color(),
                    Glue.color(),
                    msg.channel.color(),
                    Glue.color(),
                    msg.author_name.color(),
                    msg.content,
                );
            }
            Event::ButtonPress(press) => {
                log_event!(
                    "{}{}{} pressed \"{}\"",
                    press.channel.color(),
                    Glue.color(),
                    press.member_name.color(),
                    press.id,
                );
            }
            Event::MemberJoin {
                community, name, ..
            } => {
                log_event!("{} joined {}", name.color(), community.color());
            }
            Event::RoundTimeout { channel, game } => {
                log_event!("{} round deadline in {}", game.label(), channel.color());
            }
            // Quiet timers
            Event::RoundHint { .. } | Event::FlushTick | Event::Shutdown => {}
        }

        Ok(EventHandled::No)
    }
}
