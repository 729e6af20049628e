//! Everything the bot reacts to is funneled into one `Event` enum: inbound
//! platform traffic, timer callbacks (round deadlines, the jumble hint, the
//! periodic flush) and the shutdown signal.  A single consumer loop handles
//! each event to completion before taking the next, which is what lets round
//! and profile state live without locks.

use crate::context::Context;
use crate::ids::{ChannelId, CommunityId, MemberId};
use crate::session::Game;

#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub community: CommunityId,
    pub channel: ChannelId,
    pub author: MemberId,
    pub author_name: String,
    pub author_is_bot: bool,
    pub content: String,
    pub mentions: Vec<MemberId>,
}

#[derive(Debug, Clone)]
pub struct ButtonEvent {
    pub community: CommunityId,
    pub channel: ChannelId,
    pub member: MemberId,
    pub member_name: String,
    /// Component id, e.g. `trivia:B`, `cider`, `heist-join`
    pub id: String,
}

#[derive(Debug, Clone)]
pub enum Event {
    Ready,
    Message(MessageEvent),
    ButtonPress(ButtonEvent),
    MemberJoin {
        community: CommunityId,
        member: MemberId,
        name: String,
    },
    /// A round's deadline elapsed
    RoundTimeout { channel: ChannelId, game: Game },
    /// Mid-round hint timer (jumble)
    RoundHint { channel: ChannelId, game: Game },
    /// Periodic profile-store flush
    FlushTick,
    /// Graceful exit requested from the console
    Shutdown,
}

impl Event {
    /// Check if a message should be interpreted as a bot command.
    ///
    /// Commands are the configured prefix glued to the command name, e.g.
    /// `!daily item:latte`.  Returns the message and the argument tokens
    /// after the command word.  Messages from bots never match.
    pub fn bot_cmd<'a>(&'a self, ctx: &Context<'_>, cmd: &str) -> Option<(&'a MessageEvent, Vec<&'a str>)> {
        let Event::Message(msg) = self else {
            return None;
        };
        if msg.author_is_bot {
            return None;
        }

        let mut terms = msg.content.split_whitespace();
        let name = terms
            .next()?
            .strip_prefix(ctx.cfg.general.command_prefix.as_str())?;
        if name != cmd {
            return None;
        }

        Some((msg, terms.collect()))
    }
}

pub enum EventHandled {
    Yes,
    No,
}
