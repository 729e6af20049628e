mod config;
mod context;
mod event;
mod handler;
mod ids;
mod logging;
mod menu;
#[cfg(test)]
mod mocks;
mod platform;
mod plugin;
mod profile;
mod rewards;
mod session;

use crate::config::Config;
use crate::context::TimerHandle;
use crate::event::{ButtonEvent, Event, MessageEvent};
use crate::handler::Handler;
use crate::ids::{ChannelId, CommunityId, MemberId};
use crate::platform::{ChatPlatform, ConsolePlatform};
use crate::profile::ProfileStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load_or_default().await?;
    let store = ProfileStore::load().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let platform: Arc<dyn ChatPlatform> = Arc::new(ConsolePlatform);
    let mut handler = Handler::new(cfg, store, platform, TimerHandle::new(tx.clone()));

    spawn_flush_ticker(tx.clone(), handler.cfg().storage.flush_interval_seconds);

    let home = CommunityId(handler.cfg().general.home_community_id);
    tokio::spawn(read_console(tx, home));

    handler.dispatch(Event::Ready).await;
    log_internal!("Console session: say <ch> <member> <text> | bot <ch> <member> <text> | press <ch> <member> <button> | join <member> | quit");

    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(Event::Shutdown) | None => break,
                Some(event) => handler.dispatch(event).await,
            },
            _ = shutdown_signal() => break,
        }
    }

    log_internal!("Shutting down, persisting profiles");
    handler.shutdown().await;
    Ok(())
}

fn spawn_flush_ticker(tx: UnboundedSender<Event>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        // The first tick completes immediately; skip it
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(Event::FlushTick).is_err() {
                break;
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

/// Line protocol standing in for the platform gateway during development:
///
/// ```text
/// say 1 42 !game snack      message from member 42 in channel 1
/// bot 2 7 member-5 reached level 4 <@5>
/// press 1 42 trivia:B       button press
/// join 42                   member-join event
/// quit
/// ```
///
/// Tokens of the form `<@123>` become mentions, like the real platform's
/// markup.
async fn read_console(tx: UnboundedSender<Event>, community: CommunityId) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            let _ = tx.send(Event::Shutdown);
            return;
        }

        match parse_console_line(line, community) {
            Some(event) => {
                if tx.send(event).is_err() {
                    return;
                }
            }
            None => log_internal!("Unrecognized console input: {}", line),
        }
    }
}

fn parse_console_line(line: &str, community: CommunityId) -> Option<Event> {
    let mut terms = line.split_whitespace();
    let verb = terms.next()?;

    match verb {
        "say" | "bot" => {
            let channel = ChannelId(terms.next()?.parse().ok()?);
            let author = MemberId(terms.next()?.parse().ok()?);
            let rest: Vec<&str> = terms.collect();
            if rest.is_empty() {
                return None;
            }
            let content = rest.join(" ");
            Some(Event::Message(MessageEvent {
                community,
                channel,
                author,
                author_name: format!("member-{}", author),
                author_is_bot: verb == "bot",
                mentions: parse_mentions(&content),
                content,
            }))
        }
        "press" => {
            let channel = ChannelId(terms.next()?.parse().ok()?);
            let member = MemberId(terms.next()?.parse().ok()?);
            let id = terms.next()?.to_string();
            Some(Event::ButtonPress(ButtonEvent {
                community,
                channel,
                member,
                member_name: format!("member-{}", member),
                id,
            }))
        }
        "join" => {
            let member = MemberId(terms.next()?.parse().ok()?);
            Some(Event::MemberJoin {
                community,
                member,
                name: format!("member-{}", member),
            })
        }
        _ => None,
    }
}

/// Pull `<@123>` mention markup out of a message.
fn parse_mentions(content: &str) -> Vec<MemberId> {
    content
        .split_whitespace()
        .filter_map(|token| {
            let id = token.strip_prefix("<@")?.strip_suffix('>')?;
            id.parse().ok().map(MemberId)
        })
        .collect()
}
