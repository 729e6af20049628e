//! Collection of data that is shared across events

use crate::config::Config;
use crate::event::Event;
use crate::ids::{ChannelId, CommunityId, MemberId};
use crate::log_internal;
use crate::platform::ChatPlatform;
use crate::profile::ProfileStore;
use crate::session::SessionRegistry;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Schedules events to be re-injected into the dispatch queue after a delay.
/// Round deadlines and hints go through here; the timers are never
/// cancelled, a late firing simply finds its round already gone.
#[derive(Clone)]
pub struct TimerHandle {
    tx: UnboundedSender<Event>,
}

impl TimerHandle {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    pub fn schedule(&self, delay: Duration, event: Event) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means we are shutting down
            let _ = tx.send(event);
        });
    }
}

pub struct Context<'a> {
    pub cfg: &'a Config,
    pub store: &'a mut ProfileStore,
    pub sessions: &'a mut SessionRegistry,
    pub platform: &'a Arc<dyn ChatPlatform>,
    pub timers: &'a TimerHandle,
    /// Owned by the dispatcher so tests can seed it
    pub rng: &'a mut StdRng,
}

impl Context<'_> {
    /// Post a message, swallowing platform failures.  Replies are
    /// best-effort everywhere in this bot; a failed send is logged and life
    /// goes on.
    pub async fn say(&self, channel: ChannelId, text: impl AsRef<str>) {
        if let Err(e) = self.platform.send(channel, text.as_ref()).await {
            log_internal!("Could not send message to channel {}: {}", channel, e);
        }
    }

    /// Post to the level-announcements channel, if one is configured.
    pub async fn announce(&self, text: impl AsRef<str>) {
        if let Some(channel) = self.cfg.channels.level_announcements {
            self.say(ChannelId(channel), text).await;
        }
    }

    pub async fn display_name(&self, community: CommunityId, member: MemberId) -> String {
        self.platform.display_name(community, member).await
    }
}
