//! Event dispatch.
//!
//! One `Handler` owns all mutable bot state and consumes events from a
//! single queue, handling each to completion before the next.  Timer
//! callbacks re-enter through the same queue, so nothing here needs a lock:
//! a round's check-then-resolve happens inside one event turn.

use crate::config::Config;
use crate::context::{Context, TimerHandle};
use crate::event::{Event, EventHandled};
use crate::log_internal;
use crate::platform::ChatPlatform;
use crate::profile::ProfileStore;
use crate::session::SessionRegistry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub struct Handler {
    cfg: Config,
    store: ProfileStore,
    sessions: SessionRegistry,
    platform: Arc<dyn ChatPlatform>,
    timers: TimerHandle,
    rng: StdRng,
}

impl Handler {
    pub fn new(
        cfg: Config,
        store: ProfileStore,
        platform: Arc<dyn ChatPlatform>,
        timers: TimerHandle,
    ) -> Self {
        Self::with_rng(cfg, store, platform, timers, StdRng::from_entropy())
    }

    /// Tests seed the generator to make shuffles and the heist draw
    /// reproducible.
    pub fn with_rng(
        cfg: Config,
        store: ProfileStore,
        platform: Arc<dyn ChatPlatform>,
        timers: TimerHandle,
        rng: StdRng,
    ) -> Self {
        Self {
            cfg,
            store,
            sessions: SessionRegistry::new(),
            platform,
            timers,
            rng,
        }
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    #[cfg(test)]
    pub(crate) fn sessions_mut(&mut self) -> &mut SessionRegistry {
        &mut self.sessions
    }

    /// Offer the event to each plugin in order until one claims it.  Plugin
    /// errors are logged and the loop moves on; a long-lived bot does not
    /// die because one handler hiccuped.
    pub async fn dispatch(&mut self, event: Event) {
        if let Event::FlushTick = event {
            self.store.persist().await;
            return;
        }

        let mut ctx = Context {
            cfg: &self.cfg,
            store: &mut self.store,
            sessions: &mut self.sessions,
            platform: &self.platform,
            timers: &self.timers,
            rng: &mut self.rng,
        };

        for plugin in crate::plugin::plugins() {
            match plugin.handle(&mut ctx, &event).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => log_internal!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    /// Final flush on the way out.
    pub async fn shutdown(&self) {
        self.store.persist().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::{ButtonEvent, MessageEvent};
    use crate::ids::{ChannelId, CommunityId, MemberId};
    use crate::mocks::MockPlatform;
    use crate::session::Game;
    use std::time::Duration;

    pub(crate) const COMMUNITY: CommunityId = CommunityId(100);
    pub(crate) const WELCOME_CHANNEL: ChannelId = ChannelId(900);
    pub(crate) const ANNOUNCE_CHANNEL: ChannelId = ChannelId(901);
    pub(crate) const ADMIN: u64 = 99;

    pub(crate) fn test_handler(seed: u64) -> (Handler, std::sync::Arc<MockPlatform>) {
        let mut cfg = Config::default();
        cfg.general.home_community_id = COMMUNITY.0;
        cfg.general.admins = vec![ADMIN];
        cfg.channels.welcome = Some(WELCOME_CHANNEL.0);
        cfg.channels.level_announcements = Some(ANNOUNCE_CHANNEL.0);

        let platform = MockPlatform::new();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let handler = Handler::with_rng(
            cfg,
            ProfileStore::new(),
            platform.clone(),
            TimerHandle::new(tx),
            StdRng::seed_from_u64(seed),
        );
        (handler, platform)
    }

    pub(crate) fn msg(channel: ChannelId, author: u64, content: &str) -> Event {
        msg_with_mentions(channel, author, content, &[])
    }

    pub(crate) fn msg_with_mentions(
        channel: ChannelId,
        author: u64,
        content: &str,
        mentions: &[u64],
    ) -> Event {
        Event::Message(MessageEvent {
            community: COMMUNITY,
            channel,
            author: MemberId(author),
            author_name: format!("member-{}", author),
            author_is_bot: false,
            content: content.to_string(),
            mentions: mentions.iter().copied().map(MemberId).collect(),
        })
    }

    pub(crate) fn press(channel: ChannelId, member: u64, id: &str) -> Event {
        Event::ButtonPress(ButtonEvent {
            community: COMMUNITY,
            channel,
            member: MemberId(member),
            member_name: format!("member-{}", member),
            id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn admin_level_set_grants_crossed_roles_and_announces() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(60);

        handler
            .dispatch(msg_with_mentions(ch, ADMIN, "!level set <@5> 3", &[5]))
            .await;

        assert_eq!(
            handler.store().get(COMMUNITY, MemberId(5)).unwrap().level,
            3
        );
        assert!(platform
            .sent_to(ANNOUNCE_CHANNEL)
            .contains("has reached level 3!"));

        // Role grants run detached; give them a beat to land
        tokio::time::sleep(Duration::from_millis(50)).await;
        let roles: Vec<String> = platform.granted().into_iter().map(|(_, _, r)| r).collect();
        assert_eq!(roles, vec!["Member".to_string(), "New Patron".to_string()]);
    }

    #[tokio::test]
    async fn non_admin_cannot_set_levels() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(61);

        handler
            .dispatch(msg_with_mentions(ch, 5, "!level set <@5> 50", &[5]))
            .await;

        assert!(platform.sent_to(ch).contains("Administrator only."));
        assert!(handler.store().get(COMMUNITY, MemberId(5)).is_none());
    }

    #[tokio::test]
    async fn leveling_bot_announcements_are_adopted() {
        let (mut handler, _platform) = test_handler(1);

        let mut event = msg_with_mentions(ANNOUNCE_CHANNEL, 7, "member-5 reached Level 4!", &[5]);
        if let Event::Message(m) = &mut event {
            m.author_is_bot = true;
        }
        handler.dispatch(event).await;

        assert_eq!(
            handler.store().get(COMMUNITY, MemberId(5)).unwrap().level,
            4
        );
    }

    #[tokio::test]
    async fn daily_claim_starts_a_streak_and_repeats_are_no_ops() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(62);

        // No item chosen yet: prompted, nothing recorded
        handler.dispatch(msg(ch, 5, "!daily")).await;
        assert!(platform.sent_to(ch).contains("Pick your streak item"));

        handler.dispatch(msg(ch, 5, "!daily item:latte")).await;
        let p = handler.store().get(COMMUNITY, MemberId(5)).unwrap();
        assert_eq!(p.streak_count, 1);
        assert_eq!(p.streak_item.as_deref(), Some("latte"));

        // Same-day repeat changes nothing
        handler.dispatch(msg(ch, 5, "!daily")).await;
        let p = handler.store().get(COMMUNITY, MemberId(5)).unwrap();
        assert_eq!(p.streak_count, 1);
        assert!(platform.sent_to(ch).contains("already claimed"));
    }

    #[tokio::test]
    async fn unknown_daily_item_is_rejected() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(63);

        handler.dispatch(msg(ch, 5, "!daily item:gravel")).await;
        assert!(platform.sent_to(ch).contains("I don't serve `gravel`"));
        assert!(handler.store().get(COMMUNITY, MemberId(5)).is_none());
    }

    #[tokio::test]
    async fn admin_streak_set_grants_milestones() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(64);

        handler
            .dispatch(msg_with_mentions(ch, ADMIN, "!streak set <@5> 7", &[5]))
            .await;
        assert_eq!(
            handler
                .store()
                .get(COMMUNITY, MemberId(5))
                .unwrap()
                .streak_count,
            7
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        let roles: Vec<String> = platform.granted().into_iter().map(|(_, _, r)| r).collect();
        assert_eq!(
            roles,
            vec!["Dawn Drip".to_string(), "Weeklong Whisk".to_string()]
        );
    }

    #[tokio::test]
    async fn member_join_is_welcomed() {
        let (mut handler, platform) = test_handler(1);

        handler
            .dispatch(Event::MemberJoin {
                community: COMMUNITY,
                member: MemberId(5),
                name: "member-5".to_string(),
            })
            .await;

        assert!(platform
            .sent_to(WELCOME_CHANNEL)
            .contains("Welcome to the cafe, member-5!"));
    }

    #[tokio::test]
    async fn leaderboard_ranks_descending() {
        let (mut handler, platform) = test_handler(7);
        let ch = ChannelId(65);
        let answer = {
            use rand::seq::SliceRandom;
            let mut rng = StdRng::seed_from_u64(7);
            crate::plugin::snack::ROUNDS.choose(&mut rng).unwrap().0
        };

        // One snack win for member 2
        handler.dispatch(msg(ch, 1, "!game snack")).await;
        handler.dispatch(msg(ch, 2, answer)).await;

        handler.dispatch(msg(ch, 3, "!points leaderboard snack")).await;
        let transcript = platform.sent_to(ch);
        assert!(transcript.contains("🥇 member-2 - 10 points"));

        handler.dispatch(msg(ch, 3, "!points leaderboard cider")).await;
        assert!(platform
            .sent_to(ch)
            .contains("No one has played Cider Press yet!"));
    }

    #[tokio::test]
    async fn points_show_reports_totals_and_highest_role() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(66);

        handler.dispatch(msg(ch, 5, "!points show")).await;
        let transcript = platform.sent_to(ch);
        assert!(transcript.contains("0 total points"));
        assert!(transcript.contains("No roles yet"));
    }

    #[tokio::test]
    async fn chat_builds_capped_memory_and_clears() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(67);

        for i in 0..7 {
            handler
                .dispatch(msg(ch, 5, &format!("!chat hello number {}", i)))
                .await;
        }
        let p = handler.store().get(COMMUNITY, MemberId(5)).unwrap();
        // 7 exchanges = 14 entries, capped at 10
        assert_eq!(p.memory.len(), 10);

        handler.dispatch(msg(ch, 5, "!clearmemory")).await;
        let p = handler.store().get(COMMUNITY, MemberId(5)).unwrap();
        assert!(p.memory.is_empty());
        assert!(platform.sent_to(ch).contains("memory has been cleared"));
    }

    #[tokio::test]
    async fn serve_commands_deliver_to_the_mentioned_member() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(68);

        handler
            .dispatch(msg_with_mentions(ch, 5, "!latte <@6>", &[6]))
            .await;
        assert!(platform
            .sent_to(ch)
            .contains("A warm, creamy latte for member-6!"));
    }

    #[tokio::test]
    async fn help_lists_command_usages() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(69);

        handler.dispatch(msg(ch, 5, "!help")).await;
        let transcript = platform.sent_to(ch);
        assert!(transcript.contains("!daily item:<key>"));
        assert!(transcript.contains("!game snack"));
        assert!(transcript.contains("!birthday set MM-DD"));
    }

    #[tokio::test]
    async fn birthday_set_show_remove_round_trip() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(70);

        handler.dispatch(msg(ch, 5, "!birthday set 02-31")).await;
        let b = &handler
            .store()
            .get(COMMUNITY, MemberId(5))
            .unwrap()
            .birthday;
        assert_eq!((b.month, b.day), (Some(2), Some(31)));

        handler.dispatch(msg(ch, 5, "!birthday show")).await;
        assert!(platform.sent_to(ch).contains("02-31"));

        handler.dispatch(msg(ch, 5, "!birthday remove")).await;
        let b = &handler
            .store()
            .get(COMMUNITY, MemberId(5))
            .unwrap()
            .birthday;
        assert_eq!((b.month, b.day), (None, None));
    }

    #[tokio::test]
    async fn unprefixed_chatter_is_ignored() {
        let (mut handler, platform) = test_handler(1);
        let ch = ChannelId(71);

        handler.dispatch(msg(ch, 5, "just talking about my daily")).await;
        assert!(platform.sent_to(ch).is_empty());
        assert!(handler.store().get(COMMUNITY, MemberId(5)).is_none());
    }
}
