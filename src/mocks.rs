//! Test doubles shared across unit tests.

use crate::ids::{ChannelId, CommunityId, MemberId};
use crate::platform::ChatPlatform;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Records outbound traffic instead of sending it anywhere; role adds can be
/// switched to fail to exercise the swallowed-error paths.
pub struct MockPlatform {
    messages: Mutex<Vec<(ChannelId, String)>>,
    granted: Mutex<Vec<(CommunityId, MemberId, String)>>,
    fail_roles: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
            granted: Mutex::new(Vec::new()),
            fail_roles: AtomicBool::new(false),
        })
    }

    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// All message text sent to one channel, concatenated for matching
    pub fn sent_to(&self, channel: ChannelId) -> String {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn granted(&self) -> Vec<(CommunityId, MemberId, String)> {
        self.granted.lock().unwrap().clone()
    }

    pub fn fail_role_adds(&self) {
        self.fail_roles.store(true, Ordering::SeqCst);
    }

    pub fn succeed_role_adds(&self) {
        self.fail_roles.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((channel, text.to_string()));
        Ok(())
    }

    async fn add_role(&self, community: CommunityId, member: MemberId, role: &str) -> Result<()> {
        if self.fail_roles.load(Ordering::SeqCst) {
            return Err(anyhow!("role \"{}\" not found", role));
        }
        self.granted
            .lock()
            .unwrap()
            .push((community, member, role.to_string()));
        Ok(())
    }

    async fn display_name(&self, _community: CommunityId, member: MemberId) -> String {
        format!("member-{}", member)
    }
}
