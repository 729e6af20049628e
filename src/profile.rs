//! Per-member profiles and the flat-file store backing them.
//!
//! The whole store is one JSON document, `community id -> member id ->
//! profile`.  It is loaded once at startup, mutated in place by event
//! handlers, and rewritten wholesale on a flush tick, after reward grants,
//! and at shutdown.

use crate::ids::{CommunityId, MemberId};
use crate::log_internal;
use crate::session::Game;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const STORE_PATH_REL_HOME: &str = ".config/brewbot/profiles.json";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// How many chat exchanges a member's conversation memory retains.
const MEMORY_CAP: usize = 10;

/// Integer count of day-units since the epoch, shifted by the configured
/// daily-reset offset.  Streak continuation is decided on this index alone,
/// independent of time-of-day.
pub fn day_index(unix_ms: i64, utc_offset_minutes: i32) -> i64 {
    (unix_ms + i64::from(utc_offset_minutes) * 60_000).div_euclid(DAY_MS)
}

pub fn unix_ms_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Per-game counters plus a running total.  The total is maintained by
/// construction: the only mutation path is [`Tallies::add`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tallies {
    pub total: u64,
    pub snack: u64,
    pub cider: u64,
    pub trivia: u64,
    pub jumble: u64,
    pub heist: u64,
}

impl Tallies {
    pub fn get(&self, game: Game) -> u64 {
        match game {
            Game::Snack => self.snack,
            Game::Cider => self.cider,
            Game::Trivia => self.trivia,
            Game::Jumble => self.jumble,
            Game::Heist => self.heist,
        }
    }

    pub fn add(&mut self, game: Game, amount: u64) {
        let slot = match game {
            Game::Snack => &mut self.snack,
            Game::Cider => &mut self.cider,
            Game::Trivia => &mut self.trivia,
            Game::Jumble => &mut self.jumble,
            Game::Heist => &mut self.heist,
        };
        *slot += amount;
        self.total += amount;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Birthday {
    pub month: Option<u8>,
    pub day: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub role: MemoryRole,
    pub content: String,
}

/// Everything the bot remembers about one member of one community.  All
/// fields are defaulted so documents written before a field existed still
/// parse.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Set by admin commands or inferred from the external leveling bot.
    /// There is no XP accumulation here.
    pub level: u64,
    pub streak_count: u64,
    /// Menu item key the member claims each day
    pub streak_item: Option<String>,
    /// Day-index of the last effective claim; strictly increases
    pub last_claim_day: Option<i64>,
    /// Wall clock of the last effective claim, display only
    pub last_claim_ms: i64,
    pub wins: Tallies,
    pub points: Tallies,
    pub birthday: Birthday,
    pub memory: Vec<MemoryEntry>,
}

/// Outcome of a daily claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Second claim on the same day-index; nothing changed
    AlreadyClaimed,
    /// Claimed exactly one day after the previous claim
    Continued { prev: u64, now: u64 },
    /// First claim ever, or the gap exceeded one day
    Started,
}

impl Profile {
    /// Apply one daily claim at the given day-index.
    ///
    /// Same day: no-op.  Gap of exactly one: streak continues.  Anything
    /// else (first claim, or a missed day): streak restarts at 1.
    pub fn claim_daily(&mut self, today: i64, now_ms: i64) -> ClaimOutcome {
        if self.last_claim_day == Some(today) {
            return ClaimOutcome::AlreadyClaimed;
        }

        let outcome = match self.last_claim_day {
            Some(last) if today - last == 1 => {
                let prev = self.streak_count;
                self.streak_count += 1;
                ClaimOutcome::Continued {
                    prev,
                    now: self.streak_count,
                }
            }
            _ => {
                self.streak_count = 1;
                ClaimOutcome::Started
            }
        };

        self.last_claim_day = Some(today);
        self.last_claim_ms = now_ms;
        outcome
    }

    /// Append a conversation entry, dropping the oldest beyond the cap.
    pub fn remember(&mut self, role: MemoryRole, content: String) {
        self.memory.push(MemoryEntry { role, content });
        while self.memory.len() > MEMORY_CAP {
            self.memory.remove(0);
        }
    }
}

/// State which persists across sessions
#[derive(Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    communities: HashMap<CommunityId, HashMap<MemberId, Profile>>,
    /// File this store was loaded from and flushes back to.  `None` (no
    /// home directory, or a store built in tests) keeps the store purely
    /// in-memory.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(STORE_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    /// Never fails and never returns nothing: an unseen (community, member)
    /// pair gets a zeroed profile on first reference.
    pub fn get_or_create(&mut self, community: CommunityId, member: MemberId) -> &mut Profile {
        self.communities
            .entry(community)
            .or_default()
            .entry(member)
            .or_default()
    }

    pub fn get(&self, community: CommunityId, member: MemberId) -> Option<&Profile> {
        self.communities.get(&community)?.get(&member)
    }

    pub fn community(&self, community: CommunityId) -> Option<&HashMap<MemberId, Profile>> {
        self.communities.get(&community)
    }

    /// Load the store from its default location; a missing or unparsable
    /// file starts an empty store.
    pub async fn load() -> Self {
        match Self::store_path() {
            Ok(path) => Self::load_from(&path).await,
            Err(e) => {
                log_internal!("Profile store unavailable ({}), starting empty", e);
                Self::new()
            }
        }
    }

    pub async fn load_from(path: &std::path::Path) -> Self {
        let mut store = Self::read_document(path).await;
        store.path = Some(path.to_path_buf());
        store
    }

    async fn read_document(path: &std::path::Path) -> Self {
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(e) => {
                log_internal!(
                    "Could not read profile store at `{}`: {}, starting empty",
                    path.to_string_lossy(),
                    e
                );
                return Self::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(store) => store,
            Err(e) => {
                log_internal!(
                    "Could not parse profile store at `{}`: {}, starting empty",
                    path.to_string_lossy(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Serialize the whole store back to the file it was loaded from.
    /// Storage failures are logged and swallowed; the in-memory store keeps
    /// operating.
    pub async fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.persist_to(path).await {
            log_internal!("Profile store not persisted: {}", e);
        }
    }

    pub async fn persist_to(&self, path: &std::path::Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| anyhow!("Could not serialize profile store: {}", e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow!(
                    "Could not create directory `{}`: {}",
                    parent.to_string_lossy(),
                    e
                )
            })?;
        }

        // Write to a temporary file in the same directory, then atomically
        // rename over the target so a crash mid-write never truncates the
        // previous document.
        let tmp_path = path.with_extension("json.new");

        tokio::fs::write(&tmp_path, serialized).await.map_err(|e| {
            anyhow!(
                "Could not write profile store to `{}`: {}",
                tmp_path.to_string_lossy(),
                e
            )
        })?;

        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            anyhow!(
                "Could not rename `{}` to `{}`: {}",
                tmp_path.to_string_lossy(),
                path.to_string_lossy(),
                e
            )
        })?;

        Ok(())
    }
}
