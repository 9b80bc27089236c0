//! The live session: sole owner of the current snapshot after startup.
//!
//! Every mutation reads the current snapshot and replaces it wholesale.
//! Entry points run to completion on the single UI thread, so there are no
//! lost updates as long as everything goes through one `Session`.
//!
//! Two periodic processes are driven by [`Session::update`]: the energy
//! regeneration tick and the persistence tick. Persistence and the purchase
//! hand-off to the bot are returned as self-contained futures ([`PersistJob`],
//! [`Checkout`]) that the caller spawns; they hold no borrow of the session.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::platform::{with_timeout, Clock, Host, Platform, PlatformError, PlatformResult, SnapshotStore};
use crate::time::Cadence;

use super::regen::regenerated;
use super::save::{encode_snapshot, encode_sync};
use super::state::{ShopItem, Snapshot, MINE_ENERGY_COST, MINE_REWARD};

/// Key shared by the cloud and local stores.
pub const STORAGE_KEY: &str = "TERMINAL_STATE";

/// Live regeneration cadence (ms).
pub const REGEN_INTERVAL_MS: u64 = 1000;

/// Autosave cadence (ms).
pub const SAVE_INTERVAL_MS: u64 = 2000;

/// Upper bound on a cloud round trip before falling back.
pub const CLOUD_TIMEOUT_MS: u64 = 4000;

/// Bridge version from which the cloud store exists.
pub const CLOUD_MIN_VERSION: &str = "6.9";

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub storage_key: String,
    pub regen_interval_ms: u64,
    pub save_interval_ms: u64,
    pub cloud_timeout_ms: u64,
    pub cloud_min_version: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            regen_interval_ms: REGEN_INTERVAL_MS,
            save_interval_ms: SAVE_INTERVAL_MS,
            cloud_timeout_ms: CLOUD_TIMEOUT_MS,
            cloud_min_version: CLOUD_MIN_VERSION.to_string(),
        }
    }
}

pub struct Session {
    snapshot: Snapshot,
    platform: Platform,
    config: SessionConfig,
    regen_cadence: Cadence,
    save_cadence: Cadence,
}

impl Session {
    pub fn new(initial: Snapshot, platform: Platform, config: SessionConfig) -> Self {
        Self {
            snapshot: initial,
            regen_cadence: Cadence::new(config.regen_interval_ms),
            save_cadence: Cadence::new(config.save_interval_ms),
            platform,
            config,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Mutation timestamps never run backwards within a session.
    fn stamp(&self, now: u64) -> u64 {
        now.max(self.snapshot.last_energy_update)
    }

    /// One regeneration step. No-op while the bar is full or less than a
    /// second has passed since the baseline, so calling it more often than
    /// once a second never double-credits.
    pub fn regen_tick(&mut self, now: u64) -> bool {
        let s = self.snapshot;
        if s.energy_full() {
            return false;
        }
        let now = self.stamp(now);
        if now - s.last_energy_update < 1000 {
            return false;
        }
        self.snapshot = regenerated(s, now);
        true
    }

    /// Tap the reactor: +5 $CAP for 10 energy. Silently ignored when the
    /// bar is below 10.
    pub fn mine(&mut self, now: u64) -> Snapshot {
        let s = self.snapshot;
        if !s.can_mine() {
            return s;
        }
        self.snapshot = Snapshot {
            score: s.score.saturating_add(MINE_REWARD),
            energy: s.energy - MINE_ENERGY_COST,
            last_energy_update: self.stamp(now),
            ..s
        };
        self.snapshot
    }

    /// Buy one `item` for `cost`. Returns `None` (and changes nothing) when
    /// the balance is short; otherwise the [`Checkout`] that saves the new
    /// snapshot and then hands it to the bot.
    pub fn purchase(&mut self, item: ShopItem, cost: u64, now: u64) -> Option<Checkout> {
        let s = self.snapshot;
        if !s.can_afford(cost) {
            debug!("cannot afford {} ({} < {cost})", item.wire_name(), s.score);
            return None;
        }
        let mut next = Snapshot {
            score: s.score - cost,
            last_energy_update: self.stamp(now),
            ..s
        };
        match item {
            ShopItem::Signal => next.signals = next.signals.saturating_add(1),
            ShopItem::Scanner => next.scans = next.scans.saturating_add(1),
        }
        self.snapshot = next;
        info!("purchased {} for {cost}", item.wire_name());

        Some(Checkout {
            snapshot: next,
            item,
            persist: self.persist(),
            host: self.platform.host.clone(),
            clock: self.platform.clock.clone(),
            timeout_ms: self.config.cloud_timeout_ms,
        })
    }

    /// Capture the current snapshot for writing to both stores.
    pub fn persist(&self) -> PersistJob {
        PersistJob {
            snapshot: self.snapshot,
            key: self.config.storage_key.clone(),
            cloud: self.platform.cloud.clone(),
            local: self.platform.local.clone(),
        }
    }

    /// Drive both periodic processes from the frame loop. Returns a save to
    /// spawn when the persistence tick is due.
    pub fn update(&mut self, now: u64) -> Option<PersistJob> {
        if self.regen_cadence.poll(now) {
            self.regen_tick(now);
        }
        if self.save_cadence.poll(now) {
            Some(self.persist())
        } else {
            None
        }
    }
}

/// Outcome of one write to both stores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub cloud: bool,
    pub local: bool,
}

/// A pending write of one snapshot to both stores.
pub struct PersistJob {
    pub snapshot: Snapshot,
    key: String,
    cloud: Rc<dyn SnapshotStore>,
    local: Rc<dyn SnapshotStore>,
}

impl PersistJob {
    /// Write to both stores concurrently. Failures are logged and dropped;
    /// the next autosave overwrites with whatever is current then.
    pub async fn run(self) -> PersistReport {
        let json = match encode_snapshot(&self.snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!("snapshot serialization failed: {e}");
                return PersistReport::default();
            }
        };
        let (cloud, local) = futures::join!(
            self.cloud.save(self.key.clone(), json.clone()),
            self.local.save(self.key.clone(), json),
        );
        PersistReport {
            cloud: written(self.cloud.as_ref(), cloud),
            local: written(self.local.as_ref(), local),
        }
    }
}

fn written(store: &dyn SnapshotStore, result: PlatformResult<bool>) -> bool {
    match result {
        Ok(true) => true,
        Ok(false) => {
            warn!("{} store declined the save", store.name());
            false
        }
        // Expected on old clients, every autosave.
        Err(PlatformError::Unsupported(_)) => false,
        Err(e) => {
            warn!("{} store save failed: {e}", store.name());
            false
        }
    }
}

/// A completed purchase waiting to be saved and handed to the bot.
pub struct Checkout {
    pub snapshot: Snapshot,
    pub item: ShopItem,
    persist: PersistJob,
    host: Rc<dyn Host>,
    clock: Rc<dyn Clock>,
    timeout_ms: u64,
}

impl Checkout {
    /// Save first (bounded), then notify the bot. The host closes the app
    /// once it has the payload, so nothing may follow the notification.
    pub async fn complete(self) -> PersistReport {
        let persist = self.persist;
        let report = match with_timeout(self.clock.as_ref(), self.timeout_ms, async {
            Ok::<_, PlatformError>(persist.run().await)
        })
        .await
        {
            Ok(report) => report,
            Err(e) => {
                warn!("purchase save did not finish: {e}");
                PersistReport::default()
            }
        };

        match encode_sync(&self.snapshot) {
            Ok(payload) => {
                info!("syncing {} purchase with the bot", self.item.wire_name());
                if let Err(e) = self.host.send_data(&payload) {
                    warn!("sending sync payload failed: {e}");
                }
            }
            Err(e) => warn!("sync payload serialization failed: {e}"),
        }
        report
    }
}
