//! Startup reconciliation: pick one authoritative snapshot out of the bot's
//! query parameters, the cloud store and the local store, then credit the
//! energy regenerated while the app was closed.
//!
//! Policy (score dominance):
//!
//! 1. Stored candidate = cloud, or local only if cloud yielded nothing.
//! 2. No stored candidate → bot candidate, or a fresh full-energy snapshot.
//! 3. Stored candidate and no bot candidate, or a bot score of 0 → stored.
//!    A bot that never heard about offline progress reports 0 and must not
//!    wipe it.
//! 4. Both present → stored wins if `stored.score >= bot.score`, otherwise
//!    the bot wins in full (cross-device purchase or sync).
//!
//! The winner is regenerated from its own timestamp (bot: none, so "now")
//! and stamped with "now".

use log::{debug, info, warn};

use crate::platform::{with_timeout, Platform, SnapshotStore};

use super::regen::regenerate;
use super::save::{decode_candidate, parse_bot_candidate};
use super::session::SessionConfig;
use super::state::{Candidate, Snapshot};

/// Where the authoritative snapshot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Bot,
    Cloud,
    Local,
    Fresh,
}

/// The startup inputs. `local` is only consulted when `cloud` is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Candidates {
    pub bot: Option<Candidate>,
    pub cloud: Option<Candidate>,
    pub local: Option<Candidate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub snapshot: Snapshot,
    pub source: Source,
}

/// Pure decision step. Never fails.
pub fn reconcile(candidates: &Candidates, now: u64) -> Reconciled {
    let stored = match (candidates.cloud, candidates.local) {
        (Some(c), _) => Some((c, Source::Cloud)),
        (None, Some(l)) => Some((l, Source::Local)),
        (None, None) => None,
    };

    let (winner, source) = match (stored, candidates.bot) {
        (None, Some(bot)) => (Some(bot), Source::Bot),
        (None, None) => (None, Source::Fresh),
        (Some((s, src)), None) => (Some(s), src),
        (Some((s, src)), Some(bot)) if bot.score == 0 => (Some(s), src),
        (Some((s, src)), Some(bot)) if s.score >= bot.score => (Some(s), src),
        (Some(_), Some(bot)) => (Some(bot), Source::Bot),
    };

    let snapshot = match winner {
        Some(c) => {
            let baseline = match source {
                Source::Bot => now,
                _ => c.last_energy_update.unwrap_or(now),
            };
            let (energy, _) = regenerate(c.energy, baseline, now);
            Snapshot {
                score: c.score,
                energy,
                scans: c.scans,
                signals: c.signals,
                last_energy_update: now,
            }
        }
        None => Snapshot::fresh(now),
    };

    Reconciled { snapshot, source }
}

/// Read one store's candidate. Every failure means "no candidate".
async fn read_candidate(
    platform: &Platform,
    store: &dyn SnapshotStore,
    key: &str,
    timeout_ms: u64,
) -> Option<Candidate> {
    let load = store.load(vec![key.to_string()]);
    let values = match with_timeout(platform.clock.as_ref(), timeout_ms, load).await {
        Ok(values) => values,
        Err(e) => {
            warn!("{} store read failed: {e}", store.name());
            return None;
        }
    };
    let raw = values.get(key).filter(|v| !v.is_empty())?;
    match decode_candidate(raw) {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("{} store holds an unreadable snapshot, ignoring it: {e}", store.name());
            None
        }
    }
}

/// Gather candidates with the cloud→local strict fallback.
pub async fn load_candidates(platform: &Platform, config: &SessionConfig, query: &str) -> Candidates {
    let bot = parse_bot_candidate(query);
    let cloud = read_candidate(
        platform,
        platform.cloud.as_ref(),
        &config.storage_key,
        config.cloud_timeout_ms,
    )
    .await;
    let local = match cloud {
        Some(_) => None,
        None => {
            read_candidate(
                platform,
                platform.local.as_ref(),
                &config.storage_key,
                config.cloud_timeout_ms,
            )
            .await
        }
    };
    debug!(
        "candidates: bot={} cloud={} local={}",
        bot.is_some(),
        cloud.is_some(),
        local.is_some()
    );
    Candidates { bot, cloud, local }
}

/// Run the whole startup sequence and return the snapshot that seeds the
/// session. Always terminates with a valid snapshot.
///
/// The host bridge is signalled ready before any store is read. Offline
/// regeneration is measured against the clock once loading has finished.
pub async fn bootstrap(platform: &Platform, config: &SessionConfig, query: &str) -> Reconciled {
    platform.host.ready();
    let candidates = load_candidates(platform, config, query).await;
    let now = platform.clock.now_ms();
    let reconciled = reconcile(&candidates, now);
    match reconciled.source {
        Source::Fresh => info!("no saved progress found, starting fresh"),
        Source::Bot if candidates.cloud.is_some() || candidates.local.is_some() => {
            info!("bot data is ahead of stored progress, taking bot data")
        }
        source => info!("restored progress from {source:?}"),
    }
    reconciled
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_candidate() -> impl Strategy<Value = Candidate> {
        (0u64..1_000_000, 0u32..=1000, 0u32..100, 0u32..100, proptest::option::of(0u64..2_000_000))
            .prop_map(|(score, energy, scans, signals, last)| Candidate {
                score,
                energy,
                scans,
                signals,
                last_energy_update: last,
            })
    }

    proptest! {
        #[test]
        fn prop_stored_score_never_regresses(
            stored in arb_candidate(),
            bot in proptest::option::of(arb_candidate()),
            use_cloud in any::<bool>(),
        ) {
            let now = 2_000_000;
            let c = Candidates {
                bot,
                cloud: if use_cloud { Some(stored) } else { None },
                local: if use_cloud { None } else { Some(stored) },
            };
            let r = reconcile(&c, now);
            prop_assert!(r.snapshot.score >= stored.score);
        }

        #[test]
        fn prop_result_respects_invariants(
            bot in proptest::option::of(arb_candidate()),
            cloud in proptest::option::of(arb_candidate()),
            local in proptest::option::of(arb_candidate()),
            now in 0u64..3_000_000,
        ) {
            let r = reconcile(&Candidates { bot, cloud, local }, now);
            prop_assert!(r.snapshot.energy <= crate::terminal::state::MAX_ENERGY);
            prop_assert_eq!(r.snapshot.last_energy_update, now);
        }
    }
}
