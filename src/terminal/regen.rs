//! Energy regeneration from elapsed wall-clock time.
//!
//! One rule serves both the offline catch-up at startup and the live
//! once-a-second tick: whole seconds only, three energy per second,
//! capped at [`MAX_ENERGY`].

use super::state::{Snapshot, MAX_ENERGY, REGEN_PER_SECOND};

/// Returns `(new_energy, new_last_update)`.
///
/// A non-positive gap (clock skew, same instant) credits nothing but still
/// moves the baseline to `now`. Fractional seconds are dropped.
pub fn regenerate(base_energy: u32, last_update: u64, now: u64) -> (u32, u64) {
    if now <= last_update {
        return (base_energy, now);
    }
    let secs = (now - last_update) / 1000;
    let gained = secs.saturating_mul(REGEN_PER_SECOND as u64);
    let energy = (base_energy as u64)
        .saturating_add(gained)
        .min(MAX_ENERGY as u64) as u32;
    (energy, now)
}

/// Apply [`regenerate`] to a whole snapshot, leaving the counters untouched.
pub fn regenerated(snapshot: Snapshot, now: u64) -> Snapshot {
    let (energy, last_energy_update) =
        regenerate(snapshot.energy, snapshot.last_energy_update, now);
    Snapshot {
        energy,
        last_energy_update,
        ..snapshot
    }
}
