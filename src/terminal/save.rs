//! Wire formats for progress: the stored snapshot JSON shared by the cloud
//! and local stores, the bot's startup query parameters, and the sync
//! payload sent back to the bot on purchase.
//!
//! Everything read here is untrusted. Numbers are accepted loosely (JS may
//! have written floats or nulls) and clamped into the snapshot invariants.
//! Only a value that is not a JSON object at all is rejected.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::state::{Candidate, Snapshot, MAX_ENERGY};

/// Stored snapshot, written exactly as
/// `{"score","energy","scans","signals","lastEnergyUpdate"}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    score: u64,
    energy: u32,
    scans: u32,
    signals: u32,
    last_energy_update: u64,
}

/// Stored snapshot as read back. Every field is optional so a record
/// written by an older client (or edited by hand) still loads.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LooseRecord {
    score: Option<f64>,
    energy: Option<f64>,
    scans: Option<f64>,
    signals: Option<f64>,
    last_energy_update: Option<f64>,
}

/// Outbound message that hands the new totals to the bot.
#[derive(Serialize, Debug, PartialEq)]
pub struct SyncPayload {
    pub action: &'static str,
    pub score: u64,
    pub energy: u32,
    pub scans: u32,
    pub signals: u32,
}

impl SyncPayload {
    pub fn from_snapshot(s: &Snapshot) -> Self {
        Self {
            action: "sync",
            score: s.score,
            energy: s.energy,
            scans: s.scans,
            signals: s.signals,
        }
    }
}

pub fn encode_snapshot(s: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SnapshotRecord {
        score: s.score,
        energy: s.energy,
        scans: s.scans,
        signals: s.signals,
        last_energy_update: s.last_energy_update,
    })
}

pub fn encode_sync(s: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SyncPayload::from_snapshot(s))
}

/// Parse a stored snapshot into a candidate.
///
/// Missing counters default to 0, missing energy to 0 and a missing or
/// non-positive timestamp to `None`.
pub fn decode_candidate(json: &str) -> Result<Candidate, serde_json::Error> {
    let rec: LooseRecord = serde_json::from_str(json)?;
    Ok(Candidate {
        score: to_count(rec.score.unwrap_or(0.0)),
        energy: clamp_energy(rec.energy.unwrap_or(0.0)),
        scans: to_item_count(rec.scans.unwrap_or(0.0)),
        signals: to_item_count(rec.signals.unwrap_or(0.0)),
        last_energy_update: rec.last_energy_update.map(to_count).filter(|&t| t > 0),
    })
}

/// Floor a JS number into a non-negative integer. NaN and negatives become 0.
fn to_count(n: f64) -> u64 {
    if n.is_finite() && n > 0.0 {
        n.floor().min(u64::MAX as f64) as u64
    } else {
        0
    }
}

fn to_item_count(n: f64) -> u32 {
    to_count(n).min(u32::MAX as u64) as u32
}

fn clamp_energy(n: f64) -> u32 {
    to_count(n).min(MAX_ENERGY as u64) as u32
}

/// Build the bot candidate from the page's query string (`?score=..&energy=..`).
///
/// Keys and values are percent-decoded first. The bot supplied data iff
/// `score` is present and numeric; otherwise `None`. Missing `energy` means
/// a full bar, missing counters mean 0.
pub fn parse_bot_candidate(query: &str) -> Option<Candidate> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut score = None;
    let mut energy = None;
    let mut scans = None;
    let mut signals = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        // First occurrence wins, like URLSearchParams.get().
        let slot = match key.as_ref() {
            "score" => &mut score,
            "energy" => &mut energy,
            "scans" => &mut scans,
            "signals" => &mut signals,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(parse_int_param(&value));
        }
    }

    let score = score.flatten()?;
    let count = |v: Option<Option<i64>>| v.flatten().unwrap_or(0).max(0) as u64;
    Some(Candidate {
        score: score.max(0) as u64,
        energy: energy
            .flatten()
            .map(|e| e.clamp(0, MAX_ENERGY as i64) as u32)
            .unwrap_or(MAX_ENERGY),
        scans: count(scans).min(u32::MAX as u64) as u32,
        signals: count(signals).min(u32::MAX as u64) as u32,
        last_energy_update: None,
    })
}

/// Leading-integer parse: optional sign then digits, trailing junk ignored
/// (`"12.7"` → 12, `"42abc"` → 42). No digits at all → `None`.
fn parse_int_param(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
