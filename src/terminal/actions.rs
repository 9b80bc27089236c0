//! Semantic action IDs for $CAP Terminal click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Miner ───────────────────────────────────────────────────────
pub const MINE: u16 = 0;

// ── Bottom navigation ───────────────────────────────────────────
pub const TAB_MINER: u16 = 10;
pub const TAB_WALLET: u16 = 11;
pub const TAB_SHOP: u16 = 12;

// ── Shop purchase (base + index into ShopItem::all()) ───────────
pub const BUY_ITEM_BASE: u16 = 100;
