/// $CAP Terminal game state definitions.

/// Energy ceiling. Regeneration never pushes past it.
pub const MAX_ENERGY: u32 = 1000;

/// Energy regenerated per whole elapsed second.
pub const REGEN_PER_SECOND: u32 = 3;

/// Energy spent by one tap on the reactor.
pub const MINE_ENERGY_COST: u32 = 10;

/// $CAP earned by one tap on the reactor.
pub const MINE_REWARD: u64 = 5;

/// The complete progress record: the only thing that is persisted or sent
/// to the bot.
///
/// `last_energy_update` is the epoch-ms instant at which `energy` was last
/// authoritative; regeneration is always measured from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub score: u64,
    pub energy: u32,
    pub scans: u32,
    pub signals: u32,
    pub last_energy_update: u64,
}

impl Snapshot {
    /// A brand-new player: nothing earned, full energy.
    pub fn fresh(now: u64) -> Self {
        Self {
            score: 0,
            energy: MAX_ENERGY,
            scans: 0,
            signals: 0,
            last_energy_update: now,
        }
    }

    pub fn can_mine(&self) -> bool {
        self.energy >= MINE_ENERGY_COST
    }

    pub fn can_afford(&self, cost: u64) -> bool {
        self.score >= cost
    }

    pub fn energy_full(&self) -> bool {
        self.energy >= MAX_ENERGY
    }

    /// Energy as a 0..=100 percentage for gauges.
    pub fn energy_percent(&self) -> u16 {
        (self.energy.min(MAX_ENERGY) as u64 * 100 / MAX_ENERGY as u64) as u16
    }

    /// Number of items owned of the given kind.
    pub fn owned(&self, item: ShopItem) -> u32 {
        match item {
            ShopItem::Signal => self.signals,
            ShopItem::Scanner => self.scans,
        }
    }
}

/// One untrusted, possibly partial progress record considered at startup.
///
/// Values are already clamped into the snapshot invariants; only the
/// timestamp may be missing (the bot channel never carries one).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub score: u64,
    pub energy: u32,
    pub scans: u32,
    pub signals: u32,
    pub last_energy_update: Option<u64>,
}

/// Purchasable item classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopItem {
    Signal,
    Scanner,
}

impl ShopItem {
    /// All shop items in display order.
    pub fn all() -> &'static [ShopItem] {
        &[ShopItem::Signal, ShopItem::Scanner]
    }

    pub fn name(&self) -> &str {
        match self {
            ShopItem::Signal => "Single Signal",
            ShopItem::Scanner => "AI Scanner",
        }
    }

    /// Price in $CAP.
    pub fn cost(&self) -> u64 {
        match self {
            ShopItem::Signal => 1_000,
            ShopItem::Scanner => 2_500,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ShopItem::Signal => "Single coin analysis.",
            ShopItem::Scanner => "4H market scan.",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            ShopItem::Signal => "Unlocks one full trade signal with entry, TP and SL.",
            ShopItem::Scanner => "Scans 50+ pairs for the best 4H setups.",
        }
    }

    /// Key to buy from the shop tab.
    pub fn key(&self) -> char {
        match self {
            ShopItem::Signal => 's',
            ShopItem::Scanner => 'a',
        }
    }

    /// Identifier used by the bot protocol.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ShopItem::Signal => "signal",
            ShopItem::Scanner => "scanner",
        }
    }
}

/// Screens reachable from the bottom navigation bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Miner,
    Wallet,
    Shop,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Miner, Tab::Wallet, Tab::Shop]
    }

    pub fn key(&self) -> char {
        match self {
            Tab::Miner => '1',
            Tab::Wallet => '2',
            Tab::Shop => '3',
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tab::Miner => "MINE",
            Tab::Wallet => "WALLET",
            Tab::Shop => "SHOP",
        }
    }
}
