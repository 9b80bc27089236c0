//! $CAP Terminal: a tap-to-mine idle game that syncs with a Telegram bot.

pub mod actions;
pub mod reconcile;
pub mod regen;
pub mod render;
pub mod save;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use session::{Checkout, PersistJob, Session};
use state::{ShopItem, Tab};

/// How long the reactor stays lit after a tap (ms).
const MINE_FLASH_MS: u64 = 100;

/// Top-level app: a loading screen until startup reconciliation resolves,
/// then the live session.
pub struct TerminalApp {
    session: Option<Session>,
    pub tab: Tab,
    /// Wall-clock ms until which the reactor is drawn pressed.
    pub mine_flash_until: u64,
    /// Timestamp of the latest frame.
    pub now: u64,
}

impl TerminalApp {
    pub fn new() -> Self {
        Self {
            session: None,
            tab: Tab::Miner,
            mine_flash_until: 0,
            now: 0,
        }
    }

    /// Hand over the reconciled session. Periodic work starts from here.
    pub fn start(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_none()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Dispatch one input event. Returns the checkout to spawn when the
    /// event completed a purchase.
    pub fn handle_input(&mut self, event: &InputEvent, now: u64) -> Option<Checkout> {
        let session = self.session.as_mut()?;

        let key = match event {
            InputEvent::Click(id) => match *id {
                actions::MINE => 'm',
                actions::TAB_MINER => Tab::Miner.key(),
                actions::TAB_WALLET => Tab::Wallet.key(),
                actions::TAB_SHOP => Tab::Shop.key(),
                id if id >= actions::BUY_ITEM_BASE => {
                    let item = ShopItem::all().get((id - actions::BUY_ITEM_BASE) as usize)?;
                    self.tab = Tab::Shop;
                    item.key()
                }
                _ => return None,
            },
            InputEvent::Key(c) => *c,
        };

        if let Some(tab) = Tab::all().iter().find(|t| t.key() == key) {
            self.tab = *tab;
            return None;
        }

        match key {
            'm' | ' ' if self.tab == Tab::Miner => {
                if session.snapshot().can_mine() {
                    session.mine(now);
                    self.mine_flash_until = now + MINE_FLASH_MS;
                }
                None
            }
            _ if self.tab == Tab::Shop => {
                let item = ShopItem::all().iter().find(|i| i.key() == key)?;
                session.purchase(*item, item.cost(), now)
            }
            _ => None,
        }
    }

    /// Per-frame update. Returns an autosave to spawn when one is due.
    pub fn update(&mut self, now: u64) -> Option<PersistJob> {
        self.now = now;
        self.session.as_mut()?.update(now)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
