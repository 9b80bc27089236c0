//! In-memory platform fakes with failure injection.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use super::{Clock, Host, PlatformError, PlatformResult, SnapshotStore};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Normal,
    /// Every call fails as if the backend were missing.
    Unsupported,
    /// Every call fails with a JS error.
    Failing,
    /// Every call never settles.
    Hanging,
}

pub struct MemoryStore {
    name: &'static str,
    pub entries: RefCell<HashMap<String, String>>,
    behavior: Cell<Behavior>,
    pub loads: Cell<u32>,
    pub saves: Cell<u32>,
}

impl MemoryStore {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RefCell::new(HashMap::new()),
            behavior: Cell::new(Behavior::Normal),
            loads: Cell::new(0),
            saves: Cell::new(0),
        }
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_behavior(self, behavior: Behavior) -> Self {
        self.behavior.set(behavior);
        self
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        self.behavior.set(behavior);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn failure<T: 'static>(&self) -> Option<LocalBoxFuture<'static, PlatformResult<T>>> {
        match self.behavior.get() {
            Behavior::Normal => None,
            Behavior::Unsupported => {
                Some(future::ready(Err(PlatformError::Unsupported(self.name))).boxed_local())
            }
            Behavior::Failing => Some(
                future::ready(Err(PlatformError::Js(format!("{} exploded", self.name))))
                    .boxed_local(),
            ),
            Behavior::Hanging => Some(future::pending().boxed_local()),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn name(&self) -> &'static str {
        self.name
    }

    fn load(&self, keys: Vec<String>) -> LocalBoxFuture<'_, PlatformResult<HashMap<String, String>>> {
        self.loads.set(self.loads.get() + 1);
        if let Some(f) = self.failure() {
            return f;
        }
        let entries = self.entries.borrow();
        let found: HashMap<String, String> = keys
            .into_iter()
            .filter_map(|k| entries.get(&k).map(|v| (k, v.clone())))
            .collect();
        future::ready(Ok(found)).boxed_local()
    }

    fn save(&self, key: String, value: String) -> LocalBoxFuture<'_, PlatformResult<bool>> {
        self.saves.set(self.saves.get() + 1);
        if let Some(f) = self.failure() {
            return f;
        }
        self.entries.borrow_mut().insert(key, value);
        future::ready(Ok(true)).boxed_local()
    }
}

/// Records every payload handed to the bot, along with what the watched
/// stores held at that moment.
#[derive(Default)]
pub struct RecordingHost {
    watched: Vec<Rc<MemoryStore>>,
    pub sent: RefCell<Vec<String>>,
    /// One entry per `send_data` call, one map per watched store.
    pub stored_at_send: RefCell<Vec<Vec<HashMap<String, String>>>>,
    pub readied: Cell<bool>,
}

impl RecordingHost {
    pub fn watching(stores: Vec<Rc<MemoryStore>>) -> Self {
        Self {
            watched: stores,
            ..Self::default()
        }
    }
}

impl Host for RecordingHost {
    fn ready(&self) {
        self.readied.set(true);
    }

    fn send_data(&self, payload: &str) -> PlatformResult<()> {
        let stored = self
            .watched
            .iter()
            .map(|store| store.entries.borrow().clone())
            .collect();
        self.stored_at_send.borrow_mut().push(stored);
        self.sent.borrow_mut().push(payload.to_string());
        Ok(())
    }
}

/// A clock that only moves when told to. Sleeps resolve immediately, so any
/// race against a never-settling future is lost by the future.
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep(&self, _ms: u64) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }
}
