//! Boundary to the mini-app container: the two key-value stores, the host
//! bridge that hands data back to the bot, and wall-clock time.
//!
//! The game logic only sees the traits below. Browser implementations live
//! in [`web`]; in-memory fakes for tests live in [`memory`].

#[cfg(test)]
pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::{self, Either, LocalBoxFuture};
use thiserror::Error;

/// Failures at the platform boundary. None of these ever reach the player.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The backend does not exist in this runtime (old client, no bridge).
    #[error("{0} is not supported here")]
    Unsupported(&'static str),

    /// JavaScript threw or reported an error through a callback.
    #[error("JavaScript error: {0}")]
    Js(String),

    /// The operation did not settle in time.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for PlatformError {
    fn from(js_val: wasm_bindgen::JsValue) -> Self {
        let message = js_val
            .as_string()
            .unwrap_or_else(|| format!("{js_val:?}"));
        PlatformError::Js(message)
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// A string key-value store holding serialized snapshots.
pub trait SnapshotStore {
    /// Short name for log lines ("cloud", "local").
    fn name(&self) -> &'static str;

    /// Read the given keys. Keys with no value are simply absent from the map.
    fn load(&self, keys: Vec<String>) -> LocalBoxFuture<'_, PlatformResult<HashMap<String, String>>>;

    /// Write one key. `Ok(false)` means the backend declined the write.
    fn save(&self, key: String, value: String) -> LocalBoxFuture<'_, PlatformResult<bool>>;
}

/// The container hosting the mini-app.
pub trait Host {
    /// Tell the container the app has booted and may take the full viewport.
    fn ready(&self);

    /// Hand a payload to the bot. The container closes the app afterwards.
    fn send_data(&self, payload: &str) -> PlatformResult<()>;
}

pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Resolve after `ms` milliseconds.
    fn sleep(&self, ms: u64) -> LocalBoxFuture<'static, ()>;
}

/// Every collaborator a session needs, bundled for injection.
#[derive(Clone)]
pub struct Platform {
    pub cloud: Rc<dyn SnapshotStore>,
    pub local: Rc<dyn SnapshotStore>,
    pub host: Rc<dyn Host>,
    pub clock: Rc<dyn Clock>,
}

/// Race `fut` against the clock. The loser is dropped.
pub async fn with_timeout<T, F>(clock: &dyn Clock, ms: u64, fut: F) -> PlatformResult<T>
where
    F: Future<Output = PlatformResult<T>>,
{
    match future::select(Box::pin(fut), clock.sleep(ms)).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(PlatformError::Timeout(ms)),
    }
}

/// Run a future to completion in the background.
#[cfg(target_arch = "wasm32")]
pub fn spawn(fut: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(fut);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn(fut: impl Future<Output = ()> + 'static) {
    futures::executor::block_on(fut);
}
