//! Browser implementations: Telegram `CloudStorage`, `localStorage`, the
//! Telegram WebApp bridge and the JS clock.

use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Array, Function, Promise, Reflect};
use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::{Clock, Host, Platform, PlatformError, PlatformResult, SnapshotStore};
use crate::terminal::session::SessionConfig;

/// `window.Telegram.WebApp`, when the bridge script is loaded.
fn web_app() -> Option<JsValue> {
    let window = web_sys::window()?;
    let telegram = Reflect::get(&window, &JsValue::from_str("Telegram")).ok()?;
    if telegram.is_undefined() || telegram.is_null() {
        return None;
    }
    let app = Reflect::get(&telegram, &JsValue::from_str("WebApp")).ok()?;
    (!app.is_undefined() && !app.is_null()).then_some(app)
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Await a Node-style `(err, value)` callback handed to `call`.
async fn callback_result<F>(call: F) -> PlatformResult<JsValue>
where
    F: FnOnce(&JsValue) -> Result<JsValue, JsValue>,
{
    let (tx, rx) = oneshot::channel::<Result<JsValue, JsValue>>();
    let callback = Closure::once_into_js(move |err: JsValue, value: JsValue| {
        let outcome = if err.is_null() || err.is_undefined() {
            Ok(value)
        } else {
            Err(err)
        };
        let _ = tx.send(outcome);
    });
    call(&callback)?;
    let outcome = rx
        .await
        .map_err(|_| PlatformError::Js("callback was never invoked".to_string()))?;
    Ok(outcome?)
}

// ── Cloud store ────────────────────────────────────────────────

/// Telegram `CloudStorage`. Unsupported on bridges older than `min_version`.
pub struct TelegramCloudStore {
    min_version: String,
}

impl TelegramCloudStore {
    pub fn new(min_version: impl Into<String>) -> Self {
        Self {
            min_version: min_version.into(),
        }
    }

    fn storage(&self) -> PlatformResult<JsValue> {
        let app = web_app().ok_or(PlatformError::Unsupported("cloud"))?;
        let recent = method(&app, "isVersionAtLeast")
            .and_then(|f| f.call1(&app, &JsValue::from_str(&self.min_version)).ok())
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if !recent {
            return Err(PlatformError::Unsupported("cloud"));
        }
        let storage = Reflect::get(&app, &JsValue::from_str("CloudStorage"))?;
        if storage.is_undefined() || storage.is_null() {
            return Err(PlatformError::Unsupported("cloud"));
        }
        Ok(storage)
    }

    async fn get_items(&self, keys: Vec<String>) -> PlatformResult<HashMap<String, String>> {
        let storage = self.storage()?;
        let get_items = method(&storage, "getItems").ok_or(PlatformError::Unsupported("cloud"))?;
        let js_keys: Array = keys.iter().map(|k| JsValue::from_str(k)).collect();

        let values = callback_result(|cb| get_items.call2(&storage, &js_keys, cb)).await?;
        if values.is_undefined() || values.is_null() {
            return Ok(HashMap::new());
        }
        Ok(keys
            .into_iter()
            .filter_map(|k| {
                let v = Reflect::get(&values, &JsValue::from_str(&k)).ok()?.as_string()?;
                // The cloud reports missing keys as empty strings.
                (!v.is_empty()).then_some((k, v))
            })
            .collect())
    }

    async fn set_item(&self, key: String, value: String) -> PlatformResult<bool> {
        let storage = self.storage()?;
        let set_item = method(&storage, "setItem").ok_or(PlatformError::Unsupported("cloud"))?;
        let stored = callback_result(|cb| {
            set_item.call3(
                &storage,
                &JsValue::from_str(&key),
                &JsValue::from_str(&value),
                cb,
            )
        })
        .await?;
        Ok(stored.is_truthy())
    }
}

impl SnapshotStore for TelegramCloudStore {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn load(&self, keys: Vec<String>) -> LocalBoxFuture<'_, PlatformResult<HashMap<String, String>>> {
        self.get_items(keys).boxed_local()
    }

    fn save(&self, key: String, value: String) -> LocalBoxFuture<'_, PlatformResult<bool>> {
        self.set_item(key, value).boxed_local()
    }
}

// ── Local store ────────────────────────────────────────────────

/// `window.localStorage`. Synchronous underneath.
pub struct BrowserLocalStore;

impl BrowserLocalStore {
    fn storage() -> PlatformResult<web_sys::Storage> {
        web_sys::window()
            .ok_or(PlatformError::Unsupported("local"))?
            .local_storage()?
            .ok_or(PlatformError::Unsupported("local"))
    }

    fn get_items(keys: Vec<String>) -> PlatformResult<HashMap<String, String>> {
        let storage = Self::storage()?;
        let mut found = HashMap::new();
        for key in keys {
            if let Some(value) = storage.get_item(&key)? {
                found.insert(key, value);
            }
        }
        Ok(found)
    }

    fn set_item(key: &str, value: &str) -> PlatformResult<bool> {
        Self::storage()?.set_item(key, value)?;
        Ok(true)
    }
}

impl SnapshotStore for BrowserLocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn load(&self, keys: Vec<String>) -> LocalBoxFuture<'_, PlatformResult<HashMap<String, String>>> {
        futures::future::ready(Self::get_items(keys)).boxed_local()
    }

    fn save(&self, key: String, value: String) -> LocalBoxFuture<'_, PlatformResult<bool>> {
        futures::future::ready(Self::set_item(&key, &value)).boxed_local()
    }
}

// ── Host bridge ────────────────────────────────────────────────

/// The Telegram WebApp object, or a simulation when opened in a plain browser.
pub struct TelegramHost;

impl Host for TelegramHost {
    fn ready(&self) {
        let Some(app) = web_app() else {
            info!("no Telegram bridge, running standalone");
            return;
        };
        for name in ["ready", "expand"] {
            if let Some(f) = method(&app, name) {
                let _ = f.call0(&app);
            }
        }
        debug!("Telegram bridge ready");
    }

    fn send_data(&self, payload: &str) -> PlatformResult<()> {
        if let Some(app) = web_app() {
            let send = method(&app, "sendData").ok_or(PlatformError::Unsupported("sendData"))?;
            send.call1(&app, &JsValue::from_str(payload))?;
            return Ok(());
        }
        info!("simulated sendData: {payload}");
        let window = web_sys::window().ok_or(PlatformError::Unsupported("window"))?;
        window.alert_with_message(&format!("Data sent to bot (Simulation): {payload}"))?;
        Ok(())
    }
}

// ── Clock ──────────────────────────────────────────────────────

pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now().max(0.0) as u64
    }

    fn sleep(&self, ms: u64) -> LocalBoxFuture<'static, ()> {
        let delay = ms.min(i32::MAX as u64) as i32;
        let promise = Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay);
            }
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}

/// `location.search` of the page, as the bot built it.
pub fn query_string() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

/// Wire every collaborator to the real browser.
pub fn browser_platform(config: &SessionConfig) -> Platform {
    Platform {
        cloud: Rc::new(TelegramCloudStore::new(config.cloud_min_version.clone())),
        local: Rc::new(BrowserLocalStore),
        host: Rc::new(TelegramHost),
        clock: Rc::new(BrowserClock),
    }
}
