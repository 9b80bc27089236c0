mod input;
mod logging;
mod platform;
mod terminal;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use input::{ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use terminal::session::SessionConfig;
use terminal::TerminalApp;

fn dispatch(app: &Rc<RefCell<TerminalApp>>, event: InputEvent, now: u64) {
    let checkout = app.borrow_mut().handle_input(&event, now);
    if let Some(checkout) = checkout {
        platform::spawn(async move {
            checkout.complete().await;
        });
    }
}

/// Reconcile stored and bot progress, then hand the session to the app.
#[cfg(target_arch = "wasm32")]
fn boot(app: Rc<RefCell<TerminalApp>>, config: SessionConfig) -> Rc<dyn platform::Clock> {
    let browser = platform::web::browser_platform(&config);
    let clock = browser.clock.clone();
    platform::spawn(async move {
        let query = platform::web::query_string();
        let reconciled = terminal::reconcile::bootstrap(&browser, &config, &query).await;
        let session = terminal::session::Session::new(reconciled.snapshot, browser, config);
        app.borrow_mut().start(session);
    });
    clock
}

#[cfg(not(target_arch = "wasm32"))]
fn boot(_app: Rc<RefCell<TerminalApp>>, _config: SessionConfig) -> Rc<dyn platform::Clock> {
    log::warn!("no browser runtime; staying on the loading screen");
    Rc::new(SystemClock)
}

#[cfg(not(target_arch = "wasm32"))]
struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl platform::Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn sleep(&self, _ms: u64) -> futures::future::LocalBoxFuture<'static, ()> {
        Box::pin(futures::future::pending::<()>())
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let app = Rc::new(RefCell::new(TerminalApp::new()));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = boot(app.clone(), SessionConfig::default());

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        let clock = clock.clone();
        move |mouse_event| {
            if mouse_event.kind != MouseEventKind::ButtonDown(MouseButton::Left) {
                return;
            }
            let action = click_state
                .borrow()
                .hit_test(mouse_event.col, mouse_event.row);
            if let Some(id) = action {
                dispatch(&app, InputEvent::Click(id), clock.now_ms());
            }
        }
    })?;

    terminal.on_key_event({
        let app = app.clone();
        let clock = clock.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                dispatch(&app, InputEvent::Key(c.to_ascii_lowercase()), clock.now_ms());
            }
        }
    })?;

    terminal.draw_web(move |f| {
        let now = clock.now_ms();
        let autosave = app.borrow_mut().update(now);
        if let Some(job) = autosave {
            platform::spawn(async move {
                job.run().await;
            });
        }

        let area = f.area();
        click_state.borrow_mut().begin_frame();
        app.borrow().render(f, area, &click_state);
    });

    Ok(())
}
