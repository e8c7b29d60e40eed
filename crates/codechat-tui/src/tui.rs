use std::io::{self, Stderr};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;
use std::time::Duration;
use anyhow::Result;
use codechat_core::ChatResponse;
use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::error;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug)]
#[allow(dead_code)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    /// An answer (or error) delivered by the message bridge.
    Response(ChatResponse),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    /// Merges terminal input, animation ticks and bridge responses into one stream.
    pub fn new(mut responses: mpsc::UnboundedReceiver<ChatResponse>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _tx = tx.clone();

        // Spawn event reader task
        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let app_event = match evt {
                    // Only handle key press events, not release
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                    Ok(Event::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
                    Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                    _ => None,
                };

                if let Some(event) = app_event {
                    if tx_events.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        // Spawn tick timer for the reveal and ellipsis animations
        let tx_tick = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_RATE);
            loop {
                interval.tick().await;
                if tx_tick.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        let tx_responses = tx.clone();
        tokio::spawn(async move {
            while let Some(response) = responses.recv().await {
                if tx_responses.send(AppEvent::Response(response)).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Set while stderr is in raw mode on the alternate screen.
static ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

/// Puts stderr in raw mode on the alternate screen with mouse capture. A failed setup is
/// undone before the error is returned.
pub fn init() -> Result<Tui> {
    PANIC_HOOK.call_once(install_panic_hook);

    enable_raw_mode()?;
    ACTIVE.store(true, Ordering::SeqCst);

    let setup = execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)
        .and_then(|()| Terminal::new(CrosstermBackend::new(io::stderr())));
    match setup {
        Ok(terminal) => Ok(terminal),
        Err(err) => {
            restore()?;
            Err(err.into())
        }
    }
}

/// Gives the terminal back. Only the first call after `init` touches it, so the panic hook and
/// the normal exit path can both call this.
pub fn restore() -> Result<()> {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return Ok(());
    }
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    Ok(())
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        error!(%info, "panic in chat panel");
        if let Err(err) = restore() {
            eprintln!("could not restore the terminal: {err}");
        }
        previous(info);
    }));
}
