use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::clock::Epoch;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum TypingEvent {
    Key(KeyEvent),
    Resize,
    /// clock tick scheduled for the session running under this epoch
    Tick(Epoch),
}

/// Source of terminal events (keyboard, resize, ticks)
pub trait TypingEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError>;

    /// Sender that ticker threads push their ticks into
    fn sender(&self) -> Sender<TypingEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<TypingEvent>,
    rx: Receiver<TypingEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => TypingEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => TypingEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if reader_tx.send(evt).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<TypingEvent> {
        self.tx.clone()
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<TypingEvent>,
    rx: Receiver<TypingEvent>,
}

impl TestEventSource {
    pub fn new(tx: Sender<TypingEvent>, rx: Receiver<TypingEvent>) -> Self {
        Self { tx, rx }
    }
}

impl TypingEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypingEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<TypingEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Owns a ticker thread. Dropping the guard stops the thread and waits for it,
/// so no tick is sent once the drop has returned.
#[derive(Debug)]
pub struct TickGuard {
    epoch: Epoch,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TickGuard {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        // disconnecting the cancel channel wakes the thread immediately
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Send `Tick(epoch)` into `tx` every ticker interval until the guard is dropped
pub fn spawn_ticker<T: Ticker>(tx: Sender<TypingEvent>, ticker: &T, epoch: Epoch) -> TickGuard {
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
    let interval = ticker.interval();

    let handle = std::thread::spawn(move || loop {
        match cancel_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if tx.send(TypingEvent::Tick(epoch)).is_err() {
                    break;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    });

    TickGuard {
        epoch,
        cancel: Some(cancel_tx),
        handle: Some(handle),
    }
}

/// Runner that hands the application one event at a time
pub struct Runner<E: TypingEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TypingEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one tick interval; `None` when nothing arrived
    pub fn step(&self) -> Option<TypingEvent> {
        self.event_source.recv_timeout(self.ticker.interval()).ok()
    }

    pub fn sender(&self) -> Sender<TypingEvent> {
        self.event_source.sender()
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }
}
