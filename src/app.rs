use std::sync::mpsc::Sender;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use webbrowser::Browser;

use typerate::{
    config::{Config, ConfigStore, FileConfigStore},
    metrics::TestResult,
    passages::select_text,
    recorder::{RecordStore, ResultRecorder},
    runtime::{spawn_ticker, FixedTicker, TickGuard, TypingEvent},
    session::{InputOutcome, Session},
};

/// Everything the TUI owns: the current session, its ticker, the recorder and settings
pub struct App<S: RecordStore> {
    pub session: Session,
    pub config: Config,
    pub recorder: ResultRecorder<S>,
    pub new_best: bool,
    pub should_quit: bool,
    custom_prompt: Option<String>,
    config_store: FileConfigStore,
    tick_tx: Sender<TypingEvent>,
    ticker: FixedTicker,
    tick_guard: Option<TickGuard>,
}

impl<S: RecordStore> App<S> {
    pub fn new(
        config: Config,
        custom_prompt: Option<String>,
        config_store: FileConfigStore,
        recorder: ResultRecorder<S>,
        tick_tx: Sender<TypingEvent>,
        ticker: FixedTicker,
    ) -> Self {
        let custom_prompt = custom_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let mut app = Self {
            session: Session::new(String::new()),
            config,
            recorder,
            new_best: false,
            should_quit: false,
            custom_prompt,
            config_store,
            tick_tx,
            ticker,
            tick_guard: None,
        };
        app.new_test();
        app
    }

    fn next_text(&self) -> String {
        match &self.custom_prompt {
            Some(prompt) => prompt.clone(),
            None => select_text(self.config.category, self.config.difficulty),
        }
    }

    /// Replace the session with a fresh one on a new passage
    pub fn new_test(&mut self) {
        let text = self.next_text();
        self.replace_session(text);
    }

    /// Start over on the same passage
    pub fn retry(&mut self) {
        let text = self.session.reference().to_string();
        self.replace_session(text);
    }

    fn replace_session(&mut self, text: String) {
        self.tick_guard = None;
        self.session.on_text_generated(text);
        self.new_best = false;
    }

    pub fn handle_event(&mut self, event: TypingEvent) {
        match event {
            TypingEvent::Tick(epoch) => {
                self.session.on_tick(epoch);
            }
            TypingEvent::Resize => {}
            TypingEvent::Key(key) => self.handle_key(key),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Tab | KeyCode::Esc => self.new_test(),
            KeyCode::Enter | KeyCode::Char('f') if ctrl => self.force_finish(),
            KeyCode::Char('s') if ctrl => self.toggle_stats(),
            KeyCode::Backspace => {
                self.session.backspace();
            }
            KeyCode::Char(c) if self.session.is_finished() => self.on_results_key(c),
            KeyCode::Char(c) if !ctrl => {
                if let InputOutcome::Finished(result) = self.session.type_char(c) {
                    self.on_finished(result);
                }
            }
            _ => {}
        }
        self.sync_ticker();
    }

    fn on_results_key(&mut self, c: char) {
        match c {
            'n' => self.new_test(),
            'r' => self.retry(),
            'c' => self.cycle_category(),
            'd' => self.cycle_difficulty(),
            't' => self.share_result(),
            _ => {}
        }
    }

    pub fn force_finish(&mut self) {
        if let Some(result) = self.session.force_finish() {
            self.on_finished(result);
        }
    }

    fn on_finished(&mut self, result: TestResult) {
        self.tick_guard = None;
        match self.recorder.record(&result) {
            Ok(is_best) => self.new_best = is_best,
            Err(err) => tracing::warn!(%err, "could not persist result"),
        }
    }

    /// Keep exactly one ticker alive while the session runs, none otherwise
    fn sync_ticker(&mut self) {
        match self.session.epoch() {
            Some(epoch) if self.session.is_running() => {
                if self.tick_guard.as_ref().map(|g| g.epoch()) != Some(epoch) {
                    self.tick_guard = Some(spawn_ticker(self.tick_tx.clone(), &self.ticker, epoch));
                }
            }
            _ => self.tick_guard = None,
        }
    }

    pub fn toggle_stats(&mut self) {
        self.config.show_stats = !self.config.show_stats;
        self.save_config();
    }

    /// Settings can only change between tests
    pub fn cycle_category(&mut self) {
        if self.session.is_running() {
            return;
        }
        self.config.category = self.config.category.next();
        self.custom_prompt = None;
        self.save_config();
        self.new_test();
    }

    pub fn cycle_difficulty(&mut self) {
        if self.session.is_running() {
            return;
        }
        self.config.difficulty = self.config.difficulty.next();
        self.custom_prompt = None;
        self.save_config();
        self.new_test();
    }

    fn save_config(&self) {
        if let Err(err) = self.config_store.save(&self.config) {
            tracing::warn!(%err, "could not save config");
        }
    }

    fn share_result(&self) {
        let Some(result) = self.session.result() else {
            return;
        };
        if !Browser::is_available() {
            return;
        }
        let url = format!(
            "https://twitter.com/intent/tweet?text={}%20wpm%20%2F%20{}%25%20acc%20%2F%20{}%25%20consistency",
            result.wpm, result.accuracy, result.consistency
        );
        if let Err(err) = webbrowser::open(&url) {
            tracing::warn!(%err, "could not open browser");
        }
    }
}
