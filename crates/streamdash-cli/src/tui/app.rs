//! TUI application state and event loop.
//!
//! The feed runs on a tokio runtime owned by the app; the render loop stays
//! on the main thread and reads the shared consumer once per frame. Samples
//! are copied out only after the consumer publishes a new update.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use streamdash_core::{FeedConsumer, TelemetrySample, TimeRange, ViewMode, now_ms, write_export};

use crate::feed::{FeedClient, FeedHandle, lock};

/// Everything one frame needs, copied out from under the consumer lock.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub samples: Vec<TelemetrySample>,
    pub connected: bool,
    pub updates: u64,
    pub dropped: u64,
    pub range: TimeRange,
    pub view: ViewMode,
    pub show_details: bool,
    pub status: Option<String>,
}

/// The last frame's snapshot plus the consumer update it was copied at.
#[derive(Debug, Default)]
pub struct FrameCache {
    snap: Snapshot,
    synced: Option<u64>,
}

impl FrameCache {
    /// Pull state from `consumer`. Cheap fields are read every call; samples
    /// are recopied only when `update_count` moved. Returns true on a recopy.
    pub fn refresh(&mut self, consumer: &FeedConsumer) -> bool {
        let updates = consumer.update_count();
        let stale = self.synced != Some(updates);
        if stale {
            self.snap.samples.clear();
            self.snap.samples.extend_from_slice(consumer.samples());
            self.synced = Some(updates);
        }
        self.snap.connected = consumer.is_connected();
        self.snap.updates = updates;
        self.snap.dropped = consumer.dropped();
        self.snap.range = consumer.time_range();
        stale
    }

    /// Forget the sync point so the next refresh copies unconditionally.
    pub fn reset(&mut self) {
        self.synced = None;
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snap
    }
}

pub struct App {
    runtime: tokio::runtime::Runtime,
    client: FeedClient,
    feed: FeedHandle,
    view: ViewMode,
    show_details: bool,
    running: bool,
    export_dir: PathBuf,
    /// Result of the last export, shown in the key bar.
    status: Option<String>,
    frame: FrameCache,
}

impl App {
    pub fn new(base_url: &str, range: TimeRange) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let client = FeedClient::new(base_url);
        let feed = {
            let _guard = runtime.enter();
            FeedHandle::spawn(client.clone(), range)
        };
        Ok(Self {
            runtime,
            client,
            feed,
            view: ViewMode::default(),
            show_details: false,
            running: true,
            export_dir: PathBuf::from("."),
            status: None,
            frame: FrameCache::default(),
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before printing a panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        self.runtime.block_on(self.feed.shutdown());

        if let Some(status) = &self.status {
            println!("{status}");
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            let snap = self.snapshot();
            terminal.draw(|f| super::ui::draw(f, snap))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('t') => self.set_range(self.feed.time_range().next()),
            KeyCode::Char('v') => self.view = self.view.toggle(),
            KeyCode::Char('d') => self.show_details = !self.show_details,
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
    }

    /// Tear down the current feed and start a fresh one for `range`.
    fn set_range(&mut self, range: TimeRange) {
        self.runtime.block_on(self.feed.shutdown());
        let _guard = self.runtime.enter();
        self.feed = FeedHandle::spawn(self.client.clone(), range);
        self.frame.reset();
    }

    fn export(&mut self) {
        let samples = lock(&self.feed.consumer()).samples().to_vec();
        self.status = Some(match write_export(&self.export_dir, &samples, now_ms()) {
            Ok(path) => format!("Exported {} samples to {}", samples.len(), path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    pub fn snapshot(&mut self) -> &Snapshot {
        self.frame.refresh(&lock(&self.feed.consumer()));
        let snap = &mut self.frame.snap;
        snap.view = self.view;
        snap.show_details = self.show_details;
        snap.status.clone_from(&self.status);
        &self.frame.snap
    }
}
