use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use dex_core::{HttpCatalog, Viewer};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tracing::{info, trace};

use crate::ui::{draw_ui, HeaderInfo, UiState};

pub type TerminalViewer = Viewer<HttpCatalog, UiState>;

pub struct ViewerApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    viewer: TerminalViewer,
    runtime: Handle,
    log_receiver: Receiver<String>,
}

impl ViewerApp {
    pub fn new(viewer: TerminalViewer, runtime: Handle, log_receiver: Receiver<String>) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            viewer,
            runtime,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw: Option<Instant> = None;
        self.viewer.start();

        loop {
            self.drain_logs();
            self.check_image();

            if last_draw.map_or(true, |at| at.elapsed() >= Duration::from_millis(100)) {
                let header = HeaderInfo {
                    phase: self.viewer.phase(),
                    current: self.viewer.current_id(),
                    max: self.viewer.navigation().max(),
                };
                let surface = self.viewer.surface();
                let state = surface.lock();
                self.terminal
                    .draw(|frame| draw_ui(frame, &state, &header))?;
                drop(state);
                last_draw = Some(Instant::now());
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => {
                            if !self.viewer.step_backward() {
                                self.log("Already at the first entry");
                            }
                        }
                        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => {
                            if !self.viewer.step_forward() {
                                self.log("Already at the last entry");
                            }
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            let id = self.viewer.jump_random();
                            info!(target: "dex::viewer", id, "navigation.random");
                        }
                        _ => {}
                    }
                }
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    fn drain_logs(&mut self) {
        let surface = self.viewer.surface();
        let mut state = surface.lock();
        while let Ok(line) = self.log_receiver.try_recv() {
            state.push_log(line);
        }
    }

    fn log(&self, line: &str) {
        self.viewer.surface().lock().push_log(line);
    }

    /// Check the card's current image and fall back when it does not load.
    fn check_image(&self) {
        let request = self.viewer.surface().lock().take_image_check();
        let Some(url) = request else {
            return;
        };
        let catalog = self.viewer.catalog();
        let surface = self.viewer.surface();
        self.runtime.spawn(async move {
            if catalog.asset_available(&url).await {
                trace!(target: "dex::viewer", %url, "image.available");
            } else {
                surface.lock().on_image_error(&url);
            }
        });
    }
}
