use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dex_core::{ImageSource, PresentationSurface, ViewPhase};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const TRANSITION_LENGTH: Duration = Duration::from_millis(600);

#[derive(Default)]
pub struct CardState {
    pub image: Option<ImageSource>,
    pub alt: String,
    pub name: String,
    pub category: String,
    pub height: String,
    pub weight: String,
    pub identifier: String,
    pub primary_trait: String,
}

/// Terminal presentation surface: the creature card plus the log panel.
pub struct UiState {
    pub card: CardState,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    transition_started: Option<Instant>,
    check_pending: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            card: CardState::default(),
            logs: VecDeque::new(),
            max_logs: 8,
            transition_started: None,
            check_pending: false,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    /// URL of an image that still needs a load check, if any.
    pub fn take_image_check(&mut self) -> Option<String> {
        if !self.check_pending {
            return None;
        }
        self.check_pending = false;
        self.card
            .image
            .as_ref()
            .map(|image| image.current().to_string())
    }

    /// Asset at `failed_url` did not load; move to the next fallback if the
    /// card is still showing it.
    pub fn on_image_error(&mut self, failed_url: &str) {
        let Some(image) = self.card.image.as_mut() else {
            return;
        };
        if image.current() != failed_url {
            return;
        }
        let next = image.on_load_error().map(str::to_string);
        match next {
            Some(url) => {
                self.push_log(format!("Image unavailable, using {url}"));
                self.check_pending = true;
            }
            None => self.push_log("No image available"),
        }
    }

    pub fn transition_active(&self) -> bool {
        self.transition_started
            .map(|started| started.elapsed() < TRANSITION_LENGTH)
            .unwrap_or(false)
    }
}

impl PresentationSurface for UiState {
    fn show_image(&mut self, image: &ImageSource, alt: &str) {
        self.card.image = Some(image.clone());
        self.card.alt = alt.to_string();
        self.check_pending = true;
    }

    fn show_name(&mut self, text: &str) {
        self.card.name = text.to_string();
    }

    fn show_category(&mut self, text: &str) {
        self.card.category = text.to_string();
    }

    fn show_height(&mut self, text: &str) {
        self.card.height = text.to_string();
    }

    fn show_weight(&mut self, text: &str) {
        self.card.weight = text.to_string();
    }

    fn show_identifier(&mut self, text: &str) {
        self.card.identifier = text.to_string();
    }

    fn show_primary_trait(&mut self, text: &str) {
        self.card.primary_trait = text.to_string();
    }

    fn restart_transition(&mut self) {
        self.transition_started = Some(Instant::now());
    }
}

pub struct HeaderInfo {
    pub phase: ViewPhase,
    pub current: u32,
    pub max: u32,
}

pub fn draw_ui(frame: &mut Frame, state: &UiState, header: &HeaderInfo) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(10),
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], header);
    draw_card(frame, chunks[1], state);
    draw_commands(frame, chunks[2]);
    draw_logs(frame, chunks[3], state);
}

fn draw_header(frame: &mut Frame, area: Rect, header: &HeaderInfo) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Creature Catalog Viewer");
    let status = match header.phase {
        ViewPhase::Loading { id } => {
            Span::styled(format!("Loading #{:03}", id), Style::default().fg(Color::Yellow))
        }
        ViewPhase::Settled => Span::styled("Ready", Style::default().fg(Color::Green)),
    };
    let line = Line::from(vec![
        status,
        Span::raw(format!(" | entry {} of {}", header.current, header.max)),
        Span::raw(" | q to exit"),
    ]);
    let text = Paragraph::new(line).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_card(frame: &mut Frame, area: Rect, state: &UiState) {
    let card = &state.card;
    let border = if state.transition_active() {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(card.identifier.clone());

    let image_line = match card.image.as_ref() {
        Some(image) if image.is_fallback() => Line::from(vec![
            field_label("image"),
            Span::raw(image.current().to_string()),
            Span::styled(" (fallback)", Style::default().fg(Color::DarkGray)),
        ]),
        Some(image) => Line::from(vec![field_label("image"), Span::raw(image.current().to_string())]),
        None => Line::from(vec![field_label("image"), Span::raw("-")]),
    };

    let lines = vec![
        Line::from(Span::styled(
            card.name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        image_line,
        Line::from(vec![field_label("alt"), Span::raw(card.alt.clone())]),
        Line::from(vec![field_label("type"), Span::raw(card.category.clone())]),
        Line::from(vec![field_label("height"), Span::raw(card.height.clone())]),
        Line::from(vec![field_label("weight"), Span::raw(card.weight.clone())]),
        Line::from(vec![field_label("power"), Span::raw(card.primary_trait.clone())]),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn field_label(label: &str) -> Span<'static> {
    Span::styled(format!("{:<8}", label), Style::default().fg(Color::Cyan))
}

fn draw_commands(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled("←/a", Style::default().fg(Color::Yellow)),
            Span::raw("    previous entry"),
        ]),
        Line::from(vec![
            Span::styled("→/d", Style::default().fg(Color::Yellow)),
            Span::raw("    next entry"),
        ]),
        Line::from(vec![
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw("      random entry"),
        ]),
        Line::from(vec![
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw("      exit viewer"),
        ]),
    ];
    let block = Block::default().borders(Borders::ALL).title("Commands");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}
