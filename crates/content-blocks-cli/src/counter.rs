//! Terminal view of one interactive counter.
//!
//! The stored document is parsed, the chosen interactive fragment is
//! attached to a [`ViewRuntime`], and the runtime's virtual clock is driven
//! from wall-clock time between key polls.

use anyhow::{Context, Result};
use content_blocks_engine::blocks::interactive_counter::LABEL_CLASS;
use content_blocks_engine::fragment::INTERACTIVE_ATTR;
use content_blocks_engine::interactivity::{Event, Key, Mode, StoreHandle, ViewRuntime};
use content_blocks_syntax::{Element, Node, parse};
use crossterm::{
    event::{self, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::collections::VecDeque;
use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

const EVENT_HISTORY: usize = 8;

pub struct CounterApp {
    runtime: ViewRuntime,
    handle: StoreHandle,
    label: String,
    events: VecDeque<String>,
}

impl CounterApp {
    /// Attach the `ordinal`-th interactive fragment of a stored document.
    pub fn load(text: &str, ordinal: usize) -> Result<Self> {
        let nodes = parse(text).context("parsing document")?;
        let mut interactive = Vec::new();
        collect_interactive(&nodes, &mut interactive);
        let found = interactive.len();
        let element = interactive
            .get(ordinal)
            .with_context(|| format!("no interactive fragment #{ordinal} ({found} found)"))?;

        let mut runtime = ViewRuntime::new();
        let handle = runtime.attach(element)?;
        let label = element
            .find_class(LABEL_CLASS)
            .map(|label| plain_text(label.inner(text)))
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| "Counter".to_string());

        Ok(Self {
            runtime,
            handle,
            label,
            events: VecDeque::with_capacity(EVENT_HISTORY),
        })
    }

    fn key(&mut self, key: Key) -> Result<()> {
        let events = self.runtime.key(self.handle, key)?;
        for event in events {
            self.record(&event);
        }
        Ok(())
    }

    fn advance(&mut self, elapsed: Duration) {
        for (_, event) in self.runtime.advance(elapsed) {
            self.record(&event);
        }
    }

    fn record(&mut self, event: &Event) {
        let at = self.runtime.now().as_millis();
        let line = match event {
            Event::Changed { action, old, new } => format!("{at:>7}ms {action:?}: {old} → {new}"),
            Event::AutoIncrement { running: true } => format!("{at:>7}ms auto increment started"),
            Event::AutoIncrement { running: false } => format!("{at:>7}ms auto increment stopped"),
            Event::Mounted | Event::Unmounted => return,
        };
        if self.events.len() == EVENT_HISTORY {
            self.events.pop_front();
        }
        self.events.push_back(line);
    }
}

fn collect_interactive<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.has_attr(INTERACTIVE_ATTR) {
                out.push(element);
            }
            collect_interactive(&element.children, out);
        }
    }
}

/// Text content of a rich-text label, tags dropped.
fn plain_text(markup: &str) -> String {
    fn push_text(nodes: &[Node], source: &str, out: &mut String) {
        for node in nodes {
            match node {
                Node::Text(span) => out.push_str(&html_escape::decode_html_entities(span.slice(source))),
                Node::Element(element) => push_text(&element.children, source, out),
            }
        }
    }
    match parse(markup) {
        Ok(nodes) => {
            let mut out = String::new();
            push_text(&nodes, markup, &mut out);
            out
        }
        Err(_) => html_escape::decode_html_entities(markup).into_owned(),
    }
}

fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Home => Some(Key::Home),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

/// Take over the terminal until the user quits.
pub fn run(mut app: CounterApp, tick: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut app, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.runtime.detach(app.handle)?;
    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut CounterApp,
    tick: Duration,
) -> Result<()> {
    let mut last = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick)?
            && let event::Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                code => {
                    if let Some(key) = key_for(code) {
                        app.key(key)?;
                    }
                }
            }
        }

        let now = Instant::now();
        app.advance(now - last);
        last = now;
    }
}

fn ui(f: &mut Frame, app: &CounterApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let Some(store) = app.runtime.store(app.handle) else {
        return;
    };
    let (min, max) = store.bounds();

    let value_style = if store.is_at_min() || store.is_at_max() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let value = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(store.formatted_value(), value_style)),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(app.label.as_str()));
    f.render_widget(value, chunks[0]);

    let mode = match store.mode() {
        Mode::Idle => "idle",
        Mode::AutoRunning => "auto",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(format!("range {min}..={max} | step {} | ", store.step())),
        Span::styled(mode, Style::default().fg(Color::Cyan)),
        Span::raw(if store.auto_increment_enabled() {
            format!(" every {}ms", store.interval().as_millis())
        } else {
            " (auto increment disabled)".to_string()
        }),
    ]))
    .block(Block::default().borders(Borders::ALL).title("State"));
    f.render_widget(status, chunks[1]);

    let events: Vec<ListItem> = app
        .events
        .iter()
        .map(|line| ListItem::new(line.as_str()))
        .collect();
    let events = List::new(events).block(Block::default().borders(Borders::ALL).title("Events"));
    f.render_widget(events, chunks[2]);

    let help = Paragraph::new(Line::from(
        "q: Quit | ↑/+: Increase | ↓/-: Decrease | Home: Reset | Enter/Space: Auto increment",
    ));
    f.render_widget(help, chunks[3]);
}
