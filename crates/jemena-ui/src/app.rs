//! Chart window event loop.
//!
//! [`App`] owns the theme and draws one [`ChartSpec`] until the user
//! acknowledges it.

use std::io;
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::chart_spec::ChartSpec;
use crate::chart_view;
use crate::themes::Theme;

const TICK_RATE: Duration = Duration::from_millis(250);

pub struct App {
    pub theme: Theme,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            should_quit: false,
        }
    }

    /// Show `spec` in the alternate screen and block until Enter, `q`, Esc
    /// or Ctrl+C. The chart is redrawn on resize.
    ///
    /// Once raw mode is on, every restore step runs even if drawing or an
    /// earlier step fails; the first error is returned.
    pub fn run_chart(&mut self, spec: &ChartSpec) -> io::Result<()> {
        enable_raw_mode()?;
        let result = self.run_in_alternate_screen(spec);

        run_all(vec![
            Box::new(move || result) as Step,
            Box::new(disable_raw_mode),
            Box::new(|| {
                let mut stdout = io::stdout();
                execute!(stdout, LeaveAlternateScreen, Show)
            }),
        ])
    }

    fn run_in_alternate_screen(&mut self, spec: &ChartSpec) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        self.should_quit = false;
        self.event_loop(&mut terminal, spec)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        spec: &ChartSpec,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| {
                let area = frame.area();
                chart_view::render_chart(frame, area, spec, &self.theme);
            })?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Update state for one key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }
}

type Step = Box<dyn FnOnce() -> io::Result<()>>;

/// Run every step in order and return the first error, if any.
fn run_all(steps: Vec<Step>) -> io::Result<()> {
    let mut first = Ok(());
    for step in steps {
        let outcome = step();
        if first.is_ok() {
            first = outcome;
        }
    }
    first
}

// ── Tests ─────────────────────────────────────────────────────────────────────
