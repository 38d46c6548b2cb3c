// SPDX-License-Identifier: GPL-3.0-only

//! Terminal viewer
//!
//! Shows the color and depth streams side by side in the terminal, with a
//! one-line status bar. The event loop doubles as the idle-notification
//! source for the render loop: whenever no key event is pending, one idle
//! notification is delivered to the driver, which acquires, converts, and
//! asks to be notified again. Pacing comes from the source's blocking
//! acquire, not from a timer.

use crate::capture::{self, FrameSource, StreamKind};
use crate::config::Config;
use crate::constants::{STREAM_HEIGHT, STREAM_RATE, STREAM_WIDTH};
use crate::errors::AppResult;
use crate::render::display::{DisplayBuffer, SurfaceWidget};
use crate::render::driver::RenderLoop;
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::{error, info};

/// Run the viewer until the user quits
pub fn run(config: &Config, synthetic: bool) -> AppResult<()> {
    let mut source = capture::create_source(config, synthetic);
    info!(source = source.name(), "Starting viewer");

    source.enable_stream(StreamKind::Color, STREAM_WIDTH, STREAM_HEIGHT, STREAM_RATE)?;
    source.enable_stream(StreamKind::Depth, STREAM_WIDTH, STREAM_HEIGHT, STREAM_RATE)?;
    // Initialization failure is fatal and must surface before the
    // terminal enters raw mode
    source.init()?;

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut *source, config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    source: &mut dyn FrameSource,
    config: &Config,
) -> AppResult<()> {
    let mut color_buf = DisplayBuffer::new(STREAM_WIDTH, STREAM_HEIGHT);
    let mut depth_buf = DisplayBuffer::new(STREAM_WIDTH, STREAM_HEIGHT);

    let mut driver = RenderLoop::new();
    driver.activate();

    let source_name = source.name();
    let mut show_help = false;
    let mut notice: Option<String> = None;

    loop {
        let status_line = if show_help {
            help_message()
        } else {
            build_status_line(source_name, &driver, notice.as_deref())
        };

        terminal.draw(|f| {
            let area = f.area();

            let (panel_area, status_area) = if config.show_status_bar && area.height > 1 {
                (
                    Rect {
                        x: area.x,
                        y: area.y,
                        width: area.width,
                        height: area.height - 1,
                    },
                    Some(Rect {
                        x: area.x,
                        y: area.y + area.height - 1,
                        width: area.width,
                        height: 1,
                    }),
                )
            } else {
                (area, None)
            };

            // Color panel on the left, depth on the right
            let half = panel_area.width / 2;
            let color_area = Rect {
                x: panel_area.x,
                y: panel_area.y,
                width: half,
                height: panel_area.height,
            };
            let depth_area = Rect {
                x: panel_area.x + half,
                y: panel_area.y,
                width: panel_area.width - half,
                height: panel_area.height,
            };

            f.render_widget(SurfaceWidget::new(&color_buf), color_area);
            f.render_widget(SurfaceWidget::new(&depth_buf), depth_area);

            if let Some(status_area) = status_area {
                f.render_widget(
                    StatusBar {
                        message: &status_line,
                    },
                    status_area,
                );
            }
        })?;

        // While the loop is active, key polling must not delay the next
        // idle notification; when detached, a small timeout keeps the
        // process from spinning.
        let timeout = if driver.is_active() {
            Duration::ZERO
        } else {
            Duration::from_millis(50)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                // Ctrl+C and 'q' quit
                if key.code == KeyCode::Char('q')
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    break;
                }

                // Space toggles the render loop
                if key.code == KeyCode::Char(' ') {
                    if driver.is_active() {
                        driver.deactivate();
                    } else {
                        driver.activate();
                    }
                }

                // 's' saves a snapshot of both surfaces
                if key.code == KeyCode::Char('s') {
                    show_help = false;
                    let dir = storage::snapshot_dir(config);
                    match storage::save_snapshot(&color_buf, &depth_buf, &dir) {
                        Ok((color_path, _)) => {
                            notice = Some(format!("Saved: {}", color_path.display()));
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to save snapshot");
                            notice = Some(format!("Error: {}", e));
                        }
                    }
                }

                // 'h' toggles the key help
                if key.code == KeyCode::Char('h') {
                    show_help = !show_help;
                }
            }
        } else if driver.is_active() {
            // Idle notification: run one render step. The outcome's
            // request_more is honored by this loop iterating again.
            let _outcome = driver.on_idle(source, &mut color_buf, &mut depth_buf);
        }
    }

    Ok(())
}

fn build_status_line(source_name: &str, driver: &RenderLoop, notice: Option<&str>) -> String {
    let mut line = format!("{} | frame {}", source_name, driver.frames());
    if !driver.is_active() {
        line.push_str(" | paused");
    }
    if let Some(notice) = notice {
        line.push_str(" | ");
        line.push_str(notice);
    } else if let Some(status) = driver.last_status() {
        line.push_str(" | ");
        line.push_str(status);
    }
    line.push_str(" | 'h' help");
    line
}

fn help_message() -> String {
    "space: Pause/resume | s: Snapshot | h: Toggle help | q/Ctrl+C: Quit".to_string()
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text = if self.message.len() > area.width as usize {
            &self.message[..area.width as usize]
        } else {
            self.message
        };

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
