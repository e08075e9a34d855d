//! Terminal rendering of engine events
//!
//! The countdown is a single line redrawn in place with `\r`; notifications
//! and control messages are printed on lines of their own above it.

use std::io::{self, Write};

use hiit_core::{EventSink, PhaseKind, TimerEvent, format_hmmss, format_mmss};

const BAR_WIDTH: usize = 20;

/// Renders [`TimerEvent`]s to a writer
pub struct TerminalDisplay<W: Write> {
    out: W,
    notifications: bool,
    phase: Option<PhaseLine>,
    /// A countdown line without a trailing newline is on screen
    line_open: bool,
}

#[derive(Debug, Clone, Copy)]
struct PhaseLine {
    kind: PhaseKind,
    set_index: Option<u32>,
    sets_planned: u32,
}

impl TerminalDisplay<io::Stdout> {
    pub fn stdout(notifications: bool) -> Self {
        Self::new(io::stdout(), notifications)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, notifications: bool) -> Self {
        Self {
            out,
            notifications,
            phase: None,
            line_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print a message on its own line, closing any open countdown line
    pub fn message(&mut self, text: &str) {
        if let Err(e) = self.write_message(text) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn write_message(&mut self, text: &str) -> io::Result<()> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn write_countdown(
        &mut self,
        remaining: u32,
        total_remaining: u64,
        sets_remaining: u32,
        progress: f32,
    ) -> io::Result<()> {
        let Some(phase) = self.phase else {
            return Ok(());
        };
        write!(
            self.out,
            "\r{}",
            countdown_line(phase, remaining, total_remaining, sets_remaining, progress)
        )?;
        self.line_open = true;
        self.out.flush()
    }
}

fn countdown_line(
    phase: PhaseLine,
    remaining: u32,
    total_remaining: u64,
    sets_remaining: u32,
    progress: f32,
) -> String {
    let set = phase
        .set_index
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "{:<8} {}  set {}/{}  ({} left)  total {}  [{}]",
        phase.kind.label(),
        format_mmss(remaining),
        set,
        phase.sets_planned,
        sets_remaining,
        format_hmmss(total_remaining),
        progress_bar(progress),
    )
}

fn progress_bar(progress: f32) -> String {
    let filled = (progress.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

impl<W: Write> EventSink for TerminalDisplay<W> {
    fn handle_event(&mut self, event: &TimerEvent) {
        if self.notifications
            && let Some(notification) = event.notification()
        {
            self.message(&format!("** {} | {}", notification.title, notification.body));
        }

        match *event {
            TimerEvent::PhaseChanged {
                kind,
                set_index,
                sets_planned,
            } => {
                self.phase = Some(PhaseLine {
                    kind,
                    set_index,
                    sets_planned,
                });
            }
            TimerEvent::Tick {
                remaining,
                total_remaining,
                sets_remaining,
                progress,
            } => {
                if let Err(e) =
                    self.write_countdown(remaining, total_remaining, sets_remaining, progress)
                {
                    tracing::warn!(error = %e, "Failed to write to terminal");
                }
            }
            TimerEvent::Paused => self.message("Paused. 'p' to resume."),
            TimerEvent::Resumed => self.message("Resumed."),
            TimerEvent::Reset => {
                self.phase = None;
                self.message("Workout reset. 's' to start again, 'q' to quit.");
            }
            TimerEvent::Finished => {
                self.phase = None;
                if !self.notifications {
                    self.message("Workout complete.");
                }
            }
            TimerEvent::PhaseEndingSoon { .. }
            | TimerEvent::NextPhaseSoon { .. }
            | TimerEvent::CueThreshold { .. } => {}
        }
    }
}
