//! Interactive query dispatch.
//!
//! A small command-driven state machine over the immutable pipeline
//! output: two states, `AwaitingCommand` and `Terminated`, with the
//! latter only reachable via the exit command (or end of input). The
//! session owns no I/O — the loop is generic over `BufRead`/`Write` so
//! tests can inject canned command sequences.

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::pipeline::PipelineOutput;

/// Dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept the next command.
    AwaitingCommand,
    /// Exit requested; no further commands are served.
    Terminated,
}

/// A recognized (or not) command token, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Priority,
    Subject,
    Exit,
    Unknown(String),
}

impl Command {
    fn parse(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "status" => Command::Status,
            "priority" => Command::Priority,
            "subject" => Command::Subject,
            "exit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// One interactive session over a finished pipeline run.
///
/// Holds the canonical records and views by shared reference; no command
/// dispatch ever mutates them.
pub struct QuerySession<'a> {
    output: &'a PipelineOutput,
    state: SessionState,
}

impl<'a> QuerySession<'a> {
    /// Start a session in `AwaitingCommand`.
    pub fn new(output: &'a PipelineOutput) -> Self {
        Self {
            output,
            state: SessionState::AwaitingCommand,
        }
    }

    /// Current dispatcher state.
    #[allow(dead_code)] // State inspection utility
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True once the exit command has been dispatched.
    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Dispatch one command line and return the text to show the user.
    pub fn dispatch(&mut self, input: &str) -> String {
        let command = Command::parse(input);
        debug!("Dispatching {:?}", command);

        match command {
            Command::Status => self.render_status_summary(),
            Command::Priority => self.render_priority_matrix(),
            Command::Subject => format!("{} cases loaded.", self.output.records.len()),
            Command::Exit => {
                self.state = SessionState::Terminated;
                "Goodbye.".to_string()
            }
            Command::Unknown(token) => format!(
                "Unrecognized command '{}'. Known commands: status, priority, subject, exit.",
                token
            ),
        }
    }

    fn render_status_summary(&self) -> String {
        let summary = &self.output.aggregates.status_summary;
        let mut lines = vec!["Case Status Summary".to_string()];
        for (status, count) in summary.iter() {
            lines.push(format!("  {}: {}", status, count));
        }
        lines.push(format!("  Total: {}", summary.total()));
        lines.join("\n")
    }

    fn render_priority_matrix(&self) -> String {
        let Some(matrix) = self.output.aggregates.priority_matrix.as_ref() else {
            return "The source has no priority column; the priority view is unavailable."
                .to_string();
        };
        if matrix.is_empty() {
            return "No case carries a priority value.".to_string();
        }

        let mut lines = vec!["Priority x Status".to_string()];
        for priority in matrix.priorities() {
            let cells: Vec<String> = matrix
                .statuses()
                .iter()
                .map(|status| format!("{}={}", status, matrix.count(priority, status)))
                .collect();
            lines.push(format!("  {}: {}", priority, cells.join(", ")));
        }
        lines.join("\n")
    }
}

/// Run the blocking command loop until the session terminates or the
/// input reaches end of file.
pub fn run_loop<R: BufRead, W: Write>(
    session: &mut QuerySession<'_>,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    let mut line = String::new();

    while !session.is_terminated() {
        write!(output, "casefeed> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            // End of input behaves like an explicit exit.
            writeln!(output)?;
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let reply = session.dispatch(&line);
        writeln!(output, "{}", reply)?;
    }

    Ok(())
}
