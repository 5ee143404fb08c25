//! Interactive shell around a single `SessionApiClient`.
//!
//! Each line is parsed into a `Command` and executed against the one client
//! the shell owns, so a login in one line is visible to the next.

use std::io::{self, Write};

use notesheet_core::{SessionApiClient, Transport};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use thiserror::Error;
use tracing::warn;

use crate::render;

const PROMPT: &str = "notesheet> ";

pub const HELP: &str = "\
Commands:
  login <username> <password>          open a session
  logout                               forget the session and last response
  status                               show the held session
  docs <workitemId> <processInstanceId>    list supporting documents (needs login)
  pdfnote <workitemId> <processInstanceId> create a PDF note (service account)
  raw                                  show the last raw response
  help                                 this text
  quit                                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Logout,
    Status,
    Docs {
        workitem_id: String,
        process_instance_id: String,
    },
    PdfNote {
        workitem_id: String,
        process_instance_id: String,
    },
    Raw,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (type `help` for a list)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb, args.as_slice()) {
            ("login", [username, password]) => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err(CommandError::Usage("login <username> <password>")),
            ("logout", []) => Command::Logout,
            ("status", []) => Command::Status,
            ("docs", [workitem_id, process_instance_id]) => Command::Docs {
                workitem_id: workitem_id.to_string(),
                process_instance_id: process_instance_id.to_string(),
            },
            ("docs", _) => {
                return Err(CommandError::Usage("docs <workitemId> <processInstanceId>"))
            }
            ("pdfnote", [workitem_id, process_instance_id]) => Command::PdfNote {
                workitem_id: workitem_id.to_string(),
                process_instance_id: process_instance_id.to_string(),
            },
            ("pdfnote", _) => {
                return Err(CommandError::Usage("pdfnote <workitemId> <processInstanceId>"))
            }
            ("raw", []) => Command::Raw,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            ("logout" | "status" | "raw", _) => return Err(CommandError::Usage("takes no arguments")),
            (other, _) => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Run one command and render its outcome. Returns whether it succeeded.
pub async fn execute<T, W>(
    client: &mut SessionApiClient<T>,
    command: Command,
    out: &mut W,
) -> io::Result<bool>
where
    T: Transport,
    W: Write,
{
    match command {
        Command::Login { username, password } => match client.login(&username, &password).await {
            Ok(session) => render::render_session(out, &session).map(|_| true),
            Err(err) => render::render_failure(out, &err).map(|_| false),
        },
        Command::Logout => {
            client.logout();
            writeln!(out, "Logged out.")?;
            Ok(true)
        }
        Command::Status => {
            writeln!(out, "Backend: {}", client.base_url())?;
            match client.session() {
                Some(session) => {
                    writeln!(out, "Logged in")?;
                    render::render_session_details(out, session)?;
                }
                None => writeln!(out, "Not logged in")?,
            }
            Ok(true)
        }
        Command::Docs {
            workitem_id,
            process_instance_id,
        } => match client
            .list_supporting_documents(&workitem_id, &process_instance_id)
            .await
        {
            Ok(list) => render::render_documents(out, &list).map(|_| true),
            Err(err) => render::render_failure(out, &err).map(|_| false),
        },
        Command::PdfNote {
            workitem_id,
            process_instance_id,
        } => match client.create_pdf_note(&workitem_id, &process_instance_id).await {
            Ok(note) => render::render_pdf_note(out, &note).map(|_| true),
            Err(err) => render::render_failure(out, &err).map(|_| false),
        },
        Command::Raw => match client.last_response() {
            Some(response) => render::render_raw(out, response).map(|_| true),
            None => {
                writeln!(out, "No response yet")?;
                Ok(false)
            }
        },
        Command::Help => {
            writeln!(out, "{HELP}")?;
            Ok(true)
        }
        Command::Quit => Ok(true),
    }
}

/// Whether a line may be kept in the editor history. Lines carrying a
/// password never are.
fn keep_in_history(command: &Command) -> bool {
    !matches!(command, Command::Login { .. })
}

/// Read commands from the terminal until `quit`, Ctrl-D or an input error.
pub async fn run<T: Transport>(client: &mut SessionApiClient<T>) -> anyhow::Result<()> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .build();
    let mut editor: Editor<(), DefaultHistory> = Editor::with_config(config)?;
    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "notesheet shell on {} (type `help` for commands)",
        client.base_url()
    )?;

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                writeln!(stdout, "(interrupted, type `quit` to exit)")?;
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                warn!(error = %err, "input error");
                break;
            }
        };

        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                if keep_in_history(&command) {
                    editor.add_history_entry(line.as_str())?;
                }
                execute(client, command, &mut stdout).await?;
            }
            Err(err) => writeln!(stdout, "{err}")?,
        }
    }
    Ok(())
}
