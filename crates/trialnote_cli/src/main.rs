//! Interactive trialnote entry point.
//!
//! # Responsibility
//! - Map command-line flags onto `AppConfig`.
//! - Run the login/registration prompt, then the numbered note menu.
//! - Start autosave and trial watchdog threads for the session.

use clap::Parser;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use trialnote_core::{
    default_log_level, init_logging, AppConfig, AutosaveLoop, CorruptSnapshotPolicy,
    CredentialError, CredentialStore, JsonSnapshotRepository, NoteStore, NoteStoreError,
    PersistOutcome, ProcessTerminator, SessionContext, TrialClock, TrialWatchdog,
};

#[derive(Parser)]
#[command(name = "trialnote", version)]
#[command(about = "Personal notes with periodic autosave and a trial window")]
struct Cli {
    /// Directory holding users.json and per-user note snapshots.
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Log directory. Defaults to `<data-dir>/logs`.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Seconds between automatic snapshot saves.
    #[arg(long, default_value_t = 5)]
    autosave_secs: u64,

    /// Length of the trial window in minutes.
    #[arg(long, default_value_t = 30)]
    trial_minutes: u64,

    /// Seconds between trial expiry checks.
    #[arg(long, default_value_t = 60)]
    watchdog_secs: u64,

    /// Move an unreadable snapshot aside and start empty instead of failing.
    #[arg(long)]
    reset_corrupt_snapshot: bool,
}

impl Cli {
    fn into_config(self) -> io::Result<AppConfig> {
        std::fs::create_dir_all(&self.data_dir)?;
        let data_dir = std::fs::canonicalize(&self.data_dir)?;
        let log_dir = match self.log_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => data_dir.join("logs"),
        };
        let corrupt_snapshot_policy = if self.reset_corrupt_snapshot {
            CorruptSnapshotPolicy::ResetToEmpty
        } else {
            CorruptSnapshotPolicy::Fail
        };

        Ok(AppConfig {
            data_dir,
            log_dir: Some(log_dir),
            log_level: self.log_level,
            autosave_interval: Duration::from_secs(self.autosave_secs),
            trial_duration: Duration::from_secs(self.trial_minutes.saturating_mul(60)),
            watchdog_interval: Duration::from_secs(self.watchdog_secs),
            corrupt_snapshot_policy,
        })
    }
}

/// Line-oriented prompt over stdin. `None` means stdin is closed.
struct Prompt<R: BufRead> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{label}")?;
        stdout.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = cli
        .into_config()
        .map_err(|err| format!("failed to prepare data directory: {err}"))?;
    config.validate().map_err(|err| err.to_string())?;

    if let Some(log_dir) = config.log_dir.as_ref() {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok version={} data_dir={}",
        trialnote_core::core_version(),
        config.data_dir.display()
    );

    let mut prompt = Prompt {
        input: io::stdin().lock(),
    };
    let Some(ctx) = sign_in(&config, &mut prompt)? else {
        return Ok(());
    };

    let repo = JsonSnapshotRepository::open(&config.data_dir).map_err(|err| err.to_string())?;
    let store = NoteStore::open(ctx, repo, config.corrupt_snapshot_policy)
        .map(Arc::new)
        .map_err(|err| match err {
            NoteStoreError::Repo(inner) => format!(
                "{inner} (rerun with --reset-corrupt-snapshot to start with an empty note list)"
            ),
            other => other.to_string(),
        })?;

    AutosaveLoop::new(Arc::clone(&store), config.autosave_interval)
        .spawn()
        .map_err(|err| format!("failed to start autosave: {err}"))?;
    let clock = TrialClock::new(store.session().started_at(), config.trial_duration);
    TrialWatchdog::new(
        clock,
        config.watchdog_interval,
        store.owner().clone(),
        ProcessTerminator,
    )
    .spawn()
    .map_err(|err| format!("failed to start trial watchdog: {err}"))?;

    menu_loop(&store, &mut prompt).map_err(|err| format!("terminal i/o failed: {err}"))?;

    match store.persist_now() {
        Ok(PersistOutcome::Written { notes }) => println!("Saved {notes} note(s)."),
        Ok(PersistOutcome::Unchanged) => {}
        Err(err) => eprintln!("Final save failed: {err}"),
    }
    info!("event=cli_exit module=cli status=ok owner={}", store.owner());
    trialnote_core::flush_logs();
    Ok(())
}

fn sign_in<R: BufRead>(
    config: &AppConfig,
    prompt: &mut Prompt<R>,
) -> Result<Option<SessionContext>, String> {
    let io_err = |err: io::Error| format!("terminal i/o failed: {err}");
    let mut credentials =
        CredentialStore::open(config.credentials_path()).map_err(|err| err.to_string())?;

    let Some(username) = prompt.ask("Username: ").map_err(io_err)? else {
        return Ok(None);
    };
    let Some(password) = prompt.ask("Password: ").map_err(io_err)? else {
        return Ok(None);
    };
    if let Some(ctx) = credentials.authenticate(&username, &password) {
        println!("Signed in.");
        return Ok(Some(ctx));
    }
    println!("Wrong username or password.");

    let answer = prompt
        .ask("Register a new account? (yes/no): ")
        .map_err(io_err)?
        .unwrap_or_default();
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        return Ok(None);
    }

    loop {
        let Some(username) = prompt.ask("New username: ").map_err(io_err)? else {
            return Ok(None);
        };
        let Some(password) = prompt.ask("New password: ").map_err(io_err)? else {
            return Ok(None);
        };
        match credentials.register(&username, &password) {
            Ok(owner) => {
                println!("Registration complete.");
                return Ok(Some(SessionContext::new(owner)));
            }
            Err(err @ (CredentialError::UserExists(_) | CredentialError::InvalidOwner(_))) => {
                println!("{err}. Try again.");
            }
            Err(err) => return Err(err.to_string()),
        }
    }
}

fn menu_loop<R: BufRead>(
    store: &NoteStore<JsonSnapshotRepository>,
    prompt: &mut Prompt<R>,
) -> io::Result<()> {
    loop {
        println!();
        println!("1. Show notes");
        println!("2. Add note");
        println!("3. Remove note");
        println!("4. Edit note");
        println!("5. Quit");
        let Some(choice) = prompt.ask("Choose an action: ")? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                let notes = store.list();
                if notes.is_empty() {
                    println!("No notes yet.");
                }
                for note in notes {
                    println!("{}: {}", note.title, note.content);
                }
            }
            "2" => {
                let Some(title) = prompt.ask("Title: ")? else {
                    return Ok(());
                };
                let Some(content) = prompt.ask("Content: ")? else {
                    return Ok(());
                };
                match store.add(title, content) {
                    Ok(()) => println!("Note added."),
                    Err(NoteStoreError::DuplicateTitle(_)) => {
                        println!("A note with this title already exists. Pick another title.")
                    }
                    Err(err) => println!("Could not add note: {err}"),
                }
            }
            "3" => {
                let Some(title) = prompt.ask("Title to remove: ")? else {
                    return Ok(());
                };
                match store.remove(&title) {
                    0 => println!("No note with that title; nothing removed."),
                    _ => println!("Note removed."),
                }
            }
            "4" => {
                let Some(title) = prompt.ask("Title to edit: ")? else {
                    return Ok(());
                };
                let Some(content) = prompt.ask("New content: ")? else {
                    return Ok(());
                };
                match store.edit(&title, content) {
                    Ok(()) => println!("Note updated."),
                    Err(NoteStoreError::NotFound(_)) => println!("Note not found."),
                    Err(err) => println!("Could not edit note: {err}"),
                }
            }
            "5" => return Ok(()),
            other => {
                println!("Invalid choice. Pick an action from 1 to 5.");
                warn!(
                    "event=menu_choice module=cli status=invalid owner={} choice={:?}",
                    store.owner(),
                    other.chars().take(16).collect::<String>()
                );
            }
        }
    }
}
