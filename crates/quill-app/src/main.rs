//! Quill application binary - composition root.
//!
//! Ties together all Quill crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the history store in the data directory
//! 3. Build the Gemini client and the chat session
//! 4. Run the interactive prompt loop (or a one-shot subcommand)
//!
//! Everything runs on a current-thread runtime: the session is the only
//! writer and the reveal timer is the only background task, so a single
//! event loop keeps supersession of reveals free of stale frames.

mod cli;

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use quill_ai::GeminiClient;
use quill_chat::{ChatSession, SubmitOutcome};
use quill_core::config::QuillConfig;
use quill_core::types::{Conversation, DataDir};
use quill_export::{
    export_response, ConversationView, ExportOutcome, PdfSnapshotWriter, SnapshotExporter,
    TextRasterizer,
};
use quill_history::HistoryStore;
use quill_reveal::Typewriter;

use cli::{CliArgs, Command, ConfigAction, HistoryAction};

type SnapshotPdfExporter = SnapshotExporter<TextRasterizer, PdfSnapshotWriter>;

/// Run the interactive chat loop until EOF or `:quit`.
async fn run_chat(config: QuillConfig, data_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let client = match GeminiClient::from_config(&config.ai) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start chat");
            return Err(e.into());
        }
    };

    let store = HistoryStore::new(&data_dir);
    let typewriter = Typewriter::new(Duration::from_millis(config.reveal.speed_ms));
    let mut session = ChatSession::new(client, store, typewriter);

    let exporter = SnapshotPdfExporter::new(
        TextRasterizer::new(),
        PdfSnapshotWriter,
        config.export.clone(),
    );
    let export_dir = data_dir.join("exports");
    std::fs::create_dir_all(&export_dir)?;

    println!("quill v{} (model: {})", env!("CARGO_PKG_VERSION"), config.ai.model);
    if !session.conversations().is_empty() {
        println!(
            "{} saved conversation(s). :history to browse, :help for commands.",
            session.conversations().len()
        );
    } else {
        println!("Ask anything, or :help for commands.");
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[{}] quill> ", Local::now().format("%H:%M:%S"));
        std::io::stdout().flush()?;
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = &mut ctrl_c => {
                println!();
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match parts.next() {
                Some("help") => print_help(),
                Some("history") => print_history(session.conversations()),
                Some("select") => {
                    let picked = parts
                        .next()
                        .and_then(|raw| raw.parse::<usize>().ok())
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| session.conversations().get(i).map(|c| c.id.clone()));
                    match picked {
                        Some(id) => {
                            session.select(&id);
                            if let Some(record) = session.current() {
                                println!("{}", record.prompt);
                            }
                            print_reveal(&session).await;
                        }
                        None => println!("Usage: :select <n> (positions are listed by :history)"),
                    }
                }
                Some("new") => {
                    session.new_chat();
                    println!("Started a new chat.");
                }
                Some("clear") => {
                    print!("Delete all saved conversations? [y/N] ");
                    std::io::stdout().flush()?;
                    if read_confirmation(&mut lines).await? {
                        session.clear_history();
                        println!("History cleared.");
                    } else {
                        println!("Canceled.");
                    }
                }
                Some("export") => match session.current() {
                    Some(record) => {
                        let outcome = export_response(
                            &record.prompt,
                            &record.response,
                            &export_dir,
                            config.export.margin_mm,
                        );
                        report_export(outcome);
                    }
                    None => println!("No conversation selected."),
                },
                Some("snapshot") => match session.current() {
                    Some(record) => {
                        let view = ConversationView {
                            prompt: record.prompt.clone(),
                            response: record.response.clone(),
                        };
                        let outcome = exporter.export(view, &export_dir, &record.prompt).await;
                        report_export(outcome);
                    }
                    None => println!("No conversation selected."),
                },
                Some("copy") => match session.current() {
                    Some(record) => match copy_to_clipboard(&record.response) {
                        Ok(()) => println!("Copied response to clipboard."),
                        Err(e) => eprintln!("Copy failed: {e}"),
                    },
                    None => println!("No conversation selected."),
                },
                Some("quit") | Some("q") => break,
                Some(other) => println!("Unknown command :{other}. Try :help."),
                None => println!("Unknown command. Try :help."),
            }
            continue;
        }

        match session.submit(line).await {
            SubmitOutcome::Submitted { .. } => print_reveal(&session).await,
            SubmitOutcome::Failed => {
                if let Some(message) = session.error() {
                    eprintln!("error: {message}");
                }
            }
            SubmitOutcome::EmptyPrompt | SubmitOutcome::Busy => {}
        }
    }

    Ok(())
}

/// Print reveal frames as they arrive, one growing prefix per frame, until
/// the reveal reports completion.
async fn print_reveal(session: &ChatSession<GeminiClient>) {
    let mut rx = session.subscribe();
    let mut printed = 0usize;
    loop {
        let frame = rx.borrow_and_update().clone();
        if frame.text.len() > printed {
            print!("{}", &frame.text[printed..]);
            let _ = std::io::stdout().flush();
            printed = frame.text.len();
        }
        if frame.finished {
            break;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
    println!();
}

async fn read_confirmation(
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_history(records: &[Conversation]) {
    if records.is_empty() {
        println!("No conversations saved.");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        println!(
            "{:>3}. [{}] {}",
            i + 1,
            record
                .created_at()
                .with_timezone(&Local)
                .format("%b %-d, %-I:%M %p"),
            preview(&record.prompt)
        );
    }
}

/// First line of the prompt, capped for the history listing.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    let mut preview: String = line.chars().take(60).collect();
    if preview.len() < line.len() {
        preview.push_str("...");
    }
    preview
}

fn report_export(outcome: Result<ExportOutcome, quill_export::ExportError>) {
    match outcome {
        Ok(ExportOutcome::Saved(path)) => println!("Saved {}", path.display()),
        Ok(ExportOutcome::Skipped) => println!("Nothing to export."),
        Err(e) => eprintln!("Export failed: {e}"),
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  :history      list saved conversations, newest first");
    println!("  :select <n>   replay a saved conversation");
    println!("  :new          start a new chat");
    println!("  :clear        delete all saved conversations");
    println!("  :export       save the current response as a text PDF");
    println!("  :snapshot     save the current view as a raster PDF");
    println!("  :copy         copy the current response to the clipboard");
    println!("  :quit         exit");
    println!("Anything else is sent to the model as a prompt.");
}

/// Expand ~ to the home directory in a configured path.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    PathBuf::from(DataDir::new(data_dir.to_string()).0)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = QuillConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing. Logs go to stderr so they never interleave with the chat
    // transcript on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting quill v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let data_dir = resolve_data_dir(&config.general.data_dir);

    match args.command {
        Some(Command::History { action }) => match action {
            HistoryAction::List => {
                print_history(&HistoryStore::new(&data_dir).load());
            }
            HistoryAction::Clear { yes } => {
                if !yes {
                    print!("Delete all saved conversations? [y/N] ");
                    std::io::stdout().flush()?;
                    let mut answer = String::new();
                    std::io::stdin().read_line(&mut answer)?;
                    if !matches!(answer.trim(), "y" | "Y" | "yes") {
                        println!("Canceled.");
                        return Ok(());
                    }
                }
                HistoryStore::new(&data_dir).clear();
                println!("History cleared.");
            }
        },
        Some(Command::Export {
            index,
            snapshot,
            out_dir,
        }) => {
            let records = HistoryStore::new(&data_dir).load();
            let Some(record) = index.checked_sub(1).and_then(|i| records.get(i)) else {
                return Err(format!(
                    "no conversation at position {} ({} saved)",
                    index,
                    records.len()
                )
                .into());
            };
            let out_dir = out_dir.unwrap_or_else(|| data_dir.join("exports"));
            std::fs::create_dir_all(&out_dir)?;
            let outcome = if snapshot {
                let exporter = SnapshotPdfExporter::new(
                    TextRasterizer::new(),
                    PdfSnapshotWriter,
                    config.export.clone(),
                );
                let view = ConversationView {
                    prompt: record.prompt.clone(),
                    response: record.response.clone(),
                };
                exporter.export(view, &out_dir, &record.prompt).await?
            } else {
                export_response(
                    &record.prompt,
                    &record.response,
                    &out_dir,
                    config.export.margin_mm,
                )?
            };
            match outcome {
                ExportOutcome::Saved(path) => println!("Saved {}", path.display()),
                ExportOutcome::Skipped => println!("Nothing to export."),
            }
        }
        Some(Command::Config { action }) => match action {
            ConfigAction::Path => println!("{}", config_file.display()),
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
        },
        Some(Command::Chat) | None => {
            if let Err(e) = std::fs::create_dir_all(&data_dir) {
                tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
                return Err(e.into());
            }
            run_chat(config, data_dir).await?;
        }
    }

    Ok(())
}
