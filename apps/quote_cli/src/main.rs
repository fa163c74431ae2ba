use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quote_core::{
    validation, Action, IntakeClient, KeyValueStore, MissingQuoteSubmitter, QuoteSession,
    QuoteSubmitter, QuoteView,
};
use shared::{
    domain::{AddonKind, BracketType, SizeClass, WallType},
    error::QuoteError,
    protocol::{ContactForm, PhotoFile},
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_catalog, load_settings, prepare_database_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "quote", about = "Build and submit TV mounting quotes")]
struct Cli {
    /// Overrides the configured database url.
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current quote.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Pick the TV size: up-to-55, 56-75, over-75.
    Size { size: SizeClass },
    /// Pick the bracket: own, tilting, full-motion.
    Bracket { bracket: BracketType },
    /// Pick the wall: drywall-no-fp, drywall-above-fp, plaster, other, commercial, not-sure.
    Wall { wall: WallType },
    /// Toggle an add-on: concealment, cord-cover, soundbar, hdmi.
    Addon { addon: AddonKind },
    /// Add the selection to the quote, or save the TV being edited.
    Commit,
    /// Load a TV from the quote for editing.
    Edit {
        #[arg(value_parser = parse_position)]
        tv: usize,
    },
    /// Remove a TV from the quote.
    Remove {
        #[arg(value_parser = parse_position)]
        tv: usize,
    },
    /// Discard the current selection without touching the quote.
    Cancel,
    /// Remove every TV and the current selection.
    Clear,
    /// Check the quote is ready for booking.
    Proceed,
    /// Print the quote as it is sent with a booking request.
    Text,
    /// Send the quote with contact details and optional photos.
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        message: Option<String>,
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
}

/// Parses a 1-based TV position into a cart index.
fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => Err(format!("'{raw}' is not a TV number (1, 2, ...)")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings();
    let database_url =
        prepare_database_url(cli.database_url.as_deref().unwrap_or(&settings.database_url))?;
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open quote store at '{database_url}'"))?;
    let catalog = load_catalog(settings.catalog_path.as_deref())?;
    let mut session = QuoteSession::open(storage, catalog).await;

    if let Err(err) = run(&mut session, &settings, cli.command).await {
        let Some(quote_error) = err.downcast_ref::<QuoteError>() else {
            return Err(err);
        };
        eprintln!("error [{}]: {quote_error}", quote_error.code().as_str());
        std::process::exit(2);
    }
    Ok(())
}

async fn run<S: KeyValueStore>(
    session: &mut QuoteSession<S>,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    let action = match command {
        Command::Show { json } => {
            let view = session.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render_view(&view));
            }
            return Ok(());
        }
        Command::Text => {
            println!("{}", session.quote_text());
            return Ok(());
        }
        Command::Proceed => {
            let proceeded = session.proceed().await?;
            if let Some(committed) = proceeded.committed {
                println!("Added TV {} to the quote.", committed.index() + 1);
            }
            println!("Ready to book. Estimate: ${}", session.grand_total());
            return Ok(());
        }
        Command::Submit {
            name,
            email,
            phone,
            city,
            message,
            photos,
        } => {
            let contact = ContactForm {
                name,
                email,
                phone: validation::format_phone(&phone),
                city,
                message,
            };
            let photos = read_photos(&photos).await?;
            let submitter = build_submitter(settings)?;
            let receipt = session
                .submit(submitter.as_ref(), contact, photos)
                .await?;
            println!(
                "Quote request sent at {}.",
                receipt.submitted_at.format("%Y-%m-%d %H:%M UTC")
            );
            if !receipt.photo_urls.is_empty() {
                println!("Photos attached: {}", receipt.photo_urls.len());
            }
            if receipt.photos_dropped > 0 {
                println!("Photos not uploaded: {}", receipt.photos_dropped);
            }
            return Ok(());
        }
        Command::Size { size } => Action::SelectSize(size),
        Command::Bracket { bracket } => Action::SelectBracket(bracket),
        Command::Wall { wall } => Action::SelectWall(wall),
        Command::Addon { addon } => Action::ToggleAddon(addon),
        Command::Commit => Action::Commit,
        Command::Edit { tv } => Action::BeginEdit(tv),
        Command::Remove { tv } => Action::Remove(tv),
        Command::Cancel => Action::ResetSelection,
        Command::Clear => Action::ClearAll,
    };

    let view = session.dispatch(action).await?;
    print!("{}", render_view(&view));
    Ok(())
}

fn build_submitter(settings: &Settings) -> Result<Box<dyn QuoteSubmitter>> {
    let Some(intake_url) = &settings.intake_url else {
        return Ok(Box::new(MissingQuoteSubmitter));
    };
    let client = IntakeClient::new(intake_url, settings.media_host()?)?;
    Ok(Box::new(client))
}

async fn read_photos(paths: &[PathBuf]) -> Result<Vec<PhotoFile>> {
    let mut photos = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read photo '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        info!(filename = %filename, bytes = bytes.len(), "cli: attaching photo");
        photos.push(PhotoFile {
            filename,
            mime_type,
            bytes,
        });
    }
    Ok(photos)
}

fn render_view(view: &QuoteView) -> String {
    let mut out = String::new();

    for line in &view.lines {
        out.push_str(&line.title);
        out.push('\n');
        for row in &line.rows {
            out.push_str(&format!("  {:<40}{:>8}\n", row.label, row.amount.to_string()));
        }
    }
    if let Some(rows) = &view.pending_line {
        out.push_str("Current selection\n");
        for row in rows {
            out.push_str(&format!("  {:<40}{:>8}\n", row.label, row.amount.to_string()));
        }
    }
    if view.lines.is_empty() && view.pending_line.is_none() {
        out.push_str("No TVs in the quote yet.\n");
    }

    out.push_str(&format!("Estimate: ${}\n", view.grand_total));
    if view.can_add_more {
        out.push_str(&format!("Next: {}\n", view.commit_label));
    }
    out
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
