//! RsvpNotes CLI - manage the note tree and read notes word by word

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rsvpnotes::app::{self, AppState};
use rsvpnotes::reader::{PlaybackState, ReaderFrame};
use rsvpnotes::services::delta_from_text;
use rsvpnotes::tree::{TreeSnapshot, UpdateFolderRequest, UpdateNoteRequest};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rsvpnotes")]
#[command(about = "Notes with a speed reader", long_about = None)]
struct Cli {
    /// Directory holding data.json and settings.json
    #[arg(long, default_value = "./rsvpnotes-data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the folder tree and the trash
    List,

    /// Create a folder
    NewFolder {
        /// Parent folder id (root when omitted)
        #[arg(long)]
        parent: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Create a note
    NewNote {
        /// Folder id (root when omitted)
        #[arg(long)]
        folder: Option<String>,

        #[arg(long)]
        title: Option<String>,

        /// Plain text body
        #[arg(long)]
        text: Option<String>,
    },

    /// Move a note to the trash, or delete it for good if already trashed
    Trash { id: String },

    /// Bring a note back from the trash
    Restore { id: String },

    /// Permanently delete every trashed note
    EmptyTrash,

    /// Delete a folder; its contents move up one level
    DeleteFolder { id: String },

    /// Move a folder under another folder (root when --to is omitted)
    MoveFolder {
        id: String,

        #[arg(long)]
        to: Option<String>,
    },

    /// Move a note into a folder (root when --to is omitted)
    MoveNote {
        id: String,

        #[arg(long)]
        to: Option<String>,
    },

    /// Play a note word by word
    Read {
        id: String,

        /// Override the stored speed for this session
        #[arg(long)]
        wpm: Option<u32>,

        /// Ramp the speed up while reading
        #[arg(long)]
        training: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rsvpnotes=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting RsvpNotes");

    let state = app::setup(&cli.data_dir)
        .await
        .with_context(|| format!("failed to open data directory {:?}", cli.data_dir))?;

    run(&state, cli.command).await?;

    state.shutdown().await.context("failed to save notes")?;
    Ok(())
}

async fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    let notes = &state.notes_service;

    match command {
        Commands::List => {
            print_tree(&notes.snapshot().await);
        }
        Commands::NewFolder { parent, name } => {
            let Some(folder) = notes.create_folder(parent.as_deref()).await else {
                bail!("unknown parent folder");
            };
            if let Some(name) = name {
                notes
                    .update_folder(
                        &folder.id,
                        UpdateFolderRequest {
                            name: Some(name),
                            ..Default::default()
                        },
                    )
                    .await;
            }
            println!("{}", folder.id);
        }
        Commands::NewNote {
            folder,
            title,
            text,
        } => {
            let Some(note) = notes.create_note(folder.as_deref()).await else {
                bail!("unknown folder");
            };
            notes
                .update_note(
                    &note.id,
                    UpdateNoteRequest {
                        title,
                        content: text.as_deref().map(delta_from_text),
                        order: None,
                    },
                )
                .await;
            println!("{}", note.id);
        }
        Commands::Trash { id } => {
            notes.delete_note(&id).await;
        }
        Commands::Restore { id } => {
            notes.restore_note(&id).await;
        }
        Commands::EmptyTrash => {
            let before = notes.list_trash().await.len();
            notes.empty_trash().await;
            println!("Deleted {} notes", before);
        }
        Commands::DeleteFolder { id } => {
            notes.delete_folder(&id).await;
        }
        Commands::MoveFolder { id, to } => {
            let snapshot = notes.move_folder(&id, to.as_deref()).await;
            let moved = snapshot
                .folders
                .iter()
                .any(|f| f.id == id && f.parent_id == to);
            if !moved {
                bail!("folder move declined");
            }
        }
        Commands::MoveNote { id, to } => {
            notes.move_note(&id, to.as_deref()).await;
        }
        Commands::Read { id, wpm, training } => {
            read(state, &id, wpm, training).await?;
        }
    }

    Ok(())
}

async fn read(state: &AppState, id: &str, wpm: Option<u32>, training: bool) -> anyhow::Result<()> {
    let mut pacing = state.settings_service.load().await.pacing();
    if let Some(wpm) = wpm {
        pacing.wpm = wpm;
    }
    pacing.training_mode |= training;
    state.reader.configure(pacing).await;

    let mut frames = state.reader.subscribe();
    if !state.open_in_reader(id).await {
        bail!("nothing to read in note {}", id);
    }
    state.reader.toggle_play().await;

    let mut out = std::io::stdout();
    loop {
        let frame = frames.borrow_and_update().clone();
        render(&mut out, &frame)?;
        if frame.state == PlaybackState::Finished {
            break;
        }
        frames.changed().await?;
    }
    writeln!(out)?;

    Ok(())
}

fn render(out: &mut impl Write, frame: &ReaderFrame) -> std::io::Result<()> {
    let word = match &frame.split {
        Some(split) => format!("{}[{}]{}", split.prefix, split.focus, split.suffix),
        None => String::new(),
    };
    write!(
        out,
        "\r\x1b[2K{:>4}/{:<4} {:>3} wpm  {}",
        frame.position, frame.total, frame.effective_wpm, word
    )?;
    out.flush()
}

fn print_tree(snapshot: &TreeSnapshot) {
    print_level(snapshot, None, 0);

    let trash: Vec<_> = snapshot.notes.iter().filter(|n| n.is_trashed()).collect();
    if !trash.is_empty() {
        println!("Trash");
        for note in trash {
            println!("  {}  {}", note.title, note.id);
        }
    }
}

fn print_level(snapshot: &TreeSnapshot, parent: Option<&str>, depth: usize) {
    let indent = "  ".repeat(depth);

    let mut folders: Vec<_> = snapshot
        .folders
        .iter()
        .filter(|f| f.parent_id.as_deref() == parent)
        .collect();
    folders.sort_by_key(|f| f.order);

    for folder in folders {
        let marker = if folder.collapsed { "+" } else { "-" };
        println!("{}{} {}/  {}", indent, marker, folder.name, folder.id);
        if !folder.collapsed {
            print_level(snapshot, Some(&folder.id), depth + 1);
        }
    }

    let mut notes: Vec<_> = snapshot
        .notes
        .iter()
        .filter(|n| !n.is_trashed() && n.folder_id.folder_id() == parent)
        .collect();
    notes.sort_by_key(|n| n.order);

    for note in notes {
        let active = if snapshot.active_note_id.as_deref() == Some(note.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{}{} {}  {}", indent, active, note.title, note.id);
    }
}
