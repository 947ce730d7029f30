// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sparkpad terminal front-end
//!
//! Lines typed on stdin are fed to the editor one character at a time, so
//! `#`, `*`, `$` and `@` at the start of an empty block trigger formatting.
//! Lines starting with `:` are commands (see `:help`).

mod commands;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sparkpad_core::{Editor, EditorConfig, EditorError, FileStore};
use tracing_subscriber::EnvFilter;

use commands::{Command, Input};

#[derive(Debug, Parser)]
#[command(name = "sparkpad", version, about = "Rich-text editor with trigger formatting")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// File holding the key-value store
    #[arg(long, default_value = "sparkpad-store.json")]
    store: PathBuf,

    /// Storage key, overrides the configuration
    #[arg(long)]
    key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if let Some(key) = args.key {
        config.storage_key = key;
    }

    let store = FileStore::open(&args.store)
        .with_context(|| format!("opening store {}", args.store.display()))?;
    let mut editor = Editor::open(&config, store).context("opening editor")?;

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    writeln!(out, "sparkpad: type text, :help for commands")?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = match commands::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                continue;
            }
        };

        let result = match input {
            Input::Text(text) => editor.type_text(&text),
            Input::Command(Command::Edit(command)) => editor.apply(command),
            Input::Command(Command::Select(start, end)) => {
                let command = commands::select_in_current_block(&editor, start, end);
                editor.apply(command)
            }
            Input::Command(Command::Save) => editor.save(),
            Input::Command(Command::Preview) => {
                writeln!(out, "{}", editor.preview().html)?;
                Ok(())
            }
            Input::Command(Command::Styles) => {
                for name in editor.style_map().names() {
                    writeln!(out, "{name}")?;
                }
                Ok(())
            }
            Input::Command(Command::Help) => {
                writeln!(out, "{}", commands::HELP)?;
                Ok(())
            }
            Input::Command(Command::Quit) => break,
        };

        match result {
            Ok(()) => {}
            Err(EditorError::Storage(e)) => {
                tracing::warn!(error = %e, "change not persisted");
                writeln!(out, "warning: changes are not being saved: {e}")?;
            }
            Err(e) => writeln!(out, "error: {e}")?,
        }

        let meta = commands::document_meta(&editor);
        writeln!(
            out,
            "[{} | {} blocks, {} words, {} chars]",
            meta.block_type, meta.blocks, meta.word_count, meta.char_count
        )?;
    }

    Ok(())
}
