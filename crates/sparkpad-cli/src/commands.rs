// SPDX-License-Identifier: AGPL-3.0-or-later
//! Input line parsing and command execution

use anyhow::{anyhow, bail, Context};
use sparkpad_core::{
    BlockType, Editor, EditorCommand, InlineStyle, KeyValueStore, SelectionState,
};

/// Document summary printed after commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub blocks: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub block_type: BlockType,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Characters to type
    Text(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(EditorCommand),
    /// Select `start..end` inside the current block
    Select(usize, usize),
    Save,
    Preview,
    Styles,
    Help,
    Quit,
}

pub const HELP: &str = "\
:enter              split the block at the cursor
:back               delete backwards
:bold :italic :underline :code
:style NAME         toggle a style from the style map
:type BLOCK_TYPE    e.g. header-two, blockquote, unstyled
:select START END   select a range in the current block
:save               save now
:preview            show the sanitized preview
:styles             list declared styles
:quit";

/// Parse a line: `:`-prefixed lines are commands, anything else is text
pub fn parse(line: &str) -> anyhow::Result<Input> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Input::Text(line.to_string()));
    };
    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("enter", []) => Command::Edit(EditorCommand::SplitBlock),
        ("back", []) => Command::Edit(EditorCommand::Backspace),
        ("bold", []) => toggle(InlineStyle::Bold),
        ("italic", []) => toggle(InlineStyle::Italic),
        ("underline", []) => toggle(InlineStyle::Underline),
        ("code", []) => toggle(InlineStyle::Code),
        ("style", [style]) => toggle(InlineStyle::new(style)),
        ("type", [block_type]) => Command::Edit(EditorCommand::SetBlockType(block_type.parse()?)),
        ("select", [start, end]) => Command::Select(
            start.parse().with_context(|| format!("invalid offset {start}"))?,
            end.parse().with_context(|| format!("invalid offset {end}"))?,
        ),
        ("save", []) => Command::Save,
        ("preview", []) => Command::Preview,
        ("styles", []) => Command::Styles,
        ("help", []) => Command::Help,
        ("quit" | "q", []) => Command::Quit,
        ("", _) => bail!("empty command, try :help"),
        (other, _) => return Err(anyhow!("unknown command or arguments: :{other}")),
    };
    Ok(Input::Command(command))
}

fn toggle(style: InlineStyle) -> Command {
    Command::Edit(EditorCommand::ToggleInlineStyle(style))
}

/// Summary of the editor's current document
pub fn document_meta<S: KeyValueStore>(editor: &Editor<S>) -> DocumentMeta {
    let preview = editor.preview();
    let state = editor.state();
    let block_type = state
        .content()
        .block_for_key(&state.selection().anchor.key)
        .map(|b| b.block_type())
        .unwrap_or_default();
    DocumentMeta {
        blocks: preview.stats.block_count,
        word_count: preview.stats.word_count,
        char_count: preview.stats.char_count,
        block_type,
    }
}

/// Map a `:select` on the current block to a selection
pub fn select_in_current_block<S: KeyValueStore>(
    editor: &Editor<S>,
    start: usize,
    end: usize,
) -> EditorCommand {
    let key = editor.state().selection().anchor.key.clone();
    EditorCommand::Select(SelectionState::range(key.clone(), start, key, end))
}
