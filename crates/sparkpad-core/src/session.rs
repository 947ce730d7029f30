// SPDX-License-Identifier: AGPL-3.0-or-later
//! Editor session: keystrokes, toolbar commands, persistence and preview

use crate::config::{EditorConfig, StyleMap};
use crate::model::{BlockType, EditorState, InlineStyle, SelectionState};
use crate::persistence::PersistenceAdapter;
use crate::preview::{HtmlEscaper, Preview, RenderedPreview};
use crate::rules::{Decision, RuleEngine};
use crate::traits::{EditorError, KeyValueStore, Result, Sanitizer};

/// Toolbar and keyboard actions besides plain typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    ToggleInlineStyle(InlineStyle),
    SetBlockType(BlockType),
    /// Enter
    SplitBlock,
    Backspace,
    Select(SelectionState),
}

/// How a typed character was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// Consumed by a formatting trigger
    Formatted,
    Inserted,
}

/// One live document bound to a store
#[derive(Debug)]
pub struct Editor<S, Z = HtmlEscaper> {
    state: EditorState,
    rules: RuleEngine,
    persistence: PersistenceAdapter<S>,
    preview: Preview<Z>,
    style_map: StyleMap,
}

impl<S: KeyValueStore> Editor<S, HtmlEscaper> {
    /// Restore the stored document and start editing at its end
    pub fn open(config: &EditorConfig, store: S) -> Result<Self> {
        Self::open_with_sanitizer(config, store, HtmlEscaper)
    }
}

impl<S: KeyValueStore, Z: Sanitizer> Editor<S, Z> {
    pub fn open_with_sanitizer(config: &EditorConfig, store: S, sanitizer: Z) -> Result<Self> {
        config.validate()?;
        let persistence = PersistenceAdapter::new(store, config.storage_key.clone());
        let content = persistence.load_initial()?;
        Ok(Self {
            state: EditorState::create_with_content(content),
            rules: RuleEngine::from_config(config),
            persistence,
            preview: Preview::with_sanitizer(sanitizer),
            style_map: config.style_map.clone(),
        })
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn style_map(&self) -> &StyleMap {
        &self.style_map
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Type one character, letting the trigger rules intercept it
    pub fn type_char(&mut self, character: char) -> Result<Keystroke> {
        let (next, keystroke) = match self.rules.on_before_character(character, &self.state) {
            Decision::Handled(next) => (next, Keystroke::Formatted),
            Decision::NotHandled => {
                let mut buf = [0u8; 4];
                (self.state.insert_text(character.encode_utf8(&mut buf)), Keystroke::Inserted)
            }
        };
        self.commit(next)?;
        Ok(keystroke)
    }

    /// Type every character of `text`
    ///
    /// A failed write does not stop typing; the first failure is returned
    /// once all characters are in the document.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        let mut first_error = None;
        for character in text.chars() {
            if let Err(e) = self.type_char(character) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn apply(&mut self, command: EditorCommand) -> Result<()> {
        let next = match command {
            EditorCommand::ToggleInlineStyle(style) => {
                if !self.style_map.is_recognized(&style) {
                    return Err(EditorError::UnknownStyle(style.name().to_string()));
                }
                self.state.toggle_inline_style(&style)
            }
            EditorCommand::SetBlockType(block_type) => {
                self.state.set_block_type(self.state.selection(), block_type)
            }
            EditorCommand::SplitBlock => self.state.split_block(),
            EditorCommand::Backspace => self.state.backspace(),
            EditorCommand::Select(selection) => self.state.with_selection(selection),
        };
        self.commit(next)
    }

    /// Explicit save
    pub fn save(&mut self) -> Result<()> {
        self.persistence.save_now(self.state.content())?;
        Ok(())
    }

    pub fn preview(&self) -> RenderedPreview {
        self.preview.render(self.state.content())
    }

    pub fn into_store(self) -> S {
        self.persistence.into_store()
    }

    // The new state is kept even when the write fails.
    fn commit(&mut self, next: EditorState) -> Result<()> {
        self.state = next;
        self.persistence.on_change(self.state.content())?;
        Ok(())
    }
}
