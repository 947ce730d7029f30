// SPDX-License-Identifier: AGPL-3.0-or-later
//! Collaborator seams and the crate error type
//!
//! The trigger rules only talk to a [`RichTextState`], storage goes through
//! a [`KeyValueStore`] and the preview through a [`Sanitizer`], so each
//! collaborator can be swapped without touching the core.

use crate::config::ConfigError;
use crate::model::{BlockKey, BlockType, EditorState, InlineStyle, SelectionState, StyleSet};
use crate::storage::StorageError;

/// Error type for editor operations
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown inline style: {0}")]
    UnknownStyle(String),

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
}

pub type Result<T> = std::result::Result<T, EditorError>;

/// Capability set of a rich-text engine state
///
/// Implementations are value types: every transformation returns a new
/// state and leaves `self` untouched.
pub trait RichTextState: Clone + PartialEq {
    fn selection(&self) -> &SelectionState;

    /// Text of a block, `None` when the key no longer exists
    fn block_text(&self, key: &BlockKey) -> Option<&str>;

    /// Style the next inserted character would get
    fn current_inline_style(&self) -> StyleSet;

    fn replace_text(&self, range: &SelectionState, text: &str, style: &StyleSet) -> Self;

    fn apply_inline_style(&self, range: &SelectionState, style: &InlineStyle) -> Self;

    fn set_block_type(&self, range: &SelectionState, block_type: BlockType) -> Self;

    fn toggle_inline_style(&self, style: &InlineStyle) -> Self;

    fn with_inline_style_override(&self, style: Option<StyleSet>) -> Self;
}

impl RichTextState for EditorState {
    fn selection(&self) -> &SelectionState {
        EditorState::selection(self)
    }

    fn block_text(&self, key: &BlockKey) -> Option<&str> {
        EditorState::block_text(self, key)
    }

    fn current_inline_style(&self) -> StyleSet {
        EditorState::current_inline_style(self)
    }

    fn replace_text(&self, range: &SelectionState, text: &str, style: &StyleSet) -> Self {
        EditorState::replace_text(self, range, text, style)
    }

    fn apply_inline_style(&self, range: &SelectionState, style: &InlineStyle) -> Self {
        EditorState::apply_inline_style(self, range, style)
    }

    fn set_block_type(&self, range: &SelectionState, block_type: BlockType) -> Self {
        EditorState::set_block_type(self, range, block_type)
    }

    fn toggle_inline_style(&self, style: &InlineStyle) -> Self {
        EditorState::toggle_inline_style(self, style)
    }

    fn with_inline_style_override(&self, style: Option<StyleSet>) -> Self {
        EditorState::with_inline_style_override(self, style)
    }
}

/// Origin-scoped string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError>;

    /// Overwrite `key` with `value`
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError>;
}

/// Turns untrusted text into something safe to render as HTML
pub trait Sanitizer {
    fn sanitize(&self, input: &str) -> String;
}
