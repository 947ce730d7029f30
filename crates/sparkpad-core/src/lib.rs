// SPDX-License-Identifier: AGPL-3.0-or-later
//! Sparkpad Core - Rich-text editing core with trigger formatting
//!
//! This crate provides:
//! - A small block/character content model with functional updates
//! - Trigger rules turning `@`, `#`, `*` and `$` typed into an empty block
//!   into formatting
//! - Snapshot persistence against an injected key-value store
//! - A sanitized plain-text preview
//! - An editor session tying them together

pub mod config;
pub mod model;
pub mod persistence;
pub mod preview;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod traits;

pub use config::{ConfigError, EditorConfig, StyleAttributes, StyleMap};
pub use model::{
    BlockKey, BlockType, ChangeType, ContentBlock, ContentState, EditorState, InlineStyle,
    Position, SelectionState, StyleSet,
};
pub use persistence::PersistenceAdapter;
pub use preview::{HtmlEscaper, Preview, PreviewStats, RenderedPreview};
pub use rules::{Decision, RuleEngine, Trigger};
pub use session::{Editor, EditorCommand, Keystroke};
pub use snapshot::SnapshotError;
pub use storage::{FileStore, MemoryStore, StorageError};
pub use traits::{EditorError, KeyValueStore, RichTextState, Result, Sanitizer};
