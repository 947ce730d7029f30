// SPDX-License-Identifier: AGPL-3.0-or-later
//! Serialized snapshot of a document
//!
//! The raw form is a JSON object of blocks with run-length inline style
//! ranges:
//!
//! ```json
//! {"blocks":[{"key":"b0","text":"Title","type":"header-one","depth":0,
//!   "inlineStyleRanges":[{"offset":0,"length":5,"style":"BOLD"}],
//!   "entityRanges":[],"data":{}}],"entityMap":{}}
//! ```
//!
//! Offsets and lengths count characters. Entities are not modelled: they
//! are written empty and ignored when read.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::model::{BlockKey, BlockType, ContentBlock, ContentState, InlineStyle, StyleSet};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Style {style} range {offset}+{length} exceeds block {key} of length {len}")]
    StyleRangeOutOfBounds {
        key: String,
        style: String,
        offset: usize,
        length: usize,
        len: usize,
    },

    #[error("Duplicate block key: {0}")]
    DuplicateKey(String),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Storage form of a whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

/// Convert a document to its raw form
pub fn to_raw(content: &ContentState) -> RawContent {
    RawContent {
        blocks: content.blocks().iter().map(raw_block).collect(),
        entity_map: BTreeMap::new(),
    }
}

fn raw_block(block: &ContentBlock) -> RawBlock {
    // style -> runs, ordered by style name then offset
    let mut runs: BTreeMap<&InlineStyle, Vec<(usize, usize)>> = BTreeMap::new();
    for (offset, set) in block.styles().iter().enumerate() {
        for style in set {
            let style_runs = runs.entry(style).or_default();
            match style_runs.last_mut() {
                Some((start, length)) if *start + *length == offset => *length += 1,
                _ => style_runs.push((offset, 1)),
            }
        }
    }

    let inline_style_ranges = runs
        .into_iter()
        .flat_map(|(style, style_runs)| {
            style_runs.into_iter().map(move |(offset, length)| RawStyleRange {
                offset,
                length,
                style: style.clone(),
            })
        })
        .collect();

    RawBlock {
        key: block.key().to_string(),
        text: block.text().to_string(),
        block_type: block.block_type(),
        depth: block.depth(),
        inline_style_ranges,
        entity_ranges: Vec::new(),
        data: serde_json::Map::new(),
    }
}

/// Rebuild a document from its raw form
pub fn from_raw(raw: RawContent) -> Result<ContentState> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::with_capacity(raw.blocks.len());

    for block in raw.blocks {
        if !seen.insert(block.key.clone()) {
            return Err(SnapshotError::DuplicateKey(block.key));
        }

        let len = block.text.chars().count();
        let mut styles = vec![StyleSet::new(); len];
        for range in &block.inline_style_ranges {
            let end = range.offset.checked_add(range.length).filter(|end| *end <= len);
            let Some(end) = end else {
                return Err(SnapshotError::StyleRangeOutOfBounds {
                    key: block.key.clone(),
                    style: range.style.name().to_string(),
                    offset: range.offset,
                    length: range.length,
                    len,
                });
            };
            for set in &mut styles[range.offset..end] {
                set.insert(range.style.clone());
            }
        }

        blocks.push(ContentBlock::from_parts(
            BlockKey::new(block.key),
            block.block_type,
            block.depth,
            block.text,
            styles,
        ));
    }

    Ok(ContentState::from_blocks(blocks))
}

/// Serialize a document to its JSON snapshot string
pub fn serialize(content: &ContentState) -> Result<String> {
    Ok(serde_json::to_string(&to_raw(content))?)
}

/// Parse a JSON snapshot string back into a document
pub fn deserialize(json: &str) -> Result<ContentState> {
    let raw: RawContent = serde_json::from_str(json)?;
    from_raw(raw)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::{EditorState, SelectionState};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Edit {
        Type(String),
        Toggle(InlineStyle),
        BlockType(BlockType),
        Split,
        Backspace,
        Select(usize, usize),
    }

    fn style_strategy() -> impl Strategy<Value = InlineStyle> {
        prop_oneof![
            Just(InlineStyle::Bold),
            Just(InlineStyle::Italic),
            Just(InlineStyle::Underline),
            Just(InlineStyle::Code),
            Just(InlineStyle::new("RED_COLOR")),
        ]
    }

    fn edit_strategy() -> impl Strategy<Value = Edit> {
        prop_oneof![
            "[a-zA-Z0-9 @#*$é]{1,8}".prop_map(Edit::Type),
            style_strategy().prop_map(Edit::Toggle),
            proptest::sample::select(BlockType::ALL.to_vec()).prop_map(Edit::BlockType),
            Just(Edit::Split),
            Just(Edit::Backspace),
            (0usize..12, 0usize..12).prop_map(|(a, f)| Edit::Select(a, f)),
        ]
    }

    fn apply(state: EditorState, edit: Edit) -> EditorState {
        match edit {
            Edit::Type(text) => state.insert_text(&text),
            Edit::Toggle(style) => state.toggle_inline_style(&style),
            Edit::BlockType(block_type) => state.set_block_type(state.selection(), block_type),
            Edit::Split => state.split_block(),
            Edit::Backspace => state.backspace(),
            Edit::Select(anchor, focus) => {
                let key = state.selection().anchor.key.clone();
                state.with_selection(SelectionState::range(key.clone(), anchor, key, focus))
            }
        }
    }

    proptest! {
        // Property: any document reachable by editing survives a save/reload cycle
        #[test]
        fn prop_snapshot_roundtrip(edits in prop::collection::vec(edit_strategy(), 0..40)) {
            let state = edits.into_iter().fold(EditorState::create_empty(), apply);
            let json = serialize(state.content()).expect("serialize");
            let restored = deserialize(&json).expect("deserialize");
            prop_assert_eq!(&restored, state.content());
        }

        // Property: serializing the same document twice gives the same bytes
        #[test]
        fn prop_serialize_deterministic(edits in prop::collection::vec(edit_strategy(), 0..20)) {
            let state = edits.into_iter().fold(EditorState::create_empty(), apply);
            prop_assert_eq!(
                serialize(state.content()).unwrap(),
                serialize(state.content()).unwrap()
            );
        }
    }
}
