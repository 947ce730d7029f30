// SPDX-License-Identifier: AGPL-3.0-or-later
//! Reference content model for the editor
//!
//! A deliberately small block/character model: ordered blocks of text with
//! one style set per character, a selection, and an inline style override.
//! It implements the capability set the trigger rules need and nothing
//! more (no undo stack, no entities, no layout).
//!
//! Every operation on [`EditorState`] is a functional update: it returns a
//! new state and leaves the receiver untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::traits::EditorError;

/// Stable identifier of a block inside a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whole-block classification, mutually exclusive per block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Unstyled,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    UnorderedListItem,
    OrderedListItem,
    Blockquote,
    CodeBlock,
    Atomic,
}

impl BlockType {
    /// Wire name used in snapshots
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unstyled => "unstyled",
            Self::HeaderOne => "header-one",
            Self::HeaderTwo => "header-two",
            Self::HeaderThree => "header-three",
            Self::HeaderFour => "header-four",
            Self::HeaderFive => "header-five",
            Self::HeaderSix => "header-six",
            Self::UnorderedListItem => "unordered-list-item",
            Self::OrderedListItem => "ordered-list-item",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "code-block",
            Self::Atomic => "atomic",
        }
    }

    pub const fn is_header(&self) -> bool {
        matches!(
            self,
            Self::HeaderOne
                | Self::HeaderTwo
                | Self::HeaderThree
                | Self::HeaderFour
                | Self::HeaderFive
                | Self::HeaderSix
        )
    }

    pub const ALL: [Self; 12] = [
        Self::Unstyled,
        Self::HeaderOne,
        Self::HeaderTwo,
        Self::HeaderThree,
        Self::HeaderFour,
        Self::HeaderFive,
        Self::HeaderSix,
        Self::UnorderedListItem,
        Self::OrderedListItem,
        Self::Blockquote,
        Self::CodeBlock,
        Self::Atomic,
    ];
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EditorError::UnknownBlockType(s.to_string()))
    }
}

/// Character-range-scoped visual attribute
///
/// Built-in styles map to their upper-case names; anything else is kept
/// verbatim as a custom style declared in the style map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Custom(String),
}

impl InlineStyle {
    pub fn new(name: &str) -> Self {
        match name {
            "BOLD" => Self::Bold,
            "ITALIC" => Self::Italic,
            "UNDERLINE" => Self::Underline,
            "STRIKETHROUGH" => Self::Strikethrough,
            "CODE" => Self::Code,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Bold => "BOLD",
            Self::Italic => "ITALIC",
            Self::Underline => "UNDERLINE",
            Self::Strikethrough => "STRIKETHROUGH",
            Self::Code => "CODE",
            Self::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<String> for InlineStyle {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<&str> for InlineStyle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<InlineStyle> for String {
    fn from(style: InlineStyle) -> Self {
        style.name().to_string()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Styles applied to a single character
pub type StyleSet = BTreeSet<InlineStyle>;

/// Kind of the last state transition, recorded on every push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    InsertCharacters,
    RemoveRange,
    SplitBlock,
    ChangeInlineStyle,
    ChangeBlockType,
}

/// A paragraph-level unit of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    key: BlockKey,
    block_type: BlockType,
    depth: u8,
    text: String,
    // one entry per char of `text`
    styles: Vec<StyleSet>,
}

impl ContentBlock {
    /// Create an empty block
    pub fn new(key: BlockKey, block_type: BlockType) -> Self {
        Self {
            key,
            block_type,
            depth: 0,
            text: String::new(),
            styles: Vec::new(),
        }
    }

    /// Create a block of unstyled text
    pub fn with_text(key: BlockKey, block_type: BlockType, text: &str) -> Self {
        Self {
            key,
            block_type,
            depth: 0,
            text: text.to_string(),
            styles: vec![StyleSet::new(); text.chars().count()],
        }
    }

    pub(crate) fn from_parts(
        key: BlockKey,
        block_type: BlockType,
        depth: u8,
        text: String,
        styles: Vec<StyleSet>,
    ) -> Self {
        debug_assert_eq!(text.chars().count(), styles.len());
        Self {
            key,
            block_type,
            depth,
            text,
            styles,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn style_at(&self, offset: usize) -> Option<&StyleSet> {
        self.styles.get(offset)
    }

    pub fn styles(&self) -> &[StyleSet] {
        &self.styles
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str, style: &StyleSet) {
        let start = start.min(self.len());
        let end = end.clamp(start, self.len());
        let (byte_start, byte_end) = (byte_offset(&self.text, start), byte_offset(&self.text, end));
        self.text.replace_range(byte_start..byte_end, text);
        let inserted = text.chars().count();
        self.styles
            .splice(start..end, std::iter::repeat(style.clone()).take(inserted));
    }

    fn split_off(&mut self, offset: usize) -> (String, Vec<StyleSet>) {
        let offset = offset.min(self.len());
        let tail = self.text.split_off(byte_offset(&self.text, offset));
        let tail_styles = self.styles.split_off(offset);
        (tail, tail_styles)
    }

    fn append(&mut self, text: &str, styles: &[StyleSet]) {
        self.text.push_str(text);
        self.styles.extend_from_slice(styles);
    }
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

/// The document: an ordered, never-empty list of blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentState {
    blocks: Vec<ContentBlock>,
}

impl ContentState {
    /// A single empty unstyled block
    pub fn empty() -> Self {
        Self {
            blocks: vec![ContentBlock::new(BlockKey::new("b0"), BlockType::Unstyled)],
        }
    }

    /// Build from blocks; an empty list yields [`ContentState::empty`]
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        if blocks.is_empty() {
            return Self::empty();
        }
        Self { blocks }
    }

    /// One unstyled block per line
    pub fn from_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .enumerate()
            .map(|(i, line)| {
                ContentBlock::with_text(BlockKey::new(format!("b{i}")), BlockType::Unstyled, line)
            })
            .collect();
        Self::from_blocks(blocks)
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| &b.key == key)
    }

    fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| &b.key == key)
    }

    pub fn last_block(&self) -> &ContentBlock {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block texts joined with newlines, styles stripped
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when no block carries any text
    pub fn has_text(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_empty())
    }

    fn generate_key(&self) -> BlockKey {
        let mut n = self.blocks.len();
        loop {
            let key = BlockKey::new(format!("b{n}"));
            if self.block_index(&key).is_none() {
                return key;
            }
            n += 1;
        }
    }

    fn replace_span(&mut self, span: &Span, text: &str, style: &StyleSet) {
        if span.start_index == span.end_index {
            self.blocks[span.start_index].replace_range(
                span.start_offset,
                span.end_offset,
                text,
                style,
            );
            return;
        }

        let (tail, tail_styles) = self.blocks[span.end_index].split_off(span.end_offset);
        let start_block = &mut self.blocks[span.start_index];
        let len = start_block.len();
        start_block.replace_range(span.start_offset, len, text, style);
        start_block.append(&tail, &tail_styles);
        self.blocks.drain(span.start_index + 1..=span.end_index);
    }
}

impl Default for ContentState {
    fn default() -> Self {
        Self::empty()
    }
}

/// A point in the document, offset counted in characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub key: BlockKey,
    pub offset: usize,
}

/// Range between an anchor and a focus position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionState {
    pub anchor: Position,
    pub focus: Position,
}

impl SelectionState {
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self::range(key.clone(), offset, key, offset)
    }

    pub fn range(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor: Position {
                key: anchor_key,
                offset: anchor_offset,
            },
            focus: Position {
                key: focus_key,
                offset: focus_offset,
            },
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Anchor and focus sit in the same block
    pub fn is_single_block(&self) -> bool {
        self.anchor.key == self.focus.key
    }

    /// Ordered (start, end) offsets, meaningful for single-block selections
    pub fn offsets(&self) -> (usize, usize) {
        let (a, f) = (self.anchor.offset, self.focus.offset);
        (a.min(f), a.max(f))
    }
}

/// Selection resolved against a concrete content, start before end
#[derive(Debug, Clone, Copy)]
struct Span {
    start_index: usize,
    start_offset: usize,
    end_index: usize,
    end_offset: usize,
}

/// Content plus selection plus pending inline style
#[derive(Debug, Clone, Eq)]
pub struct EditorState {
    content: ContentState,
    selection: SelectionState,
    inline_style_override: Option<StyleSet>,
    last_change: Option<ChangeType>,
}

// `last_change` is history metadata and not part of the observable state.
impl PartialEq for EditorState {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
            && self.selection == other.selection
            && self.inline_style_override == other.inline_style_override
    }
}

impl EditorState {
    pub fn create_empty() -> Self {
        Self::create_with_content(ContentState::empty())
    }

    /// Wrap existing content, cursor at the end of the last block
    pub fn create_with_content(content: ContentState) -> Self {
        let last = content.last_block();
        let selection = SelectionState::collapsed(last.key.clone(), last.len());
        Self {
            content,
            selection,
            inline_style_override: None,
            last_change: None,
        }
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.inline_style_override.as_ref()
    }

    pub fn last_change(&self) -> Option<ChangeType> {
        self.last_change
    }

    pub fn block_text(&self, key: &BlockKey) -> Option<&str> {
        self.content.block_for_key(key).map(|b| b.text())
    }

    /// Move the selection; a selection change drops the style override
    pub fn with_selection(&self, selection: SelectionState) -> Self {
        Self {
            selection,
            inline_style_override: None,
            ..self.clone()
        }
    }

    pub fn with_inline_style_override(&self, style: Option<StyleSet>) -> Self {
        Self {
            inline_style_override: style,
            ..self.clone()
        }
    }

    /// Style the next inserted character will get
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(style) = &self.inline_style_override {
            return style.clone();
        }
        let Some(span) = self.resolve(&self.selection) else {
            return StyleSet::new();
        };
        let block = &self.content.blocks[span.start_index];
        if !self.selection.is_collapsed() {
            if let Some(style) = block.style_at(span.start_offset) {
                return style.clone();
            }
        }
        self.style_before(span.start_index, span.start_offset)
    }

    fn style_before(&self, index: usize, offset: usize) -> StyleSet {
        let block = &self.content.blocks[index];
        if offset > 0 {
            return block.style_at(offset - 1).cloned().unwrap_or_default();
        }
        if let Some(style) = block.style_at(0) {
            return style.clone();
        }
        self.content.blocks[..index]
            .iter()
            .rev()
            .find_map(|b| b.styles.last())
            .cloned()
            .unwrap_or_default()
    }

    fn resolve(&self, range: &SelectionState) -> Option<Span> {
        let anchor = self.content.block_index(&range.anchor.key)?;
        let focus = self.content.block_index(&range.focus.key)?;
        let anchor_offset = range.anchor.offset.min(self.content.blocks[anchor].len());
        let focus_offset = range.focus.offset.min(self.content.blocks[focus].len());

        let span = if (anchor, anchor_offset) <= (focus, focus_offset) {
            Span {
                start_index: anchor,
                start_offset: anchor_offset,
                end_index: focus,
                end_offset: focus_offset,
            }
        } else {
            Span {
                start_index: focus,
                start_offset: focus_offset,
                end_index: anchor,
                end_offset: anchor_offset,
            }
        };
        Some(span)
    }

    fn push(&self, content: ContentState, selection: SelectionState, change: ChangeType) -> Self {
        let inline_style_override = match change {
            ChangeType::InsertCharacters => self.inline_style_override.clone(),
            _ => None,
        };
        Self {
            content,
            selection,
            inline_style_override,
            last_change: Some(change),
        }
    }

    /// Replace `range` with `text` carrying `style`; cursor lands after it
    pub fn replace_text(&self, range: &SelectionState, text: &str, style: &StyleSet) -> Self {
        let Some(span) = self.resolve(range) else {
            tracing::debug!(anchor = %range.anchor.key, "replace_text on unknown block");
            return self.clone();
        };
        let mut content = self.content.clone();
        content.replace_span(&span, text, style);

        let key = content.blocks[span.start_index].key.clone();
        let after = SelectionState::collapsed(key, span.start_offset + text.chars().count());
        let change = if text.is_empty() {
            ChangeType::RemoveRange
        } else {
            ChangeType::InsertCharacters
        };
        self.push(content, after, change)
    }

    /// Default insertion: replace the selection using the current style
    pub fn insert_text(&self, text: &str) -> Self {
        let style = self.current_inline_style();
        self.replace_text(&self.selection, text, &style)
    }

    fn map_styles(&self, range: &SelectionState, f: impl Fn(&mut StyleSet)) -> Self {
        let Some(span) = self.resolve(range) else {
            return self.clone();
        };
        let mut content = self.content.clone();
        for index in span.start_index..=span.end_index {
            let block = &mut content.blocks[index];
            let from = if index == span.start_index { span.start_offset } else { 0 };
            let to = if index == span.end_index { span.end_offset } else { block.len() };
            block.styles[from..to].iter_mut().for_each(&f);
        }
        self.push(content, self.selection.clone(), ChangeType::ChangeInlineStyle)
    }

    pub fn apply_inline_style(&self, range: &SelectionState, style: &InlineStyle) -> Self {
        self.map_styles(range, |set| {
            set.insert(style.clone());
        })
    }

    pub fn remove_inline_style(&self, range: &SelectionState, style: &InlineStyle) -> Self {
        self.map_styles(range, |set| {
            set.remove(style);
        })
    }

    /// Set the type of every block touched by `range`
    pub fn set_block_type(&self, range: &SelectionState, block_type: BlockType) -> Self {
        let Some(span) = self.resolve(range) else {
            return self.clone();
        };
        let mut content = self.content.clone();
        for block in &mut content.blocks[span.start_index..=span.end_index] {
            block.block_type = block_type;
        }
        self.push(content, self.selection.clone(), ChangeType::ChangeBlockType)
    }

    /// Toggle `style` over the selection, or as the pending style when collapsed
    pub fn toggle_inline_style(&self, style: &InlineStyle) -> Self {
        let mut current = self.current_inline_style();
        if self.selection.is_collapsed() {
            if !current.remove(style) {
                current.insert(style.clone());
            }
            return Self {
                inline_style_override: Some(current),
                last_change: Some(ChangeType::ChangeInlineStyle),
                ..self.clone()
            };
        }

        if current.contains(style) {
            self.remove_inline_style(&self.selection, style)
        } else {
            self.apply_inline_style(&self.selection, style)
        }
    }

    /// Enter: split the anchor block at the cursor
    pub fn split_block(&self) -> Self {
        let collapsed = if self.selection.is_collapsed() {
            self.clone()
        } else {
            self.replace_text(&self.selection, "", &StyleSet::new())
        };
        let Some(span) = collapsed.resolve(&collapsed.selection) else {
            return self.clone();
        };

        let mut content = collapsed.content.clone();
        let key = content.generate_key();
        let block = &mut content.blocks[span.start_index];
        let (tail, tail_styles) = block.split_off(span.start_offset);
        let block_type = if tail.is_empty() && block.block_type.is_header() {
            BlockType::Unstyled
        } else {
            block.block_type
        };
        let below =
            ContentBlock::from_parts(key.clone(), block_type, block.depth, tail, tail_styles);
        content.blocks.insert(span.start_index + 1, below);

        collapsed.push(content, SelectionState::collapsed(key, 0), ChangeType::SplitBlock)
    }

    /// Delete backwards: selection, previous char, block type, then block join
    pub fn backspace(&self) -> Self {
        if !self.selection.is_collapsed() {
            return self.replace_text(&self.selection, "", &StyleSet::new());
        }
        let Some(span) = self.resolve(&self.selection) else {
            return self.clone();
        };
        let (index, offset) = (span.start_index, span.start_offset);
        let block = &self.content.blocks[index];

        if offset > 0 {
            let range =
                SelectionState::range(block.key.clone(), offset - 1, block.key.clone(), offset);
            return self.replace_text(&range, "", &StyleSet::new());
        }
        if block.block_type != BlockType::Unstyled {
            return self.set_block_type(&self.selection, BlockType::Unstyled);
        }
        if index == 0 {
            return self.clone();
        }

        let previous = &self.content.blocks[index - 1];
        let range =
            SelectionState::range(previous.key.clone(), previous.len(), block.key.clone(), 0);
        self.replace_text(&range, "", &StyleSet::new())
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::create_empty()
    }
}
