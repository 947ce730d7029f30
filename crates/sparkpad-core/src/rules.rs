// SPDX-License-Identifier: AGPL-3.0-or-later
//! Trigger-character formatting rules
//!
//! Before a character is committed, the anchor block's trimmed text is
//! checked as it stands, then as it would read with the character in place
//! of the selection. When either is exactly one trigger character, the
//! keystroke is consumed and turned into a formatting change:
//!
//! | trigger | effect                                              |
//! |---------|-----------------------------------------------------|
//! | `@`     | the `@` (typed or already there) gets mention style |
//! | `#`     | clear the marker, block becomes `header-one`        |
//! | `*`     | clear the marker, toggle `BOLD`                     |
//! | `$`     | clear the marker, toggle `UNDERLINE`                |
//!
//! Rules are checked in that order and the first match wins.

use crate::config::EditorConfig;
use crate::model::{BlockType, InlineStyle, SelectionState, StyleSet};
use crate::traits::RichTextState;

/// A sole-content trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Mention,
    Header,
    Bold,
    Underline,
}

impl Trigger {
    /// All triggers in priority order
    pub const ALL: [Self; 4] = [Self::Mention, Self::Header, Self::Bold, Self::Underline];

    pub const fn marker(&self) -> char {
        match self {
            Self::Mention => '@',
            Self::Header => '#',
            Self::Bold => '*',
            Self::Underline => '$',
        }
    }

    /// Whether this trigger fires for `character` given a trimmed block text
    pub fn matches(&self, character: char, trimmed: &str) -> bool {
        match self {
            Self::Mention => character == '@' && trimmed == "@",
            Self::Header => trimmed.starts_with('#') && trimmed == "#",
            Self::Bold => trimmed.ends_with('*') && trimmed == "*",
            Self::Underline => trimmed.ends_with('$') && trimmed == "$",
        }
    }
}

/// Outcome of intercepting a keystroke
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<S> {
    /// Suppress the character and adopt this state
    Handled(S),
    /// Insert the character normally
    NotHandled,
}

impl<S> Decision<S> {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    pub fn into_state(self) -> Option<S> {
        match self {
            Self::Handled(state) => Some(state),
            Self::NotHandled => None,
        }
    }
}

/// Evaluates triggers against a [`RichTextState`]
#[derive(Debug, Clone)]
pub struct RuleEngine {
    mention_style: InlineStyle,
}

impl RuleEngine {
    pub fn new(mention_style: InlineStyle) -> Self {
        Self { mention_style }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.mention_style.clone())
    }

    pub fn mention_style(&self) -> &InlineStyle {
        &self.mention_style
    }

    /// First trigger matching, in priority order
    pub fn matching_trigger(character: char, trimmed: &str) -> Option<Trigger> {
        Trigger::ALL
            .into_iter()
            .find(|trigger| trigger.matches(character, trimmed))
    }

    /// Decide whether `character` is consumed by a trigger
    pub fn on_before_character<S: RichTextState>(&self, character: char, state: &S) -> Decision<S> {
        let selection = state.selection();
        if !selection.is_single_block() {
            return Decision::NotHandled;
        }
        let key = selection.anchor.key.clone();
        let Some(text) = state.block_text(&key) else {
            tracing::debug!(block = %key, "anchor block missing, no rule applies");
            return Decision::NotHandled;
        };

        let (start, end) = selection.offsets();
        // a marker already sitting in the block wins over the typed one
        let (trigger, marker_present) = match Self::matching_trigger(character, text.trim()) {
            Some(trigger) => (trigger, true),
            None => {
                let prospective = prospective_text(text, start, end, character);
                match Self::matching_trigger(character, prospective.trim()) {
                    Some(trigger) => (trigger, false),
                    None => return Decision::NotHandled,
                }
            }
        };

        let block_len = text.chars().count();
        let whole_block = SelectionState::range(key.clone(), 0, key.clone(), block_len);
        let cleared = |state: &S| {
            // a no-op clear would reset the pending style
            if block_len == 0 {
                state.clone()
            } else {
                state.replace_text(&whole_block, "", &StyleSet::new())
            }
        };

        let next = match trigger {
            Trigger::Mention if marker_present => {
                let mut base = state.current_inline_style();
                base.remove(&self.mention_style);
                let position = text.chars().position(|c| c == '@').unwrap_or(0);
                let span = SelectionState::range(key.clone(), position, key.clone(), position + 1);
                state
                    .apply_inline_style(&span, &self.mention_style)
                    .with_inline_style_override(Some(base))
            }
            Trigger::Mention => {
                let base = state.current_inline_style();
                let position = start.min(block_len);
                let inserted = state.replace_text(selection, "@", &base);
                let span = SelectionState::range(key.clone(), position, key.clone(), position + 1);
                inserted
                    .apply_inline_style(&span, &self.mention_style)
                    .with_inline_style_override(Some(base))
            }
            Trigger::Header => {
                let next = cleared(state);
                let selection = next.selection().clone();
                next.set_block_type(&selection, BlockType::HeaderOne)
            }
            Trigger::Bold | Trigger::Underline => {
                let style = if trigger == Trigger::Bold {
                    InlineStyle::Bold
                } else {
                    InlineStyle::Underline
                };
                let base = state.current_inline_style();
                cleared(state)
                    .with_inline_style_override(Some(base))
                    .toggle_inline_style(&style)
            }
        };

        if &next == state {
            tracing::debug!(?trigger, "trigger matched without effect");
            return Decision::NotHandled;
        }
        tracing::debug!(?trigger, block = %key, marker_present, "trigger applied");
        Decision::Handled(next)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// Block text with `start..end` (chars) replaced by `character`
fn prospective_text(text: &str, start: usize, end: usize, character: char) -> String {
    let mut out = String::with_capacity(text.len() + character.len_utf8());
    out.extend(text.chars().take(start));
    out.push(character);
    out.extend(text.chars().skip(end.max(start)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKey, ChangeType, ContentState, EditorState};
    use pretty_assertions::assert_eq;

    fn engine() -> RuleEngine {
        RuleEngine::default()
    }

    fn red() -> InlineStyle {
        InlineStyle::new("RED_COLOR")
    }

    fn with_text(text: &str) -> EditorState {
        EditorState::create_with_content(ContentState::from_text(text))
    }

    fn handled(decision: Decision<EditorState>) -> EditorState {
        decision.into_state().expect("expected the trigger to fire")
    }

    #[test]
    fn test_prospective_text() {
        assert_eq!(prospective_text("", 0, 0, '#'), "#");
        assert_eq!(prospective_text("ab", 1, 1, 'x'), "axb");
        assert_eq!(prospective_text("abcd", 1, 3, 'x'), "axd");
        assert_eq!(prospective_text("ab", 5, 5, 'x'), "abx");
    }

    #[test]
    fn test_mention_trigger() {
        let state = EditorState::create_empty();
        let next = handled(engine().on_before_character('@', &state));
        let block = &next.content().blocks()[0];
        assert_eq!(block.text(), "@");
        assert!(block.style_at(0).unwrap().contains(&red()));
        assert_eq!(next.selection().anchor.offset, 1);
        assert_eq!(next.last_change(), Some(ChangeType::ChangeInlineStyle));
    }

    #[test]
    fn test_existing_mention_not_doubled() {
        let next = handled(engine().on_before_character('@', &with_text(" @")));
        let block = &next.content().blocks()[0];
        assert_eq!(block.text(), " @");
        assert!(block.style_at(1).unwrap().contains(&red()));
        assert_eq!(next.last_change(), Some(ChangeType::ChangeInlineStyle));

        let typed = next.insert_text("bob");
        assert_eq!(typed.content().plain_text(), " @bob");
        assert!(typed.content().blocks()[0].styles()[2..].iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_styled_mention_marker_typed_again() {
        // the marker already carries the style, so nothing changes
        let once = handled(engine().on_before_character('@', &EditorState::create_empty()));
        assert_eq!(engine().on_before_character('@', &once), Decision::NotHandled);
    }

    #[test]
    fn test_mention_after_whitespace() {
        let next = handled(engine().on_before_character('@', &with_text("  ")));
        let block = &next.content().blocks()[0];
        assert_eq!(block.text(), "  @");
        assert_eq!(block.style_at(1), Some(&StyleSet::new()));
        assert!(block.style_at(2).unwrap().contains(&red()));
    }

    #[test]
    fn test_mention_does_not_leak() {
        let state = handled(engine().on_before_character('@', &EditorState::create_empty()));
        let state = state.insert_text("alice");
        let block = &state.content().blocks()[0];
        assert_eq!(block.text(), "@alice");
        assert!(block.style_at(0).unwrap().contains(&red()));
        assert!(block.styles()[1..].iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_mention_in_text_not_handled() {
        let state = with_text("hello ");
        assert_eq!(engine().on_before_character('@', &state), Decision::NotHandled);
    }

    #[test]
    fn test_header_trigger() {
        let next = handled(engine().on_before_character('#', &EditorState::create_empty()));
        let block = &next.content().blocks()[0];
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(block.text(), "");
        assert_eq!(next.last_change(), Some(ChangeType::ChangeBlockType));
    }

    #[test]
    fn test_existing_header_marker_consumes_next_character() {
        let next = handled(engine().on_before_character('T', &with_text("#")));
        let block = &next.content().blocks()[0];
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(block.text(), "");
        assert_eq!(next.last_change(), Some(ChangeType::ChangeBlockType));
    }

    #[test]
    fn test_existing_style_markers() {
        let bold = handled(engine().on_before_character('x', &with_text(" * ")));
        assert!(bold.current_inline_style().contains(&InlineStyle::Bold));
        assert_eq!(bold.content().plain_text(), "");
        assert_eq!(bold.last_change(), Some(ChangeType::ChangeInlineStyle));

        let underline = handled(engine().on_before_character('q', &with_text("$")));
        assert!(underline.current_inline_style().contains(&InlineStyle::Underline));
        assert_eq!(underline.content().plain_text(), "");
        assert_eq!(underline.last_change(), Some(ChangeType::ChangeInlineStyle));
    }

    #[test]
    fn test_header_trigger_on_existing_marker() {
        // a block restored as "#" fires on the next whitespace
        let next = handled(engine().on_before_character(' ', &with_text("#")));
        let block = &next.content().blocks()[0];
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(block.text(), "");
    }

    #[test]
    fn test_header_replaces_block_type() {
        let state = with_text("");
        let state = state.set_block_type(state.selection(), BlockType::Blockquote);
        let next = handled(engine().on_before_character('#', &state));
        assert_eq!(next.content().blocks()[0].block_type(), BlockType::HeaderOne);
    }

    #[test]
    fn test_header_twice_is_idempotent() {
        let once = handled(engine().on_before_character('#', &EditorState::create_empty()));
        // second marker has nothing left to change and is typed literally
        assert_eq!(engine().on_before_character('#', &once), Decision::NotHandled);
        let typed = once.insert_text("#");
        assert_eq!(typed.content().blocks()[0].block_type(), BlockType::HeaderOne);
        assert_eq!(typed.content().blocks()[0].text(), "#");
    }

    #[test]
    fn test_bold_toggles() {
        let on = handled(engine().on_before_character('*', &EditorState::create_empty()));
        assert!(on.current_inline_style().contains(&InlineStyle::Bold));
        assert_eq!(on.content().plain_text(), "");
        assert_eq!(on.last_change(), Some(ChangeType::ChangeInlineStyle));

        let off = handled(engine().on_before_character('*', &on));
        assert!(!off.current_inline_style().contains(&InlineStyle::Bold));

        let typed = on.insert_text("hi");
        assert!(typed.content().blocks()[0]
            .styles()
            .iter()
            .all(|s| s.contains(&InlineStyle::Bold)));
    }

    #[test]
    fn test_underline_toggles() {
        let on = handled(engine().on_before_character('$', &EditorState::create_empty()));
        assert!(on.current_inline_style().contains(&InlineStyle::Underline));
        assert_eq!(on.last_change(), Some(ChangeType::ChangeInlineStyle));
        let off = handled(engine().on_before_character('$', &on));
        assert!(!off.current_inline_style().contains(&InlineStyle::Underline));
    }

    #[test]
    fn test_marker_inside_text_not_handled() {
        for (text, character) in [("a", '#'), ("x", '*'), ("price ", '$'), ("@", 'a'), ("#a", 'b')] {
            let state = with_text(text);
            assert_eq!(
                engine().on_before_character(character, &state),
                Decision::NotHandled,
                "{text:?} + {character:?}"
            );
        }
    }

    #[test]
    fn test_missing_anchor_block() {
        let state = EditorState::create_empty()
            .with_selection(SelectionState::collapsed(BlockKey::new("gone"), 0));
        assert_eq!(engine().on_before_character('#', &state), Decision::NotHandled);
    }

    #[test]
    fn test_multi_block_selection_not_handled() {
        let state = with_text("\n").with_selection(SelectionState::range(
            BlockKey::new("b0"),
            0,
            BlockKey::new("b1"),
            0,
        ));
        assert_eq!(engine().on_before_character('#', &state), Decision::NotHandled);
    }

    #[test]
    fn test_selection_replaced_by_trigger() {
        let key = BlockKey::new("b0");
        let state = with_text("abc").with_selection(SelectionState::range(key.clone(), 0, key, 3));
        let next = handled(engine().on_before_character('#', &state));
        assert_eq!(next.content().blocks()[0].block_type(), BlockType::HeaderOne);
        assert_eq!(next.content().plain_text(), "");
    }

    #[test]
    fn test_input_state_untouched() {
        let state = EditorState::create_empty();
        let before = state.clone();
        for character in ['@', '#', '*', '$'] {
            let _ = engine().on_before_character(character, &state);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_custom_mention_style() {
        let engine = RuleEngine::new(InlineStyle::Italic);
        let next = handled(engine.on_before_character('@', &EditorState::create_empty()));
        assert!(next.content().blocks()[0]
            .style_at(0)
            .unwrap()
            .contains(&InlineStyle::Italic));
    }
}
