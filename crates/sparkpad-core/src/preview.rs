// SPDX-License-Identifier: AGPL-3.0-or-later
//! Read-only plain-text preview

use unicode_segmentation::UnicodeSegmentation;

use crate::model::ContentState;
use crate::traits::Sanitizer;

/// Escapes HTML-significant characters so any markup renders as text
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Sanitizer for HtmlEscaper {
    fn sanitize(&self, input: &str) -> String {
        html_escape::encode_safe(input).into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewStats {
    pub word_count: usize,
    /// Grapheme clusters
    pub char_count: usize,
    pub block_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    pub html: String,
    pub stats: PreviewStats,
}

/// Plain-text projection run through a [`Sanitizer`]
#[derive(Debug, Clone)]
pub struct Preview<Z = HtmlEscaper> {
    sanitizer: Z,
}

impl Preview<HtmlEscaper> {
    pub fn new() -> Self {
        Self {
            sanitizer: HtmlEscaper,
        }
    }
}

impl Default for Preview<HtmlEscaper> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Z: Sanitizer> Preview<Z> {
    pub fn with_sanitizer(sanitizer: Z) -> Self {
        Self { sanitizer }
    }

    pub fn render(&self, content: &ContentState) -> RenderedPreview {
        let text = content.plain_text();
        let stats = PreviewStats {
            word_count: text.unicode_words().count(),
            char_count: text.graphemes(true).filter(|g| *g != "\n").count(),
            block_count: content.blocks().len(),
        };
        RenderedPreview {
            html: self.sanitizer.sanitize(&text),
            stats,
        }
    }
}
