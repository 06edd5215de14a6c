//! Paginated text layout.
//!
//! A [`LayoutWriter`] owns the vertical cursor for one document. Coordinates
//! are millimetres measured from the top-left corner of the page; the PDF
//! backend flips them when drawing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub const PT_TO_MM: f32 = 0.352_778;
const LINE_SPACING: f32 = 1.4;
/// Average Helvetica advance width, in em.
const REGULAR_GLYPH_EM: f32 = 0.5;
const BOLD_GLYPH_EM: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Page dimensions in millimetres (width, height).
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("unknown page size '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub indent_unit: f32,
}

impl PageLayout {
    pub fn new(size: PageSize, margin: f32) -> Self {
        let (width, height) = size.dimensions_mm();
        Self { width, height, margin, indent_unit: 5.0 }
    }

    /// Lowest position any line may reach.
    pub fn bottom_limit(&self) -> f32 { self.height - self.margin }

    pub fn text_x(&self, indent: u16) -> f32 { self.margin + f32::from(indent) * self.indent_unit }

    pub fn max_text_width(&self, indent: u16) -> f32 {
        (self.width - 2.0 * self.margin - f32::from(indent) * self.indent_unit).max(0.0)
    }
}

impl Default for PageLayout {
    fn default() -> Self { Self::new(PageSize::A4, 20.0) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub bold: bool,
    pub indent: u16,
    pub font_size: f32,
}

impl Default for TextStyle {
    fn default() -> Self { Self { bold: false, indent: 0, font_size: 11.0 } }
}

impl TextStyle {
    pub fn heading(font_size: f32) -> Self { Self { bold: true, indent: 0, font_size } }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn indent(mut self, indent: u16) -> Self {
        self.indent = indent;
        self
    }

    pub fn size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn line_height(&self) -> f32 { self.font_size * PT_TO_MM * LINE_SPACING }

    fn glyph_width(&self) -> f32 {
        let em = if self.bold { BOLD_GLYPH_EM } else { REGULAR_GLYPH_EM };
        self.font_size * PT_TO_MM * em
    }
}

/// Approximate rendered width of `text` in millimetres.
pub fn text_width(text: &str, style: &TextStyle) -> f32 { text.chars().count() as f32 * style.glyph_width() }

/// Word-wraps `text` to at most `max_chars` characters per line.
///
/// Words longer than a whole line are split at character boundaries.
/// Explicit newlines start a new line; blank lines are kept.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return lines;
    }
    for paragraph in text.lines() {
        let before = lines.len();
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
            }
            if word_len <= max_chars {
                current = word.to_string();
                current_len = word_len;
            } else {
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_chars).peekable();
                while let Some(chunk) = chunks.next() {
                    let piece: String = chunk.iter().collect();
                    if chunks.peek().is_some() {
                        lines.push(piece);
                    } else {
                        current_len = chunk.len();
                        current = piece;
                    }
                }
            }
        }
        if current_len > 0 {
            lines.push(current);
        }
        if lines.len() == before {
            lines.push(String::new());
        }
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    /// Baseline, measured from the top edge.
    pub y: f32,
    pub font_size: f32,
    pub bold: bool,
    pub indent: u16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// A finished, in-memory paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub layout: PageLayout,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize { self.pages.len() }

    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> { self.pages.iter().flat_map(|p| p.lines.iter()) }

    /// All line texts joined by newlines, ignoring page boundaries.
    pub fn text(&self) -> String { self.lines().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n") }

    pub fn contains(&self, needle: &str) -> bool { self.lines().any(|l| l.text.contains(needle)) }

    /// Plain-text rendition: indentation as two spaces per level, pages
    /// separated by a form feed.
    pub fn to_plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .map(|l| format!("{}{}", "  ".repeat(usize::from(l.indent)), l.text))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\u{c}\n")
    }
}

pub struct LayoutWriter {
    title: String,
    layout: PageLayout,
    pages: Vec<Page>,
    y: f32,
}

impl LayoutWriter {
    pub fn new(title: impl Into<String>, layout: PageLayout) -> Self {
        Self { title: title.into(), layout, pages: vec![Page::default()], y: layout.margin }
    }

    pub fn layout(&self) -> &PageLayout { &self.layout }

    pub fn cursor(&self) -> f32 { self.y }

    pub fn page_count(&self) -> usize { self.pages.len() }

    /// Starts a new page when `height` more millimetres would cross the
    /// bottom margin. A page that is still empty is never broken.
    pub fn ensure_space(&mut self, height: f32) {
        if self.y + height > self.layout.bottom_limit() && self.y > self.layout.margin {
            self.add_page();
        }
    }

    pub fn add_gap(&mut self, height: f32) {
        self.ensure_space(height);
        self.y = (self.y + height).min(self.layout.bottom_limit());
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.layout.margin;
        debug!(page = self.pages.len(), title = %self.title, "page break");
    }

    pub fn add_text(&mut self, text: &str, style: TextStyle) {
        let max_width = self.layout.max_text_width(style.indent);
        let max_chars = (max_width / style.glyph_width()).floor() as usize;
        let x = self.layout.text_x(style.indent);
        let line_height = style.line_height();
        for line in wrap_text(text, max_chars) {
            self.ensure_space(line_height);
            let baseline = self.y + style.font_size * PT_TO_MM;
            if let Some(page) = self.pages.last_mut() {
                page.lines.push(PlacedLine {
                    text: line,
                    x,
                    y: baseline,
                    font_size: style.font_size,
                    bold: style.bold,
                    indent: style.indent,
                });
            }
            self.y += line_height;
        }
    }

    pub fn finish(self) -> Document { Document { title: self.title, layout: self.layout, pages: self.pages } }
}
