//! Fixed-page layout on top of `lopdf`.
//!
//! `PageCanvas` keeps a vertical cursor on an A4 page with fixed margins,
//! emits PDF content operators, and starts a new page either explicitly or
//! when the next block does not fit. Text uses the standard Helvetica faces
//! with WinAnsi encoding, so no fonts are embedded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::DocumentBuildError;

pub const MM: f32 = 72.0 / 25.4;
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 20.0 * MM;

pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
pub const CONTENT_TOP: f32 = PAGE_HEIGHT - MARGIN;
pub const CONTENT_BOTTOM: f32 = MARGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
}

pub const TITLE: TextStyle = TextStyle {
    font: Font::Bold,
    size: 18.0,
    leading: 22.0,
    space_before: 0.0,
    space_after: 6.0,
};

pub const HEADING: TextStyle = TextStyle {
    font: Font::Bold,
    size: 14.0,
    leading: 17.0,
    space_before: 12.0,
    space_after: 6.0,
};

pub const BODY: TextStyle = TextStyle {
    font: Font::Regular,
    size: 10.0,
    leading: 12.0,
    space_before: 0.0,
    space_after: 0.0,
};

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

fn char_width(ch: char, font: Font) -> f32 {
    let base = match ch {
        ' '..='~' => HELVETICA_WIDTHS[ch as usize - 0x20],
        '—' => 1000,
        '–' => 556,
        _ => 556,
    };
    let base = f32::from(base);
    // bold faces run a little wider; close enough for alignment
    match font {
        Font::Regular => base,
        Font::Bold => base * 1.06,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    text.chars().map(|ch| char_width(ch, font)).sum::<f32>() * size / 1000.0
}

/// Encode text for a WinAnsiEncoding simple font. Unmappable characters
/// become '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' => b' ',
            ' '..='~' => ch as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to `max_width` points. Words wider than a full line are
/// broken at the character that no longer fits.
pub fn wrap_line(line: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let mut rest = word;
        while text_width(rest, font, size) > max_width {
            let head = truncate_to_width(rest, font, size, max_width);
            // always make progress, even when one glyph is wider than the line
            let cut = head.len().max(rest.chars().next().map_or(0, char::len_utf8));
            lines.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
        current = rest.to_string();
    }

    // blank soft lines keep their vertical space
    lines.push(current);
    lines
}

/// Longest prefix of `text` that fits in `max_width` points.
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    let mut width = 0.0;
    text.chars()
        .take_while(|&ch| {
            width += char_width(ch, font) * size / 1000.0;
            width <= max_width
        })
        .collect()
}

/// Horizontal alignment inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub struct PageCanvas {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor_y: f32,
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCanvas {
    pub fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            cursor_y: CONTENT_TOP,
        }
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Pages emitted so far, counting the one in progress.
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    pub fn page_break(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
        self.cursor_y = CONTENT_TOP;
    }

    /// Break the page if `height` does not fit above the bottom margin.
    /// Never breaks an empty page.
    pub fn ensure_space(&mut self, height: f32) {
        if self.cursor_y - height < CONTENT_BOTTOM && self.cursor_y < CONTENT_TOP {
            self.page_break();
        }
    }

    pub fn advance(&mut self, height: f32) {
        self.cursor_y -= height;
    }

    pub fn spacer(&mut self, height: f32) {
        if self.cursor_y < CONTENT_TOP {
            self.advance(height);
        }
    }

    /// Draw a single run of text with its baseline at `y`.
    pub fn text_at(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Draw text aligned inside the horizontal span `[x, x + width]`.
    #[allow(clippy::too_many_arguments)]
    pub fn text_in(
        &mut self,
        x: f32,
        width: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
        align: Align,
    ) {
        let run = text_width(text, font, size);
        let start = match align {
            Align::Left => x,
            Align::Center => x + (width - run) / 2.0,
            Align::Right => x + width - run,
        };
        self.text_at(start, y, text, font, size);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("g", vec![gray.into()]),
            Operation::new(
                "re",
                vec![x.into(), y.into(), width.into(), height.into()],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, gray: f32) {
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("G", vec![gray.into()]),
            Operation::new("w", vec![width.into()]),
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Lay out one paragraph. Newlines inside `text` are soft line breaks.
    pub fn paragraph(&mut self, text: &str, style: TextStyle) {
        self.spacer(style.space_before);
        for soft_line in text.split('\n') {
            for line in wrap_line(soft_line, style.font, style.size, CONTENT_WIDTH) {
                self.ensure_space(style.leading);
                self.advance(style.leading);
                let baseline = self.cursor_y + (style.leading - style.size);
                self.text_at(MARGIN, baseline, &line, style.font, style.size);
            }
        }
        self.advance(style.space_after);
    }

    /// A body line made of a regular label followed by a bold value. Long
    /// values wrap and continue under the start of the value.
    pub fn labelled_line(&mut self, label: &str, value: &str) {
        let offset = text_width(label, Font::Regular, BODY.size);
        let lines = wrap_line(value, Font::Bold, BODY.size, CONTENT_WIDTH - offset);
        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(BODY.leading);
            self.advance(BODY.leading);
            let baseline = self.cursor_y + (BODY.leading - BODY.size);
            if i == 0 {
                self.text_at(MARGIN, baseline, label, Font::Regular, BODY.size);
            }
            self.text_at(MARGIN + offset, baseline, line, Font::Bold, BODY.size);
        }
    }

    /// Serialize all pages into a complete PDF byte buffer.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>, DocumentBuildError> {
        if !self.current.is_empty() || self.finished.is_empty() {
            let page = std::mem::take(&mut self.current);
            self.finished.push(page);
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished.len());
        for operations in self.finished {
            let content = Content { operations };
            let encoded = content.encode().map_err(|e| DocumentBuildError::Encode(Box::new(e)))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal("auto-proposal-server"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(|e| DocumentBuildError::Write(Box::new(e)))?;
        Ok(buffer)
    }
}
