use crate::{error::ReportError, layout::Document};
use printpdf::*;
use std::{io::BufWriter, path::Path};

impl Document {
    /// Text-only PDF using the built-in Helvetica faces, one PDF page per
    /// laid-out page.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let layout = self.layout;
        let (doc, first_page, first_layer) =
            PdfDocument::new(truncate(&self.title, 96), Mm(layout.width), Mm(layout.height), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| ReportError::Pdf(e.to_string()))?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| ReportError::Pdf(e.to_string()))?;

        for (index, page) in self.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (p, l) = doc.add_page(Mm(layout.width), Mm(layout.height), format!("Page {}", index + 1));
                doc.get_page(p).get_layer(l)
            };
            for line in &page.lines {
                let font = if line.bold { &bold } else { &regular };
                layer.use_text(win_ansi(&line.text), line.font_size, Mm(line.x), Mm(layout.height - line.y), font);
            }
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer).map_err(|e| ReportError::Pdf(e.to_string()))?;
        writer.into_inner().map_err(|e| ReportError::Pdf(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Built-in PDF fonts only cover Latin-1; swap common typography for ASCII
/// and anything else for '?'.
fn win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            c if (c as u32) < 0x100 && !c.is_control() => c,
            _ => '?',
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { format!("{}...", s.chars().take(max).collect::<String>()) }
}
