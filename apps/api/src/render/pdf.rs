//! PDF painter: draws a computed layout with printpdf's builtin Helvetica fonts.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use crate::render::font_metrics::FontFamily;
use crate::render::layout::{PageConfig, PageLayout};
use crate::render::RenderError;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, family: FontFamily) -> &IndirectFontRef {
        match family {
            FontFamily::Helvetica => &self.regular,
            FontFamily::HelveticaBold => &self.bold,
            FontFamily::HelveticaOblique => &self.oblique,
        }
    }
}

/// Paints `pages` into a new PDF document and returns its bytes.
pub fn paint_pdf(
    title: &str,
    pages: &[PageLayout],
    config: &PageConfig,
) -> Result<Vec<u8>, RenderError> {
    let width = Mm(config.width_mm);
    let height = Mm(config.height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Page 1");

    let font = |builtin: BuiltinFont| {
        doc.add_builtin_font(builtin)
            .map_err(|e| RenderError::Pdf(format!("failed to load builtin font: {e}")))
    };
    let fonts = Fonts {
        regular: font(BuiltinFont::Helvetica)?,
        bold: font(BuiltinFont::HelveticaBold)?,
        oblique: font(BuiltinFont::HelveticaOblique)?,
    };

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(width, height, format!("Page {}", index + 1));
            doc.get_page(page_index).get_layer(layer_index)
        };

        for line in &page.lines {
            layer.use_text(
                to_builtin_charset(&line.text),
                line.style.size_pt(),
                Mm(line.x_mm),
                Mm(line.y_mm),
                fonts.get(line.style.font()),
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(format!("failed to serialize PDF: {e}")))
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F, on top of printable Latin-1.
const WIN_ANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Builtin fonts draw text as WinAnsiEncoding. Everything in that repertoire passes through;
/// a few look-alikes are folded onto it and anything else becomes `?`.
pub fn to_builtin_charset(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            c if WIN_ANSI_EXTRAS.contains(&c) => c,
            '\t' | '\u{2002}'..='\u{200A}' => ' ',
            '\u{2032}' => '\'',
            '\u{2033}' => '"',
            '\u{2010}'..='\u{2012}' | '\u{2212}' => '-',
            '\u{2015}' => '—',
            '\u{25CF}' | '\u{25AA}' => '•',
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::{PlacedLine, TextStyle};

    #[test]
    fn test_win_ansi_text_passes_through_unchanged() {
        for text in [
            "Saved €2M at Škoda – Œuvre™",
            "“Led” the team’s 2019–2021 push… • Žilina — Ÿvonne œuvre š",
        ] {
            assert_eq!(to_builtin_charset(text), text);
        }
    }

    #[test]
    fn test_look_alikes_are_folded_onto_win_ansi() {
        assert_eq!(to_builtin_charset("a\u{2011}b \u{2212}5 \u{25CF} x"), "a-b -5 • x");
        assert_eq!(to_builtin_charset("tab\there"), "tab here");
    }

    #[test]
    fn test_every_field_of_a_win_ansi_record_reaches_the_page() {
        use crate::models::resume::{ExperienceEntry, ResumeRecord};
        use crate::render::layout::layout_record;

        let record = ResumeRecord {
            name: "Zoë Šimková".to_string(),
            title: "Ingénieure – Backend".to_string(),
            summary: "Saved €2M.".to_string(),
            skills: vec!["Œuvre™".to_string()],
            experience: vec![ExperienceEntry {
                role: "Lead".to_string(),
                organization: "Škoda".to_string(),
                duration: "2019—2024".to_string(),
                achievements: vec!["Cut “p99” by 40%".to_string()],
            }],
            ..Default::default()
        };
        let config = PageConfig::default();
        let painted: Vec<String> = layout_record(&record, &config)
            .iter()
            .flat_map(|page| page.lines.iter().map(|l| to_builtin_charset(&l.text)))
            .collect();
        let page_text = painted.join("\n");

        for value in [
            "Zoë Šimková",
            "Ingénieure – Backend",
            "Saved €2M.",
            "Œuvre™",
            "Škoda",
            "2019—2024",
            "Cut “p99” by 40%",
        ] {
            assert!(page_text.contains(value), "missing {value:?} in {page_text}");
        }
        assert!(paint_pdf("Zoë", &layout_record(&record, &config), &config).is_ok());
    }

    #[test]
    fn test_latin1_is_kept_and_other_scripts_replaced() {
        assert_eq!(to_builtin_charset("Zoë Müller"), "Zoë Müller");
        assert_eq!(to_builtin_charset("王"), "?");
    }

    #[test]
    fn test_paint_produces_pdf_bytes_for_multiple_pages() {
        let config = PageConfig::default();
        let page = |text: &str| PageLayout {
            lines: vec![PlacedLine {
                text: text.to_string(),
                style: TextStyle::Body,
                x_mm: config.margin_mm,
                y_mm: 200.0,
            }],
        };
        let bytes = paint_pdf("Test", &[page("one"), page("two")], &config).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
