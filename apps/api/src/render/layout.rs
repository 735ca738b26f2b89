//! Resume layout: turns a `ResumeRecord` into positioned lines on one or more pages.
//!
//! Pure data, no PDF types: the painter in `pdf.rs` only draws what this produces.
//! Coordinates follow PDF convention (millimetres, origin bottom-left, y = baseline).

use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeRecord;
use crate::render::font_metrics::{get_metrics, FontFamily};

const PT_TO_MM: f32 = 25.4 / 72.0;
const LINE_SPACING: f32 = 1.3;
const BULLET_INDENT_MM: f32 = 3.0;
const BULLET_TEXT_OFFSET_MM: f32 = 4.0;
const BULLET_MARKER: &str = "-";

/// Page geometry. Defaults to US Letter with 18mm margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width_mm: 215.9,
            height_mm: 279.4,
            margin_mm: 18.0,
        }
    }
}

impl PageConfig {
    fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

/// Typographic role of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    Name,
    Title,
    Contact,
    SectionHeading,
    EntryHeading,
    Meta,
    Body,
}

impl TextStyle {
    pub fn font(self) -> FontFamily {
        match self {
            TextStyle::Name | TextStyle::SectionHeading | TextStyle::EntryHeading => {
                FontFamily::HelveticaBold
            }
            TextStyle::Meta => FontFamily::HelveticaOblique,
            TextStyle::Title | TextStyle::Contact | TextStyle::Body => FontFamily::Helvetica,
        }
    }

    pub fn size_pt(self) -> f32 {
        match self {
            TextStyle::Name => 20.0,
            TextStyle::Title => 12.0,
            TextStyle::SectionHeading => 12.0,
            TextStyle::EntryHeading => 11.0,
            TextStyle::Contact | TextStyle::Meta => 9.5,
            TextStyle::Body => 10.0,
        }
    }

    fn line_height_mm(self) -> f32 {
        self.size_pt() * LINE_SPACING * PT_TO_MM
    }

    /// Extra vertical gap inserted before a line of this style.
    fn space_before_mm(self) -> f32 {
        match self {
            TextStyle::SectionHeading => 4.0,
            TextStyle::EntryHeading => 1.5,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub style: TextStyle,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Lays out every non-empty section of `record`. Always returns at least one page.
pub fn layout_record(record: &ResumeRecord, config: &PageConfig) -> Vec<PageLayout> {
    let mut cursor = Cursor::new(config);

    cursor.paragraph(&record.name, TextStyle::Name, 0.0);
    cursor.paragraph(&record.title, TextStyle::Title, 0.0);
    cursor.paragraph(&record.contact.items().join(" | "), TextStyle::Contact, 0.0);

    if !record.summary.trim().is_empty() {
        cursor.section_heading("SUMMARY");
        cursor.paragraph(&record.summary, TextStyle::Body, 0.0);
    }

    let skills = non_blank(&record.skills);
    if !skills.is_empty() {
        cursor.section_heading("SKILLS");
        cursor.paragraph(&skills.join(", "), TextStyle::Body, 0.0);
    }

    if !record.experience.is_empty() {
        cursor.section_heading("EXPERIENCE");
        for job in &record.experience {
            cursor.entry_heading(&job.role);
            cursor.paragraph(
                &join_present(&[&job.organization, &job.duration]),
                TextStyle::Meta,
                0.0,
            );
            for achievement in &job.achievements {
                cursor.bullet(achievement);
            }
        }
    }

    if !record.education.is_empty() {
        cursor.section_heading("EDUCATION");
        for school in &record.education {
            cursor.entry_heading(&school.degree);
            cursor.paragraph(
                &join_present(&[&school.institution, &school.duration]),
                TextStyle::Meta,
                0.0,
            );
        }
    }

    if !record.projects.is_empty() {
        cursor.section_heading("PROJECTS");
        for project in &record.projects {
            cursor.entry_heading(&project.name);
            cursor.paragraph(&project.description, TextStyle::Body, 0.0);
            let technologies = non_blank(&project.technologies);
            if !technologies.is_empty() {
                cursor.paragraph(
                    &format!("Technologies: {}", technologies.join(", ")),
                    TextStyle::Meta,
                    0.0,
                );
            }
        }
    }

    cursor.finish()
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_present(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// Top-down writing position. Starts a new page when the next line would cross the
/// bottom margin.
struct Cursor<'a> {
    config: &'a PageConfig,
    pages: Vec<PageLayout>,
    /// Baseline of the most recently placed line.
    y_mm: f32,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a PageConfig) -> Self {
        Self {
            config,
            pages: vec![PageLayout::default()],
            y_mm: config.height_mm - config.margin_mm,
        }
    }

    fn top(&self) -> f32 {
        self.config.height_mm - self.config.margin_mm
    }

    fn at_page_top(&self) -> bool {
        (self.y_mm - self.top()).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y_mm = self.top();
    }

    /// Ensures `needed_mm` fits below the current position, breaking the page otherwise.
    fn reserve(&mut self, needed_mm: f32) {
        if self.y_mm - needed_mm < self.config.margin_mm && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Advances to the next baseline for `style` and returns it.
    fn next_baseline(&mut self, style: TextStyle) -> f32 {
        let gap = if self.at_page_top() {
            0.0
        } else {
            style.space_before_mm()
        };
        self.reserve(gap + style.line_height_mm());
        let gap = if self.at_page_top() { 0.0 } else { gap };
        self.y_mm -= gap + style.line_height_mm();
        self.y_mm
    }

    fn place(&mut self, text: String, style: TextStyle, x_mm: f32, y_mm: f32) {
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                text,
                style,
                x_mm,
                y_mm,
            });
        }
    }

    fn max_width_em(&self, style: TextStyle, indent_mm: f32) -> f32 {
        (self.config.text_width_mm() - indent_mm) / (style.size_pt() * PT_TO_MM)
    }

    /// Wraps `text` and places each line. Blank text places nothing.
    fn paragraph(&mut self, text: &str, style: TextStyle, indent_mm: f32) {
        let metrics = get_metrics(style.font());
        let x = self.config.margin_mm + indent_mm;
        for line in metrics.wrap(text, self.max_width_em(style, indent_mm)) {
            let y = self.next_baseline(style);
            self.place(line, style, x, y);
        }
    }

    /// Section headings keep at least one body line below them on the same page.
    fn section_heading(&mut self, title: &str) {
        let style = TextStyle::SectionHeading;
        self.reserve(
            style.space_before_mm() + style.line_height_mm() + TextStyle::Body.line_height_mm(),
        );
        self.paragraph(title, style, 0.0);
    }

    fn entry_heading(&mut self, text: &str) {
        let style = TextStyle::EntryHeading;
        if text.trim().is_empty() {
            return;
        }
        self.reserve(style.space_before_mm() + style.line_height_mm() + TextStyle::Meta.line_height_mm());
        self.paragraph(text, style, 0.0);
    }

    /// A hanging-indent bullet: marker on the first line, text aligned after it.
    fn bullet(&mut self, text: &str) {
        let style = TextStyle::Body;
        let text_indent = BULLET_INDENT_MM + BULLET_TEXT_OFFSET_MM;
        let metrics = get_metrics(style.font());
        let lines = metrics.wrap(text, self.max_width_em(style, text_indent));

        for (i, line) in lines.into_iter().enumerate() {
            let y = self.next_baseline(style);
            if i == 0 {
                self.place(
                    BULLET_MARKER.to_string(),
                    style,
                    self.config.margin_mm + BULLET_INDENT_MM,
                    y,
                );
            }
            self.place(line, style, self.config.margin_mm + text_indent, y);
        }
    }

    fn finish(self) -> Vec<PageLayout> {
        self.pages
    }
}
