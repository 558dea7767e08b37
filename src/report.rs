use anyhow::Context;
use bytes::Bytes;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use time::OffsetDateTime;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_X: f32 = 20.0;
const TITLE_Y: f32 = 272.0;
const BODY_TOP_Y: f32 = 257.0;
const BODY_BOTTOM_Y: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;
const MAX_LEADING: f32 = 6.0;

/// A titled, line-oriented document ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub lines: Vec<String>,
}

pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &Report) -> anyhow::Result<Bytes>;
}

/// A4 PDF with the title on the first page and a fixed number of lines per page.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    lines_per_page: usize,
}

impl PdfRenderer {
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
        }
    }

    fn leading(&self) -> f32 {
        let fit = (BODY_TOP_Y - BODY_BOTTOM_Y) / self.lines_per_page as f32;
        fit.min(MAX_LEADING)
    }
}

pub fn page_count(lines: usize, lines_per_page: usize) -> usize {
    lines.div_ceil(lines_per_page.max(1)).max(1)
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, report: &Report) -> anyhow::Result<Bytes> {
        let (doc, first_page, first_layer) =
            PdfDocument::new(report.title.as_str(), PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("load Helvetica")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("load Helvetica-Bold")?;

        let pages = page_count(report.lines.len(), self.lines_per_page);
        let leading = self.leading();
        let mut chunks = report.lines.chunks(self.lines_per_page);

        for page_no in 0..pages {
            let (page, layer) = if page_no == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1")
            };
            let canvas = doc.get_page(page).get_layer(layer);

            if page_no == 0 {
                // Rough centering; Helvetica averages ~0.5em per glyph.
                let width = report.title.chars().count() as f32 * 20.0 * 0.5 * 0.3528;
                let x = ((PAGE_WIDTH.0 - width) / 2.0).max(MARGIN_X);
                canvas.use_text(report.title.as_str(), 20.0, Mm(x), Mm(TITLE_Y), &bold);
            }

            let mut y = BODY_TOP_Y;
            for line in chunks.next().unwrap_or_default() {
                canvas.use_text(line.as_str(), 12.0, Mm(MARGIN_X), Mm(y), &regular);
                y -= leading;
            }

            let footer = format!("Page {} of {}", page_no + 1, pages);
            canvas.use_text(footer, 9.0, Mm(MARGIN_X), Mm(FOOTER_Y), &regular);
        }

        let bytes = doc.save_to_bytes().context("serialize pdf")?;
        Ok(Bytes::from(bytes))
    }
}

pub fn report_filename(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("Attendance_Report_{millis}.pdf")
}
