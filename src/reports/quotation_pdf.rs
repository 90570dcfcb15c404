//! Quotation PDF export.
//!
//! Rendering happens in two steps: [`layout`] turns a [`QuotationDocument`] into positioned text
//! runs and rules per A4 page, then [`render`] draws them with `printpdf`. Keeping the layout
//! pure makes pagination testable without parsing PDF output.

use chrono::NaiveDate;
use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};
use rust_decimal::Decimal;
use serde::Serialize;

use super::ReportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT_MM: f32 = 15.0;
const MARGIN_RIGHT_MM: f32 = 195.0;
const MARGIN_TOP_MM: f32 = 280.0;
const MARGIN_BOTTOM_MM: f32 = 25.0;
const ROW_HEIGHT_MM: f32 = 6.0;
const BODY_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 11.0;

/// Item table columns: (header, x offset in mm, max characters).
const COLUMNS: [(&str, f32, usize); 6] = [
    ("#", 15.0, 3),
    ("Description", 23.0, 48),
    ("Qty", 115.0, 10),
    ("Unit price", 133.0, 12),
    ("Disc. %", 155.0, 7),
    ("Line total", 172.0, 14),
];

#[derive(Debug, Clone, Default)]
pub struct Party {
    pub name: String,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DocumentLine {
    pub position: i32,
    pub description: String,
    /// Variant parameters already rendered as `key: value` pairs.
    pub parameters: Vec<(String, String)>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone)]
pub struct QuotationDocument {
    pub quotation_number: String,
    pub title: Option<String>,
    pub issued_on: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub currency: String,
    pub seller: Party,
    pub buyer: Party,
    pub lines: Vec<DocumentLine>,
    pub total: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size: f32,
    pub bold: bool,
}

/// Horizontal rule at `y_mm` spanning the printable width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageLayout {
    pub texts: Vec<TextRun>,
    pub rules: Vec<Rule>,
}

impl PageLayout {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('~');
    out
}

struct Cursor {
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PageLayout::default()],
            y: MARGIN_TOP_MM,
        }
    }

    fn page(&mut self) -> &mut PageLayout {
        // `pages` is never empty
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, text: impl Into<String>, x_mm: f32, size: f32, bold: bool) {
        let y_mm = self.y;
        self.page().texts.push(TextRun {
            text: text.into(),
            x_mm,
            y_mm,
            size,
            bold,
        });
    }

    fn rule(&mut self) {
        let y_mm = self.y + 1.5;
        self.page().rules.push(Rule { y_mm });
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Starts a new page when fewer than `needed` millimetres remain.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed < MARGIN_BOTTOM_MM {
            self.pages.push(PageLayout::default());
            self.y = MARGIN_TOP_MM;
            true
        } else {
            false
        }
    }
}

fn party_block(cursor: &mut Cursor, label: &str, party: &Party, x_mm: f32, top: f32) -> f32 {
    cursor.y = top;
    cursor.text(label, x_mm, BODY_SIZE, true);
    cursor.advance(ROW_HEIGHT_MM);
    cursor.text(truncate(&party.name, 40), x_mm, BODY_SIZE, false);
    cursor.advance(ROW_HEIGHT_MM);
    if let Some(address) = party.address.as_deref().filter(|a| !a.trim().is_empty()) {
        for line in address.lines().take(3) {
            cursor.text(truncate(line.trim(), 40), x_mm, BODY_SIZE, false);
            cursor.advance(ROW_HEIGHT_MM);
        }
    }
    if let Some(tax_id) = party.tax_id.as_deref().filter(|t| !t.trim().is_empty()) {
        cursor.text(format!("Tax ID: {tax_id}"), x_mm, BODY_SIZE, false);
        cursor.advance(ROW_HEIGHT_MM);
    }
    cursor.y
}

fn table_header(cursor: &mut Cursor) {
    for (title, x, _) in COLUMNS {
        cursor.text(title, x, BODY_SIZE, true);
    }
    cursor.rule();
    cursor.advance(ROW_HEIGHT_MM);
}

/// Computes the positioned content of every page.
pub fn layout(doc: &QuotationDocument) -> Vec<PageLayout> {
    let mut cursor = Cursor::new();

    cursor.text(
        format!("Quotation {}", doc.quotation_number),
        MARGIN_LEFT_MM,
        TITLE_SIZE,
        true,
    );
    cursor.advance(ROW_HEIGHT_MM * 1.5);
    if let Some(title) = doc.title.as_deref().filter(|t| !t.trim().is_empty()) {
        cursor.text(truncate(title, 90), MARGIN_LEFT_MM, HEADING_SIZE, false);
        cursor.advance(ROW_HEIGHT_MM);
    }
    cursor.text(
        format!("Date: {}", doc.issued_on.format("%Y-%m-%d")),
        MARGIN_LEFT_MM,
        BODY_SIZE,
        false,
    );
    if let Some(valid_until) = doc.valid_until {
        cursor.text(
            format!("Valid until: {}", valid_until.format("%Y-%m-%d")),
            110.0,
            BODY_SIZE,
            false,
        );
    }
    cursor.advance(ROW_HEIGHT_MM * 2.0);

    let top = cursor.y;
    let seller_bottom = party_block(&mut cursor, "Seller", &doc.seller, MARGIN_LEFT_MM, top);
    let buyer_bottom = party_block(&mut cursor, "Buyer", &doc.buyer, 110.0, top);
    cursor.y = seller_bottom.min(buyer_bottom);
    cursor.advance(ROW_HEIGHT_MM);

    table_header(&mut cursor);

    for line in &doc.lines {
        let parameter_rows = usize::from(!line.parameters.is_empty());
        let needed = ROW_HEIGHT_MM * (1 + parameter_rows) as f32;
        if cursor.ensure_space(needed) {
            table_header(&mut cursor);
        }

        let cells = [
            line.position.to_string(),
            line.description.clone(),
            line.quantity.normalize().to_string(),
            money(line.unit_price),
            line.discount.normalize().to_string(),
            money(line.line_total),
        ];
        for ((_, x, max), cell) in COLUMNS.iter().zip(cells) {
            cursor.text(truncate(&cell, *max), *x, BODY_SIZE, false);
        }
        cursor.advance(ROW_HEIGHT_MM);

        if parameter_rows > 0 {
            let params = line
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", ");
            cursor.text(truncate(&params, 60), COLUMNS[1].1, BODY_SIZE - 1.0, false);
            cursor.advance(ROW_HEIGHT_MM);
        }
    }

    cursor.ensure_space(ROW_HEIGHT_MM * 3.0);
    cursor.rule();
    cursor.advance(ROW_HEIGHT_MM);
    cursor.text(
        format!("Total: {} {}", money(doc.total), doc.currency),
        COLUMNS[4].1,
        HEADING_SIZE,
        true,
    );
    cursor.advance(ROW_HEIGHT_MM * 2.0);

    if let Some(notes) = doc.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        cursor.ensure_space(ROW_HEIGHT_MM * 2.0);
        cursor.text("Notes", MARGIN_LEFT_MM, BODY_SIZE, true);
        cursor.advance(ROW_HEIGHT_MM);
        for line in notes.lines() {
            cursor.ensure_space(ROW_HEIGHT_MM);
            cursor.text(truncate(line, 100), MARGIN_LEFT_MM, BODY_SIZE, false);
            cursor.advance(ROW_HEIGHT_MM);
        }
    }

    let footer = match doc.valid_until {
        Some(date) => format!(
            "This offer is valid until {}. Prices in {}.",
            date.format("%Y-%m-%d"),
            doc.currency
        ),
        None => format!("Prices in {}.", doc.currency),
    };
    let page_count = cursor.pages.len();
    for (index, page) in cursor.pages.iter_mut().enumerate() {
        page.texts.push(TextRun {
            text: footer.clone(),
            x_mm: MARGIN_LEFT_MM,
            y_mm: 12.0,
            size: BODY_SIZE - 1.0,
            bold: false,
        });
        page.texts.push(TextRun {
            text: format!("Page {} / {}", index + 1, page_count),
            x_mm: 175.0,
            y_mm: 12.0,
            size: BODY_SIZE - 1.0,
            bold: false,
        });
    }

    cursor.pages
}

/// Renders the quotation as PDF bytes.
pub fn render(doc: &QuotationDocument) -> Result<Vec<u8>, ReportError> {
    let pages = layout(doc);

    let (pdf, first_page, first_layer) = PdfDocument::new(
        format!("Quotation {}", doc.quotation_number),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = pdf.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = pdf.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = pdf.get_page(page_index).get_layer(layer_index);

        for run in &page.texts {
            let font = if run.bold { &bold } else { &regular };
            layer.use_text(run.text.clone(), run.size, Mm(run.x_mm), Mm(run.y_mm), font);
        }
        for rule in &page.rules {
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(MARGIN_LEFT_MM), Mm(rule.y_mm)), false),
                    (Point::new(Mm(MARGIN_RIGHT_MM), Mm(rule.y_mm)), false),
                ],
                is_closed: false,
            });
        }
    }

    Ok(pdf.save_to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn document(lines: Vec<DocumentLine>, total: Decimal) -> QuotationDocument {
        QuotationDocument {
            quotation_number: "Q-2024-001".into(),
            title: Some("Booth equipment".into()),
            issued_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 3, 31),
            currency: "EUR".into(),
            seller: Party {
                name: "Seller GmbH".into(),
                address: Some("Main St 1\nBerlin".into()),
                tax_id: Some("DE123".into()),
            },
            buyer: Party {
                name: "Buyer Ltd".into(),
                ..Default::default()
            },
            lines,
            total,
            notes: Some("Delivery within 14 days".into()),
        }
    }

    fn line(position: i32) -> DocumentLine {
        DocumentLine {
            position,
            description: format!("Item {position}"),
            parameters: vec![("size".into(), "XL".into())],
            quantity: dec!(2),
            unit_price: dec!(100),
            discount: dec!(10),
            line_total: dec!(180),
        }
    }

    #[test]
    fn zero_items_keep_header_and_zero_total() {
        let pages = layout(&document(vec![], Decimal::ZERO));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains_text("Quotation Q-2024-001"));
        assert!(pages[0].contains_text("Seller GmbH"));
        assert!(pages[0].contains_text("Buyer Ltd"));
        assert!(pages[0].contains_text("Total: 0.00 EUR"));
    }

    #[test]
    fn totals_are_printed_with_two_decimals() {
        let pages = layout(&document(vec![line(1)], dec!(180.456)));
        assert!(pages[0].contains_text("Total: 180.46 EUR"));
        assert!(pages[0].contains_text("size: XL"));
    }

    #[test]
    fn long_quotations_paginate_and_repeat_table_header() {
        let lines = (1..=60).map(line).collect();
        let pages = layout(&document(lines, dec!(10800)));
        assert!(pages.len() > 1);
        for page in &pages[1..] {
            assert!(page.contains_text("Description"));
        }
        let last = pages.last().unwrap();
        assert!(last.contains_text("Total: 10800.00 EUR"));
        assert!(last.contains_text(&format!("Page {} / {}", pages.len(), pages.len())));
        for page in &pages {
            assert!(page
                .texts
                .iter()
                .all(|t| t.y_mm >= 10.0 && t.y_mm <= MARGIN_TOP_MM));
        }
    }

    #[test]
    fn long_descriptions_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let bytes = render(&document(vec![], Decimal::ZERO)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
