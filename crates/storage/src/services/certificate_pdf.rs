//! Single-page certificate document.
//!
//! A4 landscape drawn with `printpdf` on the built-in Helvetica faces, so no
//! font is embedded. Document id and dates come from the certificate itself
//! and XMP/ICC output is switched off: the same certificate always yields
//! the same bytes.

use chrono::{DateTime, Datelike, Utc};
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, Greyscale, IndirectFontRef, Line, Mm,
    OffsetDateTime, PdfConformance, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Rgb,
};

use crate::error::{Result, StorageError};
use crate::models::Certificate;

pub const FILENAME: &str = "certificado.pdf";
pub const CONTENT_TYPE: &str = "application/pdf";

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
const DESCRIPTION_WRAP: usize = 95;

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

/// "05 de marzo de 2026"
pub fn spanish_date(date: DateTime<Utc>) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{:02} de {} de {}", date.day(), month, date.year())
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn pdf_error(e: printpdf::Error) -> StorageError {
    StorageError::Internal(format!("No se pudo generar el certificado PDF: {e}"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        Ok(Self {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(pdf_error)?,
        })
    }
}

fn grey(level: f32) -> Color {
    Color::Greyscale(Greyscale::new(level, None))
}

fn frame(layer: &PdfLayerReference, inset: f32, thickness: f32) {
    let (left, bottom) = (inset, inset);
    let (right, top) = (PAGE_WIDTH - inset, PAGE_HEIGHT - inset);
    layer.set_outline_thickness(thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(left), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(left), Mm(top)), false),
        ],
        is_closed: true,
    });
}

/// Writes `text` horizontally centred; the width is estimated from an
/// average Helvetica advance.
fn centered(
    layer: &PdfLayerReference,
    text: &str,
    font: &IndirectFontRef,
    size: f32,
    y: f32,
    color: Color,
) {
    let advance = if size >= 20.0 { 0.58 } else { 0.52 };
    let width = text.chars().count() as f32 * size * advance * PT_TO_MM;
    let x = ((PAGE_WIDTH - width) / 2.0).max(14.0);
    layer.set_fill_color(color);
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn draw(layer: &PdfLayerReference, fonts: &Fonts, certificate: &Certificate) {
    layer.set_outline_color(grey(0.25));
    frame(layer, 10.6, 3.0);
    frame(layer, 14.1, 1.0);

    centered(layer, "CERTIFICADO DE PARTICIPACIÓN", &fonts.bold, 28.0, 169.3, grey(0.25));
    centered(
        layer,
        &format!(
            "Se certifica que {} participó como voluntario/a en la actividad:",
            certificate.volunteer_name
        ),
        &fonts.regular,
        16.0,
        144.6,
        grey(0.0),
    );
    centered(
        layer,
        &certificate.activity_title,
        &fonts.bold,
        22.0,
        128.8,
        Color::Rgb(Rgb::new(0.0, 0.2, 0.6, None)),
    );

    let mut y = 116.4;
    for line in wrap(&certificate.description, DESCRIPTION_WRAP).iter().take(5) {
        centered(layer, line, &fonts.italic, 12.0, y, grey(0.0));
        y -= 5.6;
    }

    centered(
        layer,
        &format!("Fecha de la actividad: {}", spanish_date(certificate.activity_date)),
        &fonts.regular,
        14.0,
        75.8,
        grey(0.0),
    );
    centered(
        layer,
        &format!("Horas de participación: {} horas", certificate.hours),
        &fonts.regular,
        14.0,
        68.8,
        grey(0.0),
    );
    centered(
        layer,
        &format!("Código de verificación: {}", certificate.verification_code),
        &fonts.regular,
        10.0,
        35.3,
        grey(0.5),
    );
    centered(
        layer,
        &format!("Fecha de emisión: {}", spanish_date(certificate.issued_at)),
        &fonts.regular,
        10.0,
        30.3,
        grey(0.5),
    );
}

/// Render a certificate to PDF bytes.
pub fn render(certificate: &Certificate) -> Result<Vec<u8>> {
    let issued = OffsetDateTime::from_unix_timestamp(certificate.issued_at.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);

    let (doc, page, layer) = PdfDocument::new(
        format!("Certificado {}", certificate.verification_code),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Certificado".to_string(),
    );
    let doc = doc
        .with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }))
        .with_document_id(certificate.certificate_id.simple().to_string())
        .with_producer("Voluntariado ONG".to_string())
        .with_creation_date(issued)
        .with_mod_date(issued)
        .with_metadata_date(issued);

    let fonts = Fonts::load(&doc)?;
    let layer = doc.get_page(page).get_layer(layer);
    draw(&layer, &fonts, certificate);

    doc.save_to_bytes().map_err(pdf_error)
}
