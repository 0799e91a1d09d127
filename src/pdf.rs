use std::io::BufWriter;

use printpdf::*;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{BookkeeperError, Result};
use crate::fmt::money;
use crate::models::SeriesPoint;

// US Letter landscape (mm)
const PAGE_W: f32 = 279.4;
const PAGE_H: f32 = 215.9;
const MARGIN: f32 = 20.0;
const PLOT_LEFT: f32 = MARGIN + 25.0;
const PLOT_BOTTOM: f32 = MARGIN + 15.0;
const PLOT_RIGHT: f32 = PAGE_W - MARGIN;
const PLOT_TOP: f32 = PAGE_H - MARGIN - 20.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 16.0;
const Y_TICKS: usize = 4;

fn pdf_err(e: impl std::fmt::Debug) -> BookkeeperError {
    BookkeeperError::Pdf(format!("{e:?}"))
}

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

fn line(layer: &PdfLayerReference, points: &[(f32, f32)]) {
    let line = Line {
        points: points
            .iter()
            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect(),
        is_closed: false,
    };
    layer.add_line(line);
}

/// Cumulative spending as a line chart on a single landscape page.
pub fn render_spending_chart(series: &[SeriesPoint], title: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Chart");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;
    let layer = doc.get_page(page).get_layer(layer);

    layer.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(PAGE_H - MARGIN), &font_bold);
    let generated = chrono::Local::now()
        .format("Generated %Y-%m-%d %H:%M")
        .to_string();
    layer.use_text(generated, 8.0, Mm(MARGIN), Mm(PAGE_H - MARGIN - 6.0), &font);

    // Axes
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.5);
    line(&layer, &[(PLOT_LEFT, PLOT_TOP), (PLOT_LEFT, PLOT_BOTTOM), (PLOT_RIGHT, PLOT_BOTTOM)]);

    if series.is_empty() {
        layer.use_text(
            "No transactions in range",
            FONT_SIZE,
            Mm(PLOT_LEFT + 5.0),
            Mm((PLOT_TOP + PLOT_BOTTOM) / 2.0),
            &font,
        );
        return save(doc);
    }

    let values: Vec<f64> = series
        .iter()
        .map(|p| p.cumulative.to_f64().unwrap_or(0.0))
        .collect();
    let mut lo = values.iter().copied().fold(0.0f64, f64::min);
    let mut hi = values.iter().copied().fold(0.0f64, f64::max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let first = series[0].date;
    let span_days = (series[series.len() - 1].date - first).num_days().max(1) as f32;
    let x_of = |date: chrono::NaiveDate| {
        PLOT_LEFT + (date - first).num_days() as f32 / span_days * (PLOT_RIGHT - PLOT_LEFT)
    };
    let y_of = |v: f64| PLOT_BOTTOM + ((v - lo) / (hi - lo)) as f32 * (PLOT_TOP - PLOT_BOTTOM);

    // Y-axis ticks and gridlines
    layer.set_outline_color(Color::Rgb(Rgb::new(0.8, 0.8, 0.8, None)));
    layer.set_outline_thickness(0.2);
    for i in 0..=Y_TICKS {
        let v = lo + (hi - lo) * i as f64 / Y_TICKS as f64;
        let y = y_of(v);
        line(&layer, &[(PLOT_LEFT, y), (PLOT_RIGHT, y)]);
        let label = rust_decimal::Decimal::from_f64_retain(v)
            .map(money)
            .unwrap_or_default();
        let x = PLOT_LEFT - 2.0 - approx_text_width(&label, FONT_SIZE);
        layer.use_text(label, FONT_SIZE, Mm(x), Mm(y - 1.0), &font);
    }

    // Zero line
    if lo < 0.0 && hi > 0.0 {
        layer.set_outline_color(Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None)));
        layer.set_outline_thickness(0.4);
        line(&layer, &[(PLOT_LEFT, y_of(0.0)), (PLOT_RIGHT, y_of(0.0))]);
    }

    // X-axis labels: first and last day
    let first_label = first.format("%m-%d-%Y").to_string();
    layer.use_text(first_label, FONT_SIZE, Mm(PLOT_LEFT), Mm(PLOT_BOTTOM - 6.0), &font);
    let last = series[series.len() - 1].date;
    if last != first {
        let last_label = last.format("%m-%d-%Y").to_string();
        let x = PLOT_RIGHT - approx_text_width(&last_label, FONT_SIZE);
        layer.use_text(last_label, FONT_SIZE, Mm(x), Mm(PLOT_BOTTOM - 6.0), &font);
    }

    // Series
    let points: Vec<(f32, f32)> = series
        .iter()
        .zip(&values)
        .map(|(p, &v)| (x_of(p.date), y_of(v)))
        .collect();
    layer.set_outline_color(Color::Rgb(Rgb::new(0.12, 0.35, 0.75, None)));
    layer.set_outline_thickness(1.2);
    if points.len() == 1 {
        let (x, y) = points[0];
        line(&layer, &[(x - 1.0, y), (x + 1.0, y)]);
    } else {
        line(&layer, &points);
    }

    save(doc)
}

fn save(doc: PdfDocumentReference) -> Result<Vec<u8>> {
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(pdf_err)?;
    buf.into_inner().map_err(|e| BookkeeperError::Pdf(e.to_string()))
}
