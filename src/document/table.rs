//! The pricing table: header, one row per line item, and a total row.

use rust_decimal::Decimal;

use super::layout::{Align, Font, PageCanvas, BODY, CONTENT_WIDTH, MARGIN, MM};
use crate::pricing::PricingResult;

pub const CURRENCY_SYMBOL: &str = "$";
pub const HEADER: [&str; 3] = ["Item", "Duration", "Price (USD)"];

const COLUMN_WIDTHS: [f32; 3] = [90.0 * MM, 40.0 * MM, 30.0 * MM];
const COLUMN_ALIGN: [Align; 3] = [Align::Left, Align::Center, Align::Right];

const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_TOP: f32 = 3.0;
const CELL_PADDING_BOTTOM: f32 = 3.0;
const HEADER_PADDING_BOTTOM: f32 = 8.0;

const HEADER_BACKGROUND: f32 = 0.827;
const GRID_GRAY: f32 = 0.5;
const GRID_WIDTH: f32 = 0.25;
const HEADER_RULE_WIDTH: f32 = 1.0;

/// Format an amount with the currency symbol and exactly two decimals.
pub fn format_price(amount: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{:.2}", amount)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    Body,
    Total,
}

/// Table rows as display strings, in order.
pub fn table_rows(pricing: &PricingResult) -> Vec<[String; 3]> {
    let mut rows = Vec::with_capacity(pricing.items.len() + 2);
    rows.push(HEADER.map(str::to_string));
    for item in &pricing.items {
        rows.push([
            item.name.clone(),
            item.duration.clone(),
            format_price(item.price),
        ]);
    }
    rows.push([String::new(), "Total".to_string(), format_price(pricing.total)]);
    rows
}

pub fn draw_pricing_table(canvas: &mut PageCanvas, pricing: &PricingResult) {
    let table_width: f32 = COLUMN_WIDTHS.iter().sum();
    let left = MARGIN + (CONTENT_WIDTH - table_width) / 2.0;
    let rows = table_rows(pricing);
    let last = rows.len() - 1;

    for (index, row) in rows.iter().enumerate() {
        let kind = match index {
            0 => RowKind::Header,
            i if i == last => RowKind::Total,
            _ => RowKind::Body,
        };
        let padding_bottom = if kind == RowKind::Header {
            HEADER_PADDING_BOTTOM
        } else {
            CELL_PADDING_BOTTOM
        };
        let height = CELL_PADDING_TOP + BODY.leading + padding_bottom;

        canvas.ensure_space(height);
        let top = canvas.cursor_y();
        let bottom = top - height;

        if kind == RowKind::Header {
            canvas.fill_rect(left, bottom, table_width, height, HEADER_BACKGROUND);
        }

        let font = if kind == RowKind::Header {
            Font::Bold
        } else {
            Font::Regular
        };
        let baseline = bottom + padding_bottom + (BODY.leading - BODY.size);
        let mut x = left;
        for ((cell, width), align) in row.iter().zip(COLUMN_WIDTHS).zip(COLUMN_ALIGN) {
            canvas.text_in(
                x + CELL_PADDING_X,
                width - 2.0 * CELL_PADDING_X,
                baseline,
                cell,
                font,
                BODY.size,
                align,
            );
            x += width;
        }

        // the total row sits outside the grid
        if kind != RowKind::Total {
            draw_row_grid(canvas, left, top, bottom);
        }
        if kind == RowKind::Header {
            canvas.line(
                (left, bottom),
                (left + table_width, bottom),
                HEADER_RULE_WIDTH,
                0.0,
            );
        }

        canvas.advance(height);
    }
}

fn draw_row_grid(canvas: &mut PageCanvas, left: f32, top: f32, bottom: f32) {
    let right = left + COLUMN_WIDTHS.iter().sum::<f32>();
    canvas.line((left, top), (right, top), GRID_WIDTH, GRID_GRAY);
    canvas.line((left, bottom), (right, bottom), GRID_WIDTH, GRID_GRAY);

    let mut x = left;
    canvas.line((x, top), (x, bottom), GRID_WIDTH, GRID_GRAY);
    for width in COLUMN_WIDTHS {
        x += width;
        canvas.line((x, top), (x, bottom), GRID_WIDTH, GRID_GRAY);
    }
}
