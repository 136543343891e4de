use std::collections::HashMap;

use iocraft::prelude::*;

use crate::color::{Color as AppColor, ColorDepth};
use crate::util::truncate_to_width;

// ---------------------------------------------------------------------------
// Column definition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    /// Key into each [`Row`].
    pub id: String,
    pub header: String,
    /// Share of the width left after fixed columns.
    pub default_width_pct: f32,
    /// Exact width in columns; takes precedence over the percentage.
    pub fixed_width: Option<u16>,
    pub align: TextAlign,
}

impl Column {
    pub fn flex(id: &str, header: &str, pct: f32) -> Self {
        Self {
            id: id.to_owned(),
            header: header.to_owned(),
            default_width_pct: pct,
            fixed_width: None,
            align: TextAlign::Left,
        }
    }

    pub fn fixed(id: &str, header: &str, width: u16) -> Self {
        Self {
            id: id.to_owned(),
            header: header.to_owned(),
            default_width_pct: 0.0,
            fixed_width: Some(width),
            align: TextAlign::Left,
        }
    }

    #[must_use]
    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub color: Option<AppColor>,
    pub bold: bool,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
        }
    }

    pub fn colored(text: impl Into<String>, color: AppColor) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
            bold: false,
        }
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A complete row of cells indexed by column id.
pub type Row = HashMap<String, Cell>;

// ---------------------------------------------------------------------------
// Pre-rendered table data (all owned)
// ---------------------------------------------------------------------------

/// Owned table data that can be moved into the `element!` macro.
pub struct RenderedTable {
    pub header_cells: Vec<HeaderCell>,
    pub body_rows: Vec<RenderedRow>,
    pub total_width: u32,
    pub show_separator: bool,
    pub header_fg: Color,
    pub border_fg: Color,
    pub empty_message: Option<String>,
}

pub struct HeaderCell {
    pub text: String,
    pub width: u32,
    pub align: TextAlign,
}

pub struct RenderedRow {
    pub key: usize,
    pub bg: Option<Color>,
    pub cells: Vec<RenderedCell>,
}

pub struct RenderedCell {
    pub text: String,
    pub fg: Color,
    pub weight: Weight,
    pub width: u32,
    pub align: TextAlign,
}

pub struct TableBuildConfig<'a> {
    pub columns: &'a [Column],
    /// Only the visible window of rows.
    pub rows: &'a [Row],
    /// Absolute index of `rows[0]`.
    pub first_row: usize,
    /// Absolute index of the selected row.
    pub cursor: usize,
    pub total_width: u16,
    pub depth: ColorDepth,
    pub selected_bg: Option<AppColor>,
    pub header_color: Option<AppColor>,
    pub border_color: Option<AppColor>,
    pub show_separator: bool,
    pub empty_message: Option<&'a str>,
}

impl RenderedTable {
    pub fn build(cfg: &TableBuildConfig<'_>) -> Self {
        let depth = cfg.depth;
        let col_widths = compute_column_widths(cfg.columns, cfg.total_width);

        let header_fg = cfg
            .header_color
            .map_or(Color::White, |c| c.to_crossterm_color(depth));
        let border_fg = cfg
            .border_color
            .map_or(Color::DarkGrey, |c| c.to_crossterm_color(depth));
        let selected_bg = cfg.selected_bg.map(|c| c.to_crossterm_color(depth));

        let header_cells = cfg
            .columns
            .iter()
            .zip(col_widths.iter())
            .map(|(col, &w)| HeaderCell {
                text: col.header.clone(),
                width: u32::from(w),
                align: col.align,
            })
            .collect();

        let body_rows = cfg
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let absolute_idx = cfg.first_row + i;
                let bg = (absolute_idx == cfg.cursor).then_some(selected_bg).flatten();
                let cells = cfg
                    .columns
                    .iter()
                    .zip(col_widths.iter())
                    .map(|(col, &w)| {
                        let cell = row.get(&col.id);
                        // One column of padding between cells.
                        let text = cell.map_or_else(String::new, |c| {
                            truncate_to_width(&c.text, usize::from(w.saturating_sub(1)))
                        });
                        let fg = cell
                            .and_then(|c| c.color)
                            .map_or(Color::Reset, |c| c.to_crossterm_color(depth));
                        let weight = if cell.is_some_and(|c| c.bold) {
                            Weight::Bold
                        } else {
                            Weight::Normal
                        };
                        RenderedCell {
                            text,
                            fg,
                            weight,
                            width: u32::from(w),
                            align: col.align,
                        }
                    })
                    .collect();
                RenderedRow {
                    key: absolute_idx,
                    bg,
                    cells,
                }
            })
            .collect();

        let empty_message = if cfg.rows.is_empty() {
            cfg.empty_message.map(String::from)
        } else {
            None
        };

        Self {
            header_cells,
            body_rows,
            total_width: u32::from(cfg.total_width),
            show_separator: cfg.show_separator,
            header_fg,
            border_fg,
            empty_message,
        }
    }

    /// Rows the header occupies above the first body row.
    pub fn header_height(show_separator: bool) -> u16 {
        if show_separator { 2 } else { 1 }
    }
}

// ---------------------------------------------------------------------------
// ScrollableTable component
// ---------------------------------------------------------------------------

#[derive(Default, Props)]
pub struct ScrollableTableProps {
    pub table: Option<RenderedTable>,
}

#[component]
pub fn ScrollableTable(props: &mut ScrollableTableProps) -> impl Into<AnyElement<'static>> {
    let Some(table) = props.table.take() else {
        return element! { View }.into_any();
    };

    element! {
        View(flex_direction: FlexDirection::Column, width: table.total_width) {
            View(
                border_style: if table.show_separator { BorderStyle::Single } else { BorderStyle::None },
                border_edges: Edges::Bottom,
                border_color: table.border_fg,
            ) {
                #(table.header_cells.into_iter().enumerate().map(|(i, hc)| {
                    element! {
                        View(key: i, width: hc.width) {
                            Text(
                                content: hc.text,
                                weight: Weight::Bold,
                                color: table.header_fg,
                                wrap: TextWrap::NoWrap,
                                align: hc.align,
                            )
                        }
                    }
                }))
            }

            #(table.empty_message.into_iter().map(|msg| {
                element! {
                    View(padding_top: 1, padding_left: 2) {
                        Text(content: msg, color: Color::DarkGrey)
                    }
                }
            }))
            #(table.body_rows.into_iter().map(|row| {
                element! {
                    View(key: row.key, background_color: row.bg) {
                        #(row.cells.into_iter().enumerate().map(|(ci, cell)| {
                            element! {
                                View(key: ci, width: cell.width) {
                                    Text(
                                        content: cell.text,
                                        color: cell.fg,
                                        weight: cell.weight,
                                        wrap: TextWrap::NoWrap,
                                        align: cell.align,
                                    )
                                }
                            }
                        }))
                    }
                }
            }))
        }
    }
    .into_any()
}

// ---------------------------------------------------------------------------
// Column width computation
// ---------------------------------------------------------------------------

fn compute_column_widths(columns: &[Column], total: u16) -> Vec<u16> {
    let fixed_total: u16 = columns.iter().filter_map(|c| c.fixed_width).sum();
    let remaining = total.saturating_sub(fixed_total);

    let flex_pct_sum: f32 = columns
        .iter()
        .filter(|c| c.fixed_width.is_none())
        .map(|c| c.default_width_pct)
        .sum();
    let flex_count = columns.iter().filter(|c| c.fixed_width.is_none()).count();

    columns
        .iter()
        .map(|col| {
            if let Some(w) = col.fixed_width {
                return w;
            }
            let ratio = if flex_pct_sum > 0.0 {
                col.default_width_pct / flex_pct_sum
            } else {
                #[allow(clippy::cast_precision_loss)]
                {
                    1.0 / flex_count as f32
                }
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let w = (f32::from(remaining) * ratio).round() as u16;
            w.max(1)
        })
        .collect()
}
