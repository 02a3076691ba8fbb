//! Frame drawing.
//!
//! Every frame is redrawn in full inside a synchronized update, which keeps
//! the terminal from showing half-drawn states without a diffing buffer.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};
use hrdesk_lib::ManagementTable;
use hrdesk_lib::manage::{ActiveDialog, RowAction, ToastLevel};
use hrdesk_lib::schema::FieldKind;
use hrdesk_lib::table::{Cell, TableBody, TableView};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Mode, Screen};

/// Widest a table column may grow.
const MAX_COLUMN_WIDTH: usize = 32;
const COLUMN_GAP: usize = 2;
const DIALOG_WIDTH: u16 = 60;
const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    reverse: bool,
    dim: bool,
}

impl Style {
    fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn dim(mut self) -> Self {
        self.dim = true;
        self
    }
}

/// Draws the whole screen.
pub fn draw<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let width = width as usize;

    queue!(out, BeginSynchronizedUpdate, Clear(ClearType::All))?;

    let title = format!(" HR Desk  ·  {}", app.source);
    put(out, 0, 0, &fit(&title, width), Style::default().reverse().bold())?;
    draw_tabs(out, app, 1, width)?;

    let screen = app.screen();
    let body_height = (height as usize).saturating_sub(6);
    draw_table(out, screen, 3, width, body_height)?;

    let help = match app.mode() {
        Mode::Table => table_help(),
        Mode::Form => "Tab next field · Space toggle · Enter save · Esc cancel".to_string(),
        Mode::Confirm => "y delete · n cancel".to_string(),
        Mode::Acknowledge => "Enter close".to_string(),
    };
    put(
        out,
        0,
        height.saturating_sub(1),
        &fit(&help, width),
        Style::default().dim(),
    )?;

    draw_dialog(out, &screen.table, screen.field, width as u16, height)?;
    draw_toasts(out, app, width)?;

    queue!(out, EndSynchronizedUpdate)?;
    out.flush()
}

fn table_help() -> String {
    let actions: Vec<String> = RowAction::ALL
        .iter()
        .map(|a| format!("{} {}", a.hint(), a.label().to_lowercase()))
        .collect();
    format!(
        "1-5 screen · ←→ column · s sort · Space toggle · [ ] page · a add · {} · r refresh · q quit",
        actions.join(" · ")
    )
}

fn draw_tabs<W: Write>(out: &mut W, app: &App, row: u16, width: usize) -> io::Result<()> {
    let mut x = 0;
    for (index, screen) in app.screens.iter().enumerate() {
        let label = format!(" {} {} ", index + 1, screen.title);
        let style = if index == app.current {
            Style::fg(Color::Cyan).bold().reverse()
        } else {
            Style::default()
        };
        if x + label.width() > width {
            break;
        }
        put(out, x as u16, row, &label, style)?;
        x += label.width() + 1;
    }
    Ok(())
}

fn draw_table<W: Write>(
    out: &mut W,
    screen: &Screen,
    top: u16,
    width: usize,
    body_height: usize,
) -> io::Result<()> {
    let view = screen.table.view(screen.loading);
    let widths = column_widths(&view);

    // Header
    let mut x = 0;
    for (index, (header, column_width)) in view.headers.iter().zip(&widths).enumerate() {
        if x >= width {
            break;
        }
        let mut style = Style::default().bold();
        if index == screen.column {
            style = Style::fg(Color::Cyan).bold();
        }
        put(out, x as u16, top, &fit(&header.title(), *column_width), style)?;
        x += column_width + COLUMN_GAP;
    }
    put(out, 0, top + 1, &"─".repeat(width), Style::default().dim())?;

    let first_row = top + 2;
    match &view.body {
        TableBody::Loading { .. } => {
            put(out, 1, first_row, hrdesk_lib::table::LOADING_TEXT, Style::default().dim())?;
        }
        TableBody::Empty { text, .. } => {
            put(out, 1, first_row, text, Style::default().dim())?;
        }
        TableBody::Rows(rows) => {
            for (index, row) in rows.iter().take(body_height).enumerate() {
                let y = first_row + index as u16;
                let selected = index == screen.cursor;
                if selected {
                    put(out, 0, y, &" ".repeat(width), Style::default().reverse())?;
                }
                let mut x = 0;
                for (cell, column_width) in row.cells.iter().zip(&widths) {
                    if x >= width {
                        break;
                    }
                    let mut style = cell_style(cell);
                    if selected {
                        style = style.reverse();
                    }
                    put(out, x as u16, y, &fit(&cell_text(cell), *column_width), style)?;
                    x += column_width + COLUMN_GAP;
                }
            }
        }
    }

    let footer = match &view.page {
        Some(page) => format!(
            "Page {} of {}  ·  {} record(s)",
            page.page, page.total_pages, page.total
        ),
        None => format!("{} record(s)", screen.table.items().len()),
    };
    let footer_row = first_row + body_height as u16;
    put(out, 0, footer_row, &fit(&footer, width), Style::default().dim())
}

fn column_widths(view: &TableView) -> Vec<usize> {
    view.headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let cells = view
                .rows()
                .iter()
                .filter_map(|row| row.cells.get(index))
                .map(|cell| cell_text(cell).width());
            cells
                .chain(std::iter::once(header.title().width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Toggle { on: true, .. } => "● On".to_string(),
        Cell::Toggle { on: false, .. } => "○ Off".to_string(),
    }
}

fn cell_style(cell: &Cell) -> Style {
    match cell {
        Cell::Text(_) => Style::default(),
        Cell::Toggle { on: true, .. } => Style::fg(Color::Green),
        Cell::Toggle { on: false, .. } => Style::fg(Color::DarkGrey),
    }
}

fn draw_dialog<W: Write>(
    out: &mut W,
    table: &ManagementTable,
    focused: usize,
    width: u16,
    height: u16,
) -> io::Result<()> {
    let Some(title) = table.dialog_title() else {
        return Ok(());
    };
    let inner = DIALOG_WIDTH.min(width.saturating_sub(4)) as usize;

    let mut lines: Vec<(String, Style)> = Vec::new();
    match table.dialog() {
        ActiveDialog::Closed => return Ok(()),
        ActiveDialog::Add | ActiveDialog::Edit(_) => {
            let mut editable = 0;
            for field in table.fields() {
                let value = table.form().effective(&field.key);
                let shown = match field.kind {
                    FieldKind::Switch => {
                        if value.as_bool().unwrap_or(false) {
                            "[x]".to_string()
                        } else {
                            "[ ]".to_string()
                        }
                    }
                    FieldKind::Text | FieldKind::Number | FieldKind::Time => value.to_string(),
                };
                let is_focused = !field.readonly && editable == focused;
                if !field.readonly {
                    editable += 1;
                }
                let marker = if is_focused { ">" } else { " " };
                let line = format!("{} {}: {}", marker, field.label, shown);
                let style = if field.readonly {
                    Style::default().dim()
                } else if is_focused {
                    Style::fg(Color::Cyan).bold()
                } else {
                    Style::default()
                };
                lines.push((line, style));
                if let Some(message) = table.errors().get(&field.key) {
                    lines.push((format!("    {}", message), Style::fg(Color::Red)));
                }
            }
            lines.push((String::new(), Style::default()));
            let footer = if table.is_submitting() {
                "Saving…"
            } else {
                "Enter save · Esc cancel"
            };
            lines.push((footer.to_string(), Style::default().dim()));
        }
        ActiveDialog::ConfirmDelete(target) => {
            for line in wrap(&target.prompt(), inner) {
                lines.push((line, Style::default()));
            }
            lines.push((String::new(), Style::default()));
            let footer = if table.is_deleting() {
                "Deleting…"
            } else {
                "[y] Delete   [n] Cancel"
            };
            lines.push((footer.to_string(), Style::fg(Color::Yellow)));
        }
        ActiveDialog::Acknowledge(ack) => {
            let style = if ack.success {
                Style::fg(Color::Green)
            } else {
                Style::fg(Color::Red)
            };
            for line in wrap(&ack.message, inner) {
                lines.push((line, style));
            }
            lines.push((String::new(), Style::default()));
            lines.push(("[Enter] OK".to_string(), Style::default().dim()));
        }
    }

    let box_height = lines.len() as u16 + 4;
    let left = width.saturating_sub(inner as u16 + 4) / 2;
    let top = height.saturating_sub(box_height) / 2;
    let frame = Style::default();

    put(out, left, top, &format!("┌{}┐", "─".repeat(inner + 2)), frame)?;
    put(
        out,
        left,
        top + 1,
        &format!("│ {} │", fit(&title, inner)),
        frame.bold(),
    )?;
    put(out, left, top + 2, &format!("├{}┤", "─".repeat(inner + 2)), frame)?;
    for (offset, (line, style)) in lines.iter().enumerate() {
        let y = top + 3 + offset as u16;
        put(out, left, y, "│ ", frame)?;
        put(out, left + 2, y, &fit(line, inner), *style)?;
        put(out, left + 2 + inner as u16, y, " │", frame)?;
    }
    put(
        out,
        left,
        top + box_height - 1,
        &format!("└{}┘", "─".repeat(inner + 2)),
        frame,
    )
}

fn draw_toasts<W: Write>(out: &mut W, app: &App, width: usize) -> io::Result<()> {
    let visible = app.toasts.iter().rev().take(MAX_VISIBLE_TOASTS);
    for (index, active) in visible.enumerate() {
        let (symbol, color) = match active.toast.level {
            ToastLevel::Info => ("i", Color::Blue),
            ToastLevel::Success => ("✓", Color::Green),
            ToastLevel::Error => ("✗", Color::Red),
        };
        let text = format!(" {} {} ", symbol, active.toast.message);
        let text = fit(&text, text.width().min(width / 2));
        let x = width.saturating_sub(text.width() + 1);
        let style = Style {
            fg: Some(Color::Black),
            bg: Some(color),
            ..Style::default()
        };
        put(out, x as u16, 2 + index as u16, &text, style)?;
    }
    Ok(())
}

fn put<W: Write>(out: &mut W, x: u16, y: u16, text: &str, style: Style) -> io::Result<()> {
    queue!(out, MoveTo(x, y))?;
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(fg))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(bg))?;
    }
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if style.reverse {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
}

/// Pads or truncates `text` to exactly `width` display columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return format!("{}{}", text, " ".repeat(width - text.width()));
    }
    if width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    used += 1;
    result.push_str(&" ".repeat(width.saturating_sub(used)));
    result
}

/// Greedy word wrap by display width.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.width()
        } else {
            line.width() + 1 + word.width()
        };
        if needed > width && !line.is_empty() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("abc", 0), "");
        // Wide characters count as two columns.
        assert_eq!(fit("日本語", 4), "日… ");
        assert_eq!(fit("日本語", 4).width(), 4);
    }

    #[test]
    fn test_wrap() {
        let lines = wrap("Are you sure you want to delete this?", 12);
        assert_eq!(lines, vec!["Are you sure", "you want to", "delete this?"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_toggle_cells() {
        assert_eq!(
            cell_text(&Cell::Toggle {
                key: "is_active".into(),
                on: false
            }),
            "○ Off"
        );
        assert_eq!(cell_text(&Cell::text("Ops")), "Ops");
    }
}
