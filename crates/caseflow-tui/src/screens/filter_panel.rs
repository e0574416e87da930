//! Filter panel — the draft surface of a registry screen.
//!
//! The panel edits the view's *draft* filter: nothing is fetched while
//! typing. `Enter` publishes the draft (the engine then refetches page 1),
//! `Esc` closes the panel with the draft kept staged, `c` resets every
//! field to its schema default.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tui_input::{Input, InputRequest};

use caseflow_core::{
    FieldKind, FieldSpec, FilterError, FilterSchema, FilterState, FilterValue, ListView,
};

use crate::theme;

// ── Host ─────────────────────────────────────────────────────────────

/// The slice of a view the panel drives. Keeps the panel non-generic.
pub trait FilterHost {
    fn edit(&self, field: &str, value: FilterValue) -> Result<(), FilterError>;
    fn apply(&self) -> u64;
    fn clear(&self) -> u64;
    fn draft(&self) -> FilterState;
    fn is_dirty(&self) -> bool;
    fn is_field_dirty(&self, field: &str) -> bool;
}

impl<T: Send + Sync + 'static> FilterHost for ListView<T> {
    fn edit(&self, field: &str, value: FilterValue) -> Result<(), FilterError> {
        Self::edit(self, field, value)
    }

    fn apply(&self) -> u64 {
        Self::apply(self)
    }

    fn clear(&self) -> u64 {
        Self::clear(self)
    }

    fn draft(&self) -> FilterState {
        Self::draft(self)
    }

    fn is_dirty(&self) -> bool {
        Self::is_dirty(self)
    }

    fn is_field_dirty(&self, field: &str) -> bool {
        Self::is_field_dirty(self, field)
    }
}

// ── Panel state ──────────────────────────────────────────────────────

/// What a key press did to the panel, as seen by the owning screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOutcome {
    /// Panel closed; the draft stays staged.
    Closed,
    /// Draft published under the returned generation; close the panel.
    Applied(u64),
    /// Every field reset to its default; panel stays open.
    Cleared(u64),
}

enum Editor {
    Text(Input),
    /// Free-form multi value, comma separated. Used when the schema has
    /// no vocabulary for the field.
    Tags(Input),
    Choices {
        options: Vec<String>,
        picked: Vec<bool>,
        cursor: usize,
    },
    NumberRange {
        lo: Input,
        hi: Input,
        hi_side: bool,
    },
    DateRange {
        lo: Input,
        hi: Input,
        hi_side: bool,
    },
}

struct PanelField {
    name: String,
    label: String,
    editor: Editor,
    dirty: bool,
}

impl PanelField {
    fn new(spec: &FieldSpec, value: Option<&FilterValue>, dirty: bool) -> Self {
        let value = value.unwrap_or_else(|| spec.default());
        let editor = match (spec.kind(), value) {
            (FieldKind::Multi, FilterValue::Multi(picked)) if !spec.options().is_empty() => {
                Editor::Choices {
                    picked: spec.options().iter().map(|o| picked.contains(o)).collect(),
                    options: spec.options().to_vec(),
                    cursor: 0,
                }
            }
            (FieldKind::Multi, FilterValue::Multi(picked)) => {
                Editor::Tags(Input::new(picked.join(", ")))
            }
            (FieldKind::NumberRange, FilterValue::NumberRange { min, max }) => {
                Editor::NumberRange {
                    lo: Input::new(min.map(format_number).unwrap_or_default()),
                    hi: Input::new(max.map(format_number).unwrap_or_default()),
                    hi_side: false,
                }
            }
            (FieldKind::DateRange, FilterValue::DateRange { from, to }) => Editor::DateRange {
                lo: Input::new(from.map(format_date).unwrap_or_default()),
                hi: Input::new(to.map(format_date).unwrap_or_default()),
                hi_side: false,
            },
            // Text, and any kind/value mismatch (cannot happen for a
            // store built from the same schema).
            (_, value) => Editor::Text(Input::new(value.to_string())),
        };

        Self {
            name: spec.name().to_owned(),
            label: spec.label().to_owned(),
            editor,
            dirty,
        }
    }

    /// Parse the editor back into a filter value.
    fn value(&self) -> Result<FilterValue, String> {
        match &self.editor {
            Editor::Text(input) => Ok(FilterValue::text(input.value().trim())),
            Editor::Tags(input) => Ok(FilterValue::Multi(split_tags(input.value()))),
            Editor::Choices {
                options, picked, ..
            } => Ok(FilterValue::Multi(
                options
                    .iter()
                    .zip(picked)
                    .filter(|(_, picked)| **picked)
                    .map(|(option, _)| option.clone())
                    .collect(),
            )),
            Editor::NumberRange { lo, hi, .. } => Ok(FilterValue::NumberRange {
                min: parse_number(lo.value())?,
                max: parse_number(hi.value())?,
            }),
            Editor::DateRange { lo, hi, .. } => Ok(FilterValue::DateRange {
                from: parse_date(lo.value())?,
                to: parse_date(hi.value())?,
            }),
        }
    }

    /// Re-seed the editor from the draft (after `clear`, or when an edit
    /// is abandoned with `Esc`).
    fn reload(&mut self, value: Option<&FilterValue>, dirty: bool) {
        self.dirty = dirty;
        match (&mut self.editor, value) {
            (Editor::Text(input), Some(FilterValue::Text(s))) => *input = Input::new(s.clone()),
            (Editor::Tags(input), Some(FilterValue::Multi(picked))) => {
                *input = Input::new(picked.join(", "));
            }
            (
                Editor::Choices {
                    options,
                    picked,
                    cursor,
                },
                Some(FilterValue::Multi(selected)),
            ) => {
                for (flag, option) in picked.iter_mut().zip(options.iter()) {
                    *flag = selected.contains(option);
                }
                *cursor = 0;
            }
            (Editor::NumberRange { lo, hi, hi_side }, Some(FilterValue::NumberRange { min, max })) => {
                *lo = Input::new(min.map(format_number).unwrap_or_default());
                *hi = Input::new(max.map(format_number).unwrap_or_default());
                *hi_side = false;
            }
            (Editor::DateRange { lo, hi, hi_side }, Some(FilterValue::DateRange { from, to })) => {
                *lo = Input::new(from.map(format_date).unwrap_or_default());
                *hi = Input::new(to.map(format_date).unwrap_or_default());
                *hi_side = false;
            }
            _ => {}
        }
    }

    /// One-line summary of the current editor content.
    fn summary(&self) -> String {
        match &self.editor {
            Editor::Text(input) | Editor::Tags(input) => input.value().to_owned(),
            Editor::Choices {
                options, picked, ..
            } => options
                .iter()
                .zip(picked)
                .filter(|(_, picked)| **picked)
                .map(|(option, _)| option.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Editor::NumberRange { lo, hi, .. } | Editor::DateRange { lo, hi, .. } => {
                if lo.value().is_empty() && hi.value().is_empty() {
                    String::new()
                } else {
                    format!("{} .. {}", lo.value(), hi.value())
                }
            }
        }
    }
}

/// What the engaged editor asked for after a key press.
enum Step {
    Stay,
    Commit,
    /// Commit but keep the editor engaged (choice toggles).
    CommitStay,
    Revert,
}

/// Modal filter editor over one view's schema.
pub struct FilterPanel {
    fields: Vec<PanelField>,
    cursor: usize,
    editing: bool,
    error: Option<String>,
}

impl FilterPanel {
    pub fn new(schema: &FilterSchema, host: &dyn FilterHost) -> Self {
        let draft = host.draft();
        let fields = schema
            .fields()
            .map(|spec| {
                PanelField::new(spec, draft.get(spec.name()), host.is_field_dirty(spec.name()))
            })
            .collect();

        Self {
            fields,
            cursor: 0,
            editing: false,
            error: None,
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent, host: &dyn FilterHost) -> Option<PanelOutcome> {
        self.error = None;

        if self.editing {
            self.handle_editor_key(key, host);
            return None;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                if !self.fields.is_empty() {
                    self.cursor = (self.cursor + 1) % self.fields.len();
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                if !self.fields.is_empty() {
                    self.cursor = (self.cursor + self.fields.len() - 1) % self.fields.len();
                }
                None
            }
            KeyCode::Char('e') | KeyCode::Char(' ') => {
                if !self.fields.is_empty() {
                    self.editing = true;
                }
                None
            }
            KeyCode::Enter => Some(PanelOutcome::Applied(host.apply())),
            KeyCode::Char('c') => {
                let generation = host.clear();
                self.reload_all(host);
                Some(PanelOutcome::Cleared(generation))
            }
            KeyCode::Esc | KeyCode::Char('f') => Some(PanelOutcome::Closed),
            _ => None,
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent, host: &dyn FilterHost) {
        let idx = self.cursor;
        let Some(field) = self.fields.get_mut(idx) else {
            self.editing = false;
            return;
        };

        let step = match &mut field.editor {
            Editor::Choices {
                options,
                picked,
                cursor,
            } => match key.code {
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Right => {
                    if !options.is_empty() {
                        *cursor = (*cursor + 1) % options.len();
                    }
                    Step::Stay
                }
                KeyCode::Up | KeyCode::Char('k') | KeyCode::Left => {
                    if !options.is_empty() {
                        *cursor = (*cursor + options.len() - 1) % options.len();
                    }
                    Step::Stay
                }
                KeyCode::Char(' ') => {
                    if let Some(flag) = picked.get_mut(*cursor) {
                        *flag = !*flag;
                    }
                    Step::CommitStay
                }
                KeyCode::Enter | KeyCode::Esc => Step::Commit,
                _ => Step::Stay,
            },

            Editor::Text(input) | Editor::Tags(input) => match key.code {
                KeyCode::Enter => Step::Commit,
                KeyCode::Esc => Step::Revert,
                _ => {
                    if let Some(request) = input_request(key) {
                        let _ = input.handle(request);
                    }
                    Step::Stay
                }
            },

            Editor::NumberRange { lo, hi, hi_side } | Editor::DateRange { lo, hi, hi_side } => {
                match key.code {
                    KeyCode::Tab | KeyCode::BackTab => {
                        *hi_side = !*hi_side;
                        Step::Stay
                    }
                    KeyCode::Enter => Step::Commit,
                    KeyCode::Esc => Step::Revert,
                    _ => {
                        if let Some(request) = input_request(key) {
                            let input = if *hi_side { hi } else { lo };
                            let _ = input.handle(request);
                        }
                        Step::Stay
                    }
                }
            }
        };

        match step {
            Step::Stay => {}
            Step::Commit => {
                // A parse error keeps the editor engaged so the bad text
                // can be fixed in place.
                if self.commit(idx, host) {
                    self.editing = false;
                }
            }
            Step::CommitStay => {
                self.commit(idx, host);
            }
            Step::Revert => {
                let draft = host.draft();
                if let Some(field) = self.fields.get_mut(idx) {
                    field.reload(draft.get(&field.name), host.is_field_dirty(&field.name));
                }
                self.editing = false;
            }
        }
    }

    /// Stage the field's parsed value on the host draft. Returns whether
    /// the commit succeeded.
    fn commit(&mut self, idx: usize, host: &dyn FilterHost) -> bool {
        let Some(field) = self.fields.get(idx) else {
            return false;
        };

        let value = match field.value() {
            Ok(value) => value,
            Err(message) => {
                self.error = Some(message);
                return false;
            }
        };

        if let Err(e) = host.edit(&field.name, value) {
            self.error = Some(e.to_string());
            return false;
        }

        if let Some(field) = self.fields.get_mut(idx) {
            field.dirty = host.is_field_dirty(&field.name);
        }
        true
    }

    fn reload_all(&mut self, host: &dyn FilterHost) {
        let draft = host.draft();
        for field in &mut self.fields {
            field.reload(draft.get(&field.name), host.is_field_dirty(&field.name));
        }
        self.editing = false;
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, draft_pending: bool) {
        let width = 66.min(area.width.saturating_sub(4)).max(24);
        let inner_width = width.saturating_sub(4);

        // Body + error + hints + borders.
        let mut height = self.body_height(inner_width) + 3;
        if self.error.is_some() {
            height += 1;
        }
        let height = height.min(area.height.saturating_sub(2)).max(5);

        let panel = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, panel);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let mut title_spans = vec![
            Span::raw(" "),
            Span::styled(format!("{title} Filters"), theme::title_style()),
        ];
        if draft_pending {
            title_spans.push(Span::styled(" (draft)", theme::dirty_marker()));
        }
        title_spans.push(Span::raw(" "));

        let block = Block::default()
            .title(Line::from(title_spans))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let body = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);
        let mut y = body.y;
        let bottom = body.y + body.height;

        for (i, field) in self.fields.iter().enumerate() {
            let field_height = self.field_height(i, body.width);
            if y + field_height > bottom.saturating_sub(1) {
                break;
            }
            self.render_field(frame, Rect::new(body.x, y, body.width, field_height), i);
            y += field_height;
        }

        if let Some(error) = &self.error {
            let line = Rect::new(body.x, bottom.saturating_sub(2), body.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(error.clone(), theme::error_text())),
                line,
            );
        }

        let hints = Rect::new(body.x, bottom.saturating_sub(1), body.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(self.key_hints(), theme::key_hint())),
            hints,
        );
    }

    fn body_height(&self, width: u16) -> u16 {
        (0..self.fields.len())
            .map(|i| self.field_height(i, width))
            .sum()
    }

    fn field_height(&self, idx: usize, width: u16) -> u16 {
        if self.editing && idx == self.cursor {
            if let Some(PanelField {
                editor:
                    Editor::Choices {
                        options,
                        picked,
                        cursor,
                    },
                ..
            }) = self.fields.get(idx)
            {
                let value_width = width.saturating_sub(LABEL_WIDTH);
                let lines = choice_lines(options, picked, Some(*cursor), value_width);
                return u16::try_from(lines.len().max(1)).unwrap_or(1);
            }
        }
        1
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, idx: usize) {
        let Some(field) = self.fields.get(idx) else {
            return;
        };
        let focused = idx == self.cursor;
        let engaged = focused && self.editing;

        let marker = if field.dirty { "* " } else { "  " };
        let label_style = if focused {
            theme::title_style()
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };

        let mut spans = vec![
            Span::styled(marker, theme::dirty_marker()),
            Span::styled(
                format!("{:<width$}", field.label, width = usize::from(LABEL_WIDTH) - 2),
                label_style,
            ),
        ];

        let value_style = if focused {
            Style::default().fg(theme::SAND)
        } else {
            theme::table_row()
        };

        match &field.editor {
            Editor::Text(input) | Editor::Tags(input) => {
                spans.extend(input_spans(input, engaged, value_style));
            }
            Editor::NumberRange { lo, hi, hi_side } | Editor::DateRange { lo, hi, hi_side } => {
                spans.extend(input_spans(lo, engaged && !hi_side, value_style));
                spans.push(Span::styled(" .. ", theme::key_hint()));
                spans.extend(input_spans(hi, engaged && *hi_side, value_style));
            }
            Editor::Choices {
                options, picked, cursor,
            } => {
                if engaged {
                    let value_width = area.width.saturating_sub(LABEL_WIDTH);
                    let lines = choice_lines(options, picked, Some(*cursor), value_width);
                    let grid = Rect::new(
                        area.x + LABEL_WIDTH,
                        area.y,
                        value_width,
                        u16::try_from(lines.len()).unwrap_or(1).min(area.height),
                    );
                    frame.render_widget(Paragraph::new(Line::from(spans)), area);
                    frame.render_widget(Paragraph::new(lines), grid);
                    return;
                }
                let summary = field.summary();
                if summary.is_empty() {
                    spans.push(Span::styled("(any)", theme::key_hint()));
                } else {
                    spans.push(Span::styled(summary, value_style));
                }
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn key_hints(&self) -> &'static str {
        if !self.editing {
            return "\u{2191}/\u{2193} field  e edit  Enter apply  c defaults  Esc close";
        }
        match self.fields.get(self.cursor).map(|f| &f.editor) {
            Some(Editor::Choices { .. }) => "\u{2191}/\u{2193} option  Space toggle  Enter done",
            Some(Editor::NumberRange { .. } | Editor::DateRange { .. }) => {
                "Tab from/to  Enter done  Esc cancel"
            }
            _ => "Enter done  Esc cancel",
        }
    }
}

const LABEL_WIDTH: u16 = 18;

// ── Input plumbing ───────────────────────────────────────────────────

/// Map a key press onto the input widget's request vocabulary.
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let request = match key.code {
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    };
    Some(request)
}

/// Render an input's value, reversing the character under the cursor
/// when the editor is engaged.
fn input_spans(input: &Input, engaged: bool, style: Style) -> Vec<Span<'static>> {
    let value = input.value();
    if !engaged {
        return vec![Span::styled(value.to_owned(), style)];
    }

    let cursor = input.visual_cursor();
    let before: String = value.chars().take(cursor).collect();
    let at: String = value.chars().skip(cursor).take(1).collect();
    let after: String = value.chars().skip(cursor + 1).collect();

    let cursor_char = if at.is_empty() { " ".to_owned() } else { at };
    vec![
        Span::styled(before, style),
        Span::styled(cursor_char, style.add_modifier(Modifier::REVERSED)),
        Span::styled(after, style),
    ]
}

/// Lay the option checkboxes out in as many lines as `width` requires.
fn choice_lines(
    options: &[String],
    picked: &[bool],
    cursor: Option<usize>,
    width: u16,
) -> Vec<Line<'static>> {
    let width = usize::from(width.max(8));
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for (i, option) in options.iter().enumerate() {
        let on = picked.get(i).copied().unwrap_or(false);
        let text = format!("[{}] {}  ", if on { "x" } else { " " }, option);

        if used + text.len() > width && !spans.is_empty() {
            lines.push(Line::from(std::mem::take(&mut spans)));
            used = 0;
        }

        let style = if cursor == Some(i) {
            theme::table_selected()
        } else if on {
            theme::success_text()
        } else {
            theme::table_row()
        };
        used += text.len();
        spans.push(Span::styled(text, style));
    }

    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("(no options)", theme::key_hint())));
    }
    lines
}

// ── Parsing ──────────────────────────────────────────────────────────

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_number(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("'{raw}' is not a number"))
}

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tags_split_on_commas_and_drop_blanks() {
        assert_eq!(split_tags("NEW, ASSIGNED , ,"), vec!["NEW", "ASSIGNED"]);
        assert!(split_tags("  ").is_empty());
    }

    #[test]
    fn numbers_parse_or_explain() {
        assert_eq!(parse_number(" 2.5 ").unwrap(), Some(2.5));
        assert_eq!(parse_number("").unwrap(), None);
        assert!(parse_number("two").unwrap_err().contains("not a number"));
    }

    #[test]
    fn dates_parse_or_explain() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_date("").unwrap(), None);
        assert!(parse_date("2024-13-01").unwrap_err().contains("YYYY-MM-DD"));
    }

    #[test]
    fn range_editors_format_whole_numbers_without_decimals() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
    }
}
