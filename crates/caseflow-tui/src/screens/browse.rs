//! Generic registry browser: paged table, detail pane, filter panel.
//!
//! One instance per registry. The screen owns the view handle and issues
//! commands (edit, apply, page, refresh); result rows only ever arrive
//! through the data bridge as state snapshots, so what is on screen is
//! always a published state, never a half-applied one.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};
use tracing::debug;

use caseflow_core::{ListState, ListView, Phase, Session};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::screen::ScreenId;
use crate::screens::filter_panel::{FilterPanel, PanelOutcome};
use crate::theme;

/// One table column: header, width, and how to print a row's cell.
pub struct Column<T> {
    pub header: &'static str,
    pub width: Constraint,
    pub cell: fn(&T) -> String,
}

/// Everything registry-specific about a browse screen.
pub struct TableSpec<T> {
    /// Web-app path segment for share links.
    pub view_path: &'static str,
    pub columns: Vec<Column<T>>,
    /// Sort cycle for the `s` key: (label, server ordering parameter).
    pub orderings: Vec<(&'static str, Option<&'static str>)>,
    /// Pulls this registry's snapshot out of a data-bridge action.
    pub state_from: fn(&Action) -> Option<&ListState<T>>,
    /// Label/value pairs for the detail pane.
    pub detail: fn(&T) -> Vec<(&'static str, String)>,
}

pub struct BrowseScreen<T> {
    id: ScreenId,
    spec: TableSpec<T>,
    session: Session,
    /// Absent when the registry is program-scoped and the session has no
    /// program; the screen then renders a hint instead of a table.
    view: Option<ListView<T>>,
    state: ListState<T>,
    table: TableState,
    detail_open: bool,
    panel: Option<FilterPanel>,
    ordering_idx: usize,
    throbber: throbber_widgets_tui::ThrobberState,
}

impl<T: Send + Sync + 'static> BrowseScreen<T> {
    pub fn new(
        id: ScreenId,
        spec: TableSpec<T>,
        session: Session,
        view: Option<ListView<T>>,
    ) -> Self {
        let state = view.as_ref().map_or_else(
            || ListState {
                phase: Phase::Idle,
                rows: Vec::new(),
                total: 0,
                page: 1,
                generation: 0,
            },
            ListView::state,
        );

        Self {
            id,
            spec,
            session,
            view,
            state,
            table: TableState::default(),
            detail_open: false,
            panel: None,
            ordering_idx: 0,
            throbber: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    // ── State ────────────────────────────────────────────────────────

    fn on_state(&mut self, state: ListState<T>) {
        self.state = state;
        let len = self.state.rows.len();
        if len == 0 {
            self.table.select(None);
            self.detail_open = false;
        } else {
            let selected = self.table.selected().unwrap_or(0).min(len - 1);
            self.table.select(Some(selected));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.state.rows.len();
        if len == 0 {
            self.table.select(None);
            return;
        }
        let current = self.table.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table.select(Some(next));
    }

    fn selected_row(&self) -> Option<&T> {
        self.table
            .selected()
            .and_then(|i| self.state.rows.get(i))
            .map(std::convert::AsRef::as_ref)
    }

    fn cycle_ordering(&mut self) {
        if self.spec.orderings.is_empty() {
            return;
        }
        self.ordering_idx = (self.ordering_idx + 1) % self.spec.orderings.len();
        let param = self
            .spec
            .orderings
            .get(self.ordering_idx)
            .and_then(|(_, param)| *param);
        if let Some(view) = self.view.as_ref() {
            view.set_ordering(param.map(str::to_owned));
        }
    }

    fn ordering_label(&self) -> &'static str {
        self.spec
            .orderings
            .get(self.ordering_idx)
            .map_or("default", |(label, _)| label)
    }

    fn share_link(&self, view: &ListView<T>) -> String {
        let applied = view.applied();
        self.session
            .view_link(self.spec.view_path, view.schema(), applied.state(), &view.page())
            .to_string()
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        if let Some(error) = self.state.phase.error() {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("\u{2717} ", theme::error_text()),
                    Span::styled(error.to_owned(), theme::error_text()),
                    Span::styled("  (showing last good rows)", theme::key_hint()),
                ])),
                area,
            );
            return;
        }

        let Some(view) = self.view.as_ref() else {
            return;
        };

        let page = view.page();
        let pages = page.page_count(self.state.total);
        let mut spans = vec![Span::styled(
            format!(
                "{} matches \u{b7} page {}/{} \u{b7} sort {}",
                self.state.total, self.state.page, pages,
                self.ordering_label(),
            ),
            theme::status_bar(),
        )];

        let query = view.applied_query();
        if !query.is_empty() {
            spans.push(Span::styled(
                format!(" \u{b7} {query}"),
                Style::default().fg(theme::HARBOR_BLUE),
            ));
        }
        if view.is_dirty() {
            spans.push(Span::styled(" \u{b7} draft pending", theme::dirty_marker()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        if self.state.phase.is_loading() {
            let width = 14.min(area.width);
            let spinner_area = Rect::new(
                area.x + area.width.saturating_sub(width),
                area.y,
                width,
                1,
            );
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("loading")
                .style(theme::status_bar())
                .throbber_style(theme::border_focused());
            frame.render_stateful_widget(throbber, spinner_area, &mut self.throbber.clone());
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let border = if self.panel.is_some() {
            theme::border_default()
        } else {
            theme::border_focused()
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(self.id.label(), theme::title_style()),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.state.rows.is_empty() {
            let message = match self.state.phase {
                Phase::Idle | Phase::Loading => "loading\u{2026}",
                _ => "no rows match the applied filters",
            };
            let centered = Rect::new(
                inner.x,
                inner.y + inner.height / 2,
                inner.width,
                1.min(inner.height),
            );
            frame.render_widget(
                Paragraph::new(Span::styled(message, theme::key_hint()))
                    .alignment(Alignment::Center),
                centered,
            );
            return;
        }

        let header = Row::new(
            self.spec
                .columns
                .iter()
                .map(|column| column.header)
                .collect::<Vec<_>>(),
        )
        .style(theme::table_header());

        let rows = self.state.rows.iter().map(|row| {
            Row::new(
                self.spec
                    .columns
                    .iter()
                    .map(|column| (column.cell)(row.as_ref()))
                    .collect::<Vec<_>>(),
            )
            .style(theme::table_row())
        });

        let widths: Vec<Constraint> = self.spec.columns.iter().map(|c| c.width).collect();
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        frame.render_stateful_widget(table, inner, &mut self.table.clone());
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("Detail", theme::title_style()),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(row) = self.selected_row() else {
            return;
        };

        let lines: Vec<Line> = (self.spec.detail)(row)
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:>18}  "), theme::key_hint()),
                    Span::styled(value, theme::table_row()),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let pairs: &[(&str, &str)] = &[
            ("j/k", "select"),
            ("Enter", "detail"),
            ("f", "filters"),
            ("n/p", "page"),
            ("s", "sort"),
            ("r", "refresh"),
            ("y", "link"),
            ("C", "clear"),
        ];

        let mut spans = Vec::with_capacity(pairs.len() * 3);
        for (key, hint) in pairs {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {hint}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_program_hint(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(self.id.label(), theme::title_style()),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::styled(
                "This registry is program-scoped.",
                theme::status_bar(),
            )),
            Line::from(Span::raw("")),
            Line::from(Span::styled(
                "Set `program` on the active profile (caseflow config init)",
                theme::key_hint(),
            )),
            Line::from(Span::styled(
                "and restart to browse it.",
                theme::key_hint(),
            )),
        ];
        let centered = Rect::new(
            inner.x,
            inner.y + inner.height.saturating_sub(4) / 2,
            inner.width,
            4.min(inner.height),
        );
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            centered,
        );
    }
}

impl<T: Send + Sync + 'static> Component for BrowseScreen<T> {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // The filter panel is modal while open.
        if let Some(panel) = self.panel.as_mut() {
            let Some(view) = self.view.as_ref() else {
                self.panel = None;
                return Ok(None);
            };
            match panel.handle_key(key, view) {
                Some(PanelOutcome::Closed) => {
                    self.panel = None;
                }
                Some(PanelOutcome::Applied(generation)) => {
                    debug!(screen = %self.id, generation, "draft applied");
                    self.panel = None;
                    self.table.select(Some(0));
                    return Ok(Some(Action::Notify(Notification::success(
                        "Filters applied",
                    ))));
                }
                Some(PanelOutcome::Cleared(generation)) => {
                    debug!(screen = %self.id, generation, "filters reset");
                    return Ok(Some(Action::Notify(Notification::info(
                        "Filters reset to defaults",
                    ))));
                }
                None => {}
            }
            return Ok(None);
        }

        if self.view.is_none() {
            return Ok(None);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => {
                if !self.state.rows.is_empty() {
                    self.table.select(Some(0));
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                let len = self.state.rows.len();
                if len > 0 {
                    self.table.select(Some(len - 1));
                }
            }
            KeyCode::Char('d') if ctrl => self.move_selection(10),
            KeyCode::Char('u') if ctrl => self.move_selection(-10),

            KeyCode::Enter => {
                if self.selected_row().is_some() {
                    self.detail_open = !self.detail_open;
                }
            }

            KeyCode::Char('f') => {
                if let Some(view) = self.view.as_ref() {
                    self.panel = Some(FilterPanel::new(view.schema(), view));
                }
            }
            KeyCode::Char('C') => {
                if let Some(view) = self.view.as_ref() {
                    view.clear();
                }
                self.table.select(Some(0));
                return Ok(Some(Action::Notify(Notification::info("Filters cleared"))));
            }

            KeyCode::Char('n') | KeyCode::Right => {
                if let Some(view) = self.view.as_ref() {
                    let page = view.page();
                    if page.page < page.page_count(self.state.total) {
                        view.next_page();
                    } else {
                        return Ok(Some(Action::Notify(Notification::warning(
                            "Already on the last page",
                        ))));
                    }
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if let Some(view) = self.view.as_ref() {
                    view.prev_page();
                }
            }
            KeyCode::Char('s') => self.cycle_ordering(),
            KeyCode::Char('r') => {
                if let Some(view) = self.view.as_ref() {
                    view.refresh();
                }
            }

            KeyCode::Char('y') => {
                if let Some(view) = self.view.as_ref() {
                    let link = self.share_link(view);
                    return Ok(Some(Action::Notify(Notification::info(link))));
                }
            }

            _ => {}
        }

        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.panel.is_none() {
            match mouse.kind {
                MouseEventKind::ScrollDown => self.move_selection(1),
                MouseEventKind::ScrollUp => self.move_selection(-1),
                _ => {}
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                if self.state.phase.is_loading() {
                    self.throbber.calc_next();
                }
            }
            Action::GoBack => {
                if self.detail_open {
                    self.detail_open = false;
                }
            }
            _ => {
                if let Some(state) = (self.spec.state_from)(action) {
                    self.on_state(state.clone());
                }
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.view.is_none() {
            self.render_program_hint(frame, area);
            return;
        }

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_summary(frame, chunks[0]);

        if self.detail_open && self.selected_row().is_some() {
            let halves =
                Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[1]);
            self.render_table(frame, halves[0]);
            self.render_detail(frame, halves[1]);
        } else {
            self.render_table(frame, chunks[1]);
        }

        self.render_hints(frame, chunks[2]);

        if let Some(panel) = &self.panel {
            let dirty = self.view.as_ref().is_some_and(|view| view.is_dirty());
            panel.render(frame, area, self.id.label(), dirty);
        }
    }

    fn captures_input(&self) -> bool {
        self.panel.is_some()
    }

    fn id(&self) -> &str {
        self.id.label()
    }
}
