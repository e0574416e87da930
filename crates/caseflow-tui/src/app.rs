//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use caseflow_core::Session;

use crate::action::{Action, Notification, NotifyLevel};
use crate::component::Component;
use crate::data_bridge::{ViewChannels, run_data_bridge};
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::browse::BrowseScreen;
use crate::screens::{grievances, households, individuals, payments};
use crate::theme;
use crate::tui::Tui;

/// Connection status shown in the status bar.
#[derive(Debug, Clone, Default)]
enum Connection {
    #[default]
    Connecting,
    Connected {
        version: String,
        environment: Option<String>,
    },
    Failed(String),
}

/// Top-level application state and event loop.
pub struct App {
    session: Session,
    /// Profile name the session was built from, for the status bar.
    profile: String,
    active: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// State receivers for the data bridge; taken when the bridge spawns.
    channels: Option<ViewChannels>,
    running: bool,
    connection: Connection,
    help_visible: bool,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    bridge_cancel: CancellationToken,
}

impl App {
    /// Create the app with all four registry screens. Program-scoped
    /// registries come up without a view when the profile has no program;
    /// those screens render a hint instead of a table.
    pub fn new(session: Session, profile: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        // Open every view up front and subscribe before the screens take
        // ownership: the bridge needs the receivers, the screens the handles.
        let grievances_view = session.grievances(None);
        let households_view = session.households(None).ok();
        let individuals_view = session.individuals(None).ok();
        let payment_plans_view = session.payment_plans(None).ok();

        let channels = ViewChannels {
            grievances: grievances_view.subscribe(),
            households: households_view.as_ref().map(|view| view.subscribe()),
            individuals: individuals_view.as_ref().map(|view| view.subscribe()),
            payment_plans: payment_plans_view.as_ref().map(|view| view.subscribe()),
        };

        let mut screens: HashMap<ScreenId, Box<dyn Component>> = HashMap::new();
        screens.insert(
            ScreenId::Grievances,
            Box::new(BrowseScreen::new(
                ScreenId::Grievances,
                grievances::spec(),
                session.clone(),
                Some(grievances_view),
            )),
        );
        screens.insert(
            ScreenId::Households,
            Box::new(BrowseScreen::new(
                ScreenId::Households,
                households::spec(),
                session.clone(),
                households_view,
            )),
        );
        screens.insert(
            ScreenId::Individuals,
            Box::new(BrowseScreen::new(
                ScreenId::Individuals,
                individuals::spec(),
                session.clone(),
                individuals_view,
            )),
        );
        screens.insert(
            ScreenId::PaymentPlans,
            Box::new(BrowseScreen::new(
                ScreenId::PaymentPlans,
                payments::spec(),
                session.clone(),
                payment_plans_view,
            )),
        );

        Self {
            session,
            profile,
            active: ScreenId::Grievances,
            screens,
            channels: Some(channels),
            running: true,
            connection: Connection::default(),
            help_visible: false,
            notification: None,
            action_tx,
            action_rx,
            bridge_cancel: CancellationToken::new(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
            debug!(screen = screen.id(), "screen ready");
        }
        Ok(())
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        if let Some(channels) = self.channels.take() {
            let session = self.session.clone();
            let tx = self.action_tx.clone();
            let cancel = self.bridge_cancel.clone();
            tokio::spawn(async move {
                run_data_bridge(session, channels, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("event loop started");

        while self.running {
            // 1. Wait for the next event
            let Some(event) = events.next().await else {
                break;
            };

            // 2. Map event to action(s)
            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(action) = self.handle_mouse_event(mouse)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // 3. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        // Stop the bridge, then the engines; the terminal restores on drop.
        self.bridge_cancel.cancel();
        self.session.close();
        info!("event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C quits from anywhere, modal or not.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // A screen with a modal surface open gets every key.
        if let Some(screen) = self.screens.get_mut(&self.active) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        if self.help_visible {
            // In help mode, Esc or ? closes help
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // Esc clears a visible toast before anything deeper.
        if self.notification.is_some() && key.code == KeyCode::Esc {
            return Ok(Some(Action::DismissNotification));
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            // Screen navigation via number keys
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let screen = c
                    .to_digit(10)
                    .and_then(|n| usize::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                if let Some(screen) = screen {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            // Tab / Shift+Tab for screen cycling
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active.prev())));
            }

            // Esc dismisses whatever the active screen has open
            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),

            _ => {}
        }

        // Delegate to active screen component
        if let Some(screen) = self.screens.get_mut(&self.active) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if let Some(screen) = self.screens.get_mut(&self.active) {
            return screen.handle_mouse_event(mouse);
        }
        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            // Content is re-measured from the frame on the next draw.
            Action::Resize(..) | Action::Render => {}

            Action::SwitchScreen(target) => {
                if *target != self.active {
                    debug!("switching screen: {} -> {}", self.active, target);
                    self.active = *target;
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Connected { version, environment } => {
                self.connection = Connection::Connected {
                    version: version.clone(),
                    environment: environment.clone(),
                };
            }

            Action::ConnectionFailed(message) => {
                self.connection = Connection::Failed(message.clone());
            }

            Action::Tick => {
                // Auto-dismiss notifications after 3 seconds
                if let Some((_, shown)) = &self.notification {
                    if shown.elapsed() > Duration::from_secs(3) {
                        self.notification = None;
                    }
                }
                // Throbber animation on the visible screen
                if let Some(screen) = self.screens.get_mut(&self.active) {
                    let _ = screen.update(action);
                }
            }

            // State snapshots go to every screen so background registries
            // stay current while another tab is active.
            Action::GrievancesState(_)
            | Action::HouseholdsState(_)
            | Action::IndividualsState(_)
            | Action::PaymentPlansState(_) => {
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DismissNotification => {
                self.notification = None;
            }

            // Everything else goes to the active screen only
            other => {
                if let Some(screen) = self.screens.get_mut(&self.active) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active) {
            screen.render(frame, layout[0]);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays on top (order matters: last = topmost)
        if let Some((notification, _)) = &self.notification {
            self.render_notification(frame, area, notification);
        }

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = match &self.connection {
            Connection::Connecting => {
                Span::styled("\u{25d0} connecting", Style::default().fg(theme::SAND))
            }
            Connection::Connected { version, environment } => {
                let label = match environment {
                    Some(env) => format!("\u{25cf} {version} ({env})"),
                    None => format!("\u{25cf} {version}"),
                };
                Span::styled(label, theme::success_text())
            }
            Connection::Failed(message) => {
                Span::styled(format!("\u{25cb} {message}"), theme::error_text())
            }
        };

        let program = self.session.program().unwrap_or("all programs");
        let scope = Span::styled(
            format!(
                " \u{2502} {} / {program} \u{2502} {}",
                self.session.business_area(),
                self.profile,
            ),
            theme::status_bar(),
        );

        let hints = Span::styled(" \u{2502} ? help  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), connection, scope, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    #[allow(clippy::unused_self)]
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 62u16.min(area.width.saturating_sub(4));
        let help_height = 24u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::HARBOR_BLUE),
            ))
        };
        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            section("Navigation"),
            entry("1-4", "Jump to registry"),
            entry("Tab", "Next registry"),
            entry("j/k \u{2191}/\u{2193}", "Move selection"),
            entry("g/G", "First / last row"),
            entry("Ctrl+d/u", "Selection down / up by 10"),
            entry("Enter", "Toggle detail pane"),
            entry("Esc", "Close detail / overlay"),
            Line::from(""),
            section("Registry"),
            entry("f", "Open filter panel"),
            entry("C", "Clear filters to defaults"),
            entry("n/p", "Next / previous page"),
            entry("s", "Cycle sort order"),
            entry("r", "Refetch current page"),
            entry("y", "Show shareable web link"),
            Line::from(""),
            section("Filter panel"),
            entry("e/Space", "Edit field \u{b7} toggle choice"),
            entry("Enter", "Apply draft (panel) / commit (field)"),
            entry("c", "Reset draft to defaults"),
            Line::from(""),
            Line::from(Span::styled(
                "                        Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a notification toast in the bottom-right corner.
    #[allow(clippy::unused_self)]
    fn render_notification(&self, frame: &mut Frame, area: Rect, notification: &Notification) {
        let msg_len = u16::try_from(notification.message.len()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let color = match notification.level {
            NotifyLevel::Success => theme::SAGE,
            NotifyLevel::Error => theme::BRICK,
            NotifyLevel::Warning => theme::SAND,
            NotifyLevel::Info => theme::HARBOR_BLUE,
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", notification.level.icon()),
                Style::default().fg(color),
            ),
            Span::styled(&notification.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
