//! Actions — the single mutation channel of the TUI.
//!
//! Key presses, data-bridge snapshots, and follow-up work requested by
//! screens all flow through this enum. The app loop is the only consumer.

use caseflow_core::{GrievanceTicket, Household, Individual, ListState, PaymentPlan};

use crate::screen::ScreenId;

/// Toast severity. Picks the icon and accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotifyLevel {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Info => "\u{b7}",
            Self::Success => "\u{2713}",
            Self::Warning => "!",
            Self::Error => "\u{2717}",
        }
    }
}

/// A transient message shown as a toast in the bottom-right corner.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotifyLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotifyLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotifyLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotifyLevel::Error,
        }
    }
}

/// Everything that can happen to the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ────────────────────────────────────────────────────
    /// Exit the application.
    Quit,
    /// Periodic tick (animation, toast timeouts).
    Tick,
    /// Redraw the terminal.
    Render,
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),

    // ── Navigation ───────────────────────────────────────────────────
    /// Switch to the given screen tab.
    SwitchScreen(ScreenId),
    /// Close the innermost open surface (detail pane, help overlay).
    GoBack,
    /// Toggle the help overlay.
    ToggleHelp,

    // ── Connection ───────────────────────────────────────────────────
    /// Server-info round trip succeeded.
    Connected {
        version: String,
        environment: Option<String>,
    },
    /// Server-info round trip failed; the message is shown in the status
    /// bar until a retry succeeds.
    ConnectionFailed(String),

    // ── Registry snapshots (pushed by the data bridge) ───────────────
    GrievancesState(ListState<GrievanceTicket>),
    HouseholdsState(ListState<Household>),
    IndividualsState(ListState<Individual>),
    PaymentPlansState(ListState<PaymentPlan>),

    // ── Notifications ────────────────────────────────────────────────
    /// Show a toast.
    Notify(Notification),
    /// Remove the current toast.
    DismissNotification,
}
