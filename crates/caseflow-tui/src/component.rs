//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// A screen in the tab bar.
///
/// Input arrives through `handle_*`; state changes arrive through
/// `update`. Both may answer with a follow-up [`Action`], which the app
/// loop feeds back through the same queue.
pub trait Component {
    /// Called once with the action sender before the first render.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a key press. Only called on the active screen.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Handle a mouse event. Only called on the active screen.
    fn handle_mouse_event(&mut self, _mouse: MouseEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to an action. Data snapshots reach every screen; the rest
    /// only reach the active one.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Draw into `area`.
    fn render(&self, frame: &mut Frame, area: Rect);

    /// `true` while a modal surface (e.g. the filter panel) should
    /// receive keys before the global bindings. Ctrl+C still quits.
    fn captures_input(&self) -> bool {
        false
    }

    /// Stable identifier for logging.
    fn id(&self) -> &str;
}
