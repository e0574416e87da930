//! Terminal event pump.
//!
//! A background task reads crossterm events and interleaves them with
//! tick and render pulses, so the app loop consumes exactly one channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Events delivered to the app loop.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal resized to (cols, rows).
    Resize(u16, u16),
    /// Data/animation pulse.
    Tick,
    /// Frame pulse.
    Render,
}

/// Owns the reader task; dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// Spawn the reader. `tick_rate` drives [`Event::Tick`],
    /// `render_rate` drives [`Event::Render`].
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let reader_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut stream = EventStream::new();
            let mut ticks = tokio::time::interval(tick_rate);
            let mut frames = tokio::time::interval(render_rate);

            // Catching up on missed intervals would burst events; skip them.
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = reader_cancel.cancelled() => break,
                    _ = ticks.tick() => Event::Tick,
                    _ = frames.tick() => Event::Render,
                    Some(Ok(term_event)) = stream.next() => {
                        match term_event {
                            // Only key presses; repeats and releases would
                            // double every binding on some terminals.
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Event::Key(key)
                            }
                            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                            CrosstermEvent::Resize(cols, rows) => Event::Resize(cols, rows),
                            _ => continue,
                        }
                    }
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// Next event, or `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
