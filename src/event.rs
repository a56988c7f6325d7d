use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
}

/// Blocking terminal reader. Every event is handled to completion before the
/// next one is read, so the session is only ever touched from this loop.
pub struct EventSource;

impl EventSource {
    pub fn next(&self) -> anyhow::Result<AppEvent> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(AppEvent::Key(key)),
                Event::Resize(_, _) => return Ok(AppEvent::Resize),
                _ => {}
            }
        }
    }
}
