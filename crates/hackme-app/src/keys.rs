//! Raw terminal key events to console keys.

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hackme_types::input::Key;
use tokio::sync::mpsc;

/// What the front end should do with one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Key(Key),
    Quit,
}

/// Ctrl-C and Ctrl-D quit; editing keys map to [`Key`]; everything else is dropped.
pub fn map_key(event: KeyEvent) -> Option<Action> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(Action::Quit),
            _ => None,
        };
    }
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        _ => return None,
    };
    Some(Action::Key(key))
}

/// Read terminal events on a dedicated thread.
///
/// The thread polls every 100ms and exits once the receiver is dropped.
pub fn spawn_reader() -> mpsc::UnboundedReceiver<Action> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {},
                Err(e) => {
                    log::error!("keyboard poll failed: {e}");
                    let _ = tx.send(Action::Quit);
                    break;
                },
            }
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(action) = map_key(key) {
                        if tx.send(action).is_err() {
                            break;
                        }
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    log::error!("keyboard read failed: {e}");
                    let _ = tx.send(Action::Quit);
                    break;
                },
            }
        }
        log::debug!("key reader stopped");
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn editing_keys_map_through() {
        assert_eq!(map_key(press(KeyCode::Char('n'))), Some(Action::Key(Key::Char('n'))));
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Action::Key(Key::Enter)));
        assert_eq!(map_key(press(KeyCode::Backspace)), Some(Action::Key(Key::Backspace)));
        assert_eq!(map_key(press(KeyCode::Up)), Some(Action::Key(Key::Up)));
        assert_eq!(map_key(press(KeyCode::Down)), Some(Action::Key(Key::Down)));
        assert_eq!(map_key(press(KeyCode::Tab)), Some(Action::Key(Key::Tab)));
    }

    #[test]
    fn shifted_chars_are_plain_chars() {
        let ev = KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT);
        assert_eq!(map_key(ev), Some(Action::Key(Key::Char('N'))));
    }

    #[test]
    fn ctrl_c_and_ctrl_d_quit() {
        for c in ['c', 'd'] {
            let ev = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
            assert_eq!(map_key(ev), Some(Action::Quit));
        }
        let ev = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ev), None);
    }

    #[test]
    fn releases_and_unbound_keys_are_dropped() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key(release), None);
        assert_eq!(map_key(press(KeyCode::F(1))), None);
        assert_eq!(map_key(press(KeyCode::Left)), None);
    }
}
