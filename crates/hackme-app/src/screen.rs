//! Line-oriented rendering onto a raw-mode terminal.
//!
//! Both surfaces write into one scrolling screen. The bottom row always holds
//! the prompt and pending input; every append clears that row, writes the
//! line, and redraws it underneath.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::cursor::{MoveTo, MoveToColumn};
use crossterm::style::{Print, PrintStyledContent, StyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use hackme_types::collab::{StyleHint, SurfaceRenderer};

const STORY_PREFIX: &str = "» ";

struct State<W> {
    out: W,
    input: String,
}

pub struct Screen<W> {
    state: Mutex<State<W>>,
}

fn styled(text: &str, style: StyleHint) -> StyledContent<&str> {
    match style {
        StyleHint::Normal => text.stylize(),
        StyleHint::Prompt => text.green(),
        StyleHint::Success => text.green().bold(),
        StyleHint::Error => text.red(),
        StyleHint::Story => text.magenta().bold(),
        StyleHint::Hint => text.yellow(),
    }
}

impl<W: Write> Screen<W> {
    /// Wrap a writer with an empty input row.
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(State {
                out,
                input: String::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<W>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the input row.
    pub fn set_input(&self, line: String) -> io::Result<()> {
        let mut state = self.lock();
        state.input = line;
        let State { out, input } = &mut *state;
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(&*input))?;
        out.flush()
    }

    /// Print a finished line above the input row.
    pub fn write_line(&self, text: &str, style: StyleHint) -> io::Result<()> {
        let mut state = self.lock();
        let State { out, input } = &mut *state;
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            PrintStyledContent(styled(text, style)),
            Print("\r\n"),
            Print(&*input)
        )?;
        out.flush()
    }

    /// Show a line that is still being revealed, in place of the input row.
    pub fn write_partial(&self, text: &str, style: StyleHint) -> io::Result<()> {
        let mut state = self.lock();
        let out = &mut state.out;
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            PrintStyledContent(styled(text, style))
        )?;
        out.flush()
    }

    /// Wipe the screen and redraw the input row.
    pub fn clear(&self) -> io::Result<()> {
        let mut state = self.lock();
        let State { out, input } = &mut *state;
        queue!(out, Clear(ClearType::All), MoveTo(0, 0), Print(&*input))?;
        out.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Terminal,
    /// Narrative overlay. Lines are prefixed and never cleared.
    Story,
}

/// One output surface drawn onto a shared [`Screen`].
pub struct SurfaceView<W> {
    screen: Arc<Screen<W>>,
    kind: SurfaceKind,
}

impl<W> SurfaceView<W> {
    /// A view of `screen` rendering as `kind`.
    pub fn new(screen: Arc<Screen<W>>, kind: SurfaceKind) -> Self {
        Self { screen, kind }
    }

    fn decorate(&self, text: &str) -> String {
        match self.kind {
            SurfaceKind::Terminal => text.to_string(),
            SurfaceKind::Story => format!("{STORY_PREFIX}{text}"),
        }
    }
}

impl<W: Write + Send> SurfaceRenderer for SurfaceView<W> {
    fn append_line(&self, text: &str, style: StyleHint) {
        if let Err(e) = self.screen.write_line(&self.decorate(text), style) {
            log::warn!("failed to draw line: {e}");
        }
    }

    fn clear(&self) {
        if self.kind == SurfaceKind::Story {
            return;
        }
        if let Err(e) = self.screen.clear() {
            log::warn!("failed to clear screen: {e}");
        }
    }

    fn reveal(&self, partial: &str, style: StyleHint) {
        if let Err(e) = self.screen.write_partial(&self.decorate(partial), style) {
            log::warn!("failed to draw partial line: {e}");
        }
    }
}

#[cfg(test)]
impl Screen<Vec<u8>> {
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.lock().out).into_owned()
    }

    fn reset(&self) {
        self.lock().out.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Arc<Screen<Vec<u8>>> {
        Arc::new(Screen::new(Vec::new()))
    }

    #[test]
    fn appended_line_is_followed_by_input_row() {
        let screen = screen();
        screen.set_input("blackhat@kali:~$ ls".to_string()).unwrap();
        screen.reset();
        let view = SurfaceView::new(Arc::clone(&screen), SurfaceKind::Terminal);
        view.append_line("passwords.txt", StyleHint::Normal);
        let out = screen.output();
        let line = out.find("passwords.txt").unwrap();
        let newline = out.find("\r\n").unwrap();
        let input = out.rfind("blackhat@kali:~$ ls").unwrap();
        assert!(line < newline && newline < input);
    }

    #[test]
    fn story_lines_are_prefixed() {
        let screen = screen();
        let view = SurfaceView::new(Arc::clone(&screen), SurfaceKind::Story);
        view.append_line("Trojan activated", StyleHint::Story);
        assert!(screen.output().contains("» Trojan activated"));
    }

    #[test]
    fn story_surface_never_clears() {
        let screen = screen();
        SurfaceView::new(Arc::clone(&screen), SurfaceKind::Story).clear();
        assert!(screen.output().is_empty());
        SurfaceView::new(Arc::clone(&screen), SurfaceKind::Terminal).clear();
        assert!(!screen.output().is_empty());
    }

    #[test]
    fn partial_reveal_has_no_line_break() {
        let screen = screen();
        let view = SurfaceView::new(Arc::clone(&screen), SurfaceKind::Terminal);
        view.reveal("Starting Nm", StyleHint::Normal);
        let out = screen.output();
        assert!(out.contains("Starting Nm"));
        assert!(!out.contains("\r\n"));
    }
}
