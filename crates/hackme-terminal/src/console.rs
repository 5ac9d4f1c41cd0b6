//! Key handling for the interactive terminal.
//!
//! The console owns the line editor and hands submitted lines to the
//! dispatcher on the session scheduler. While a command is running every key
//! is swallowed.

use std::sync::Arc;

use hackme_runtime::{OutputSequencer, Scheduler};
use hackme_types::collab::StyleHint;
use hackme_types::input::Key;
use tokio::task::JoinHandle;

use crate::editor::LineEditor;
use crate::interpreter::Dispatcher;

pub struct Console {
    editor: LineEditor,
    dispatcher: Arc<Dispatcher>,
    out: OutputSequencer,
    scheduler: Scheduler,
    running: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("buffer", &self.editor.buffer())
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl Console {
    /// Console with an empty line editor, submitting to `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>, out: OutputSequencer, scheduler: Scheduler) -> Self {
        Self {
            editor: LineEditor::new(),
            dispatcher,
            out,
            scheduler,
            running: None,
        }
    }

    /// The line editor, for inspecting the pending input and history.
    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    /// A submitted line has not finished yet.
    pub fn is_busy(&self) -> bool {
        self.dispatcher.is_busy() || self.running.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Prompt followed by the pending input, for redrawing the input row.
    /// Returns immediately even while a command is running.
    pub fn input_line(&self) -> String {
        format!("{}{}", self.dispatcher.prompt(), self.editor.buffer())
    }

    /// Wait for the running command, if any. Safe to cancel and retry.
    pub async fn idle(&mut self) {
        if let Some(handle) = self.running.as_mut() {
            if let Err(e) = handle.await {
                log::error!("command task failed: {e}");
            }
            self.running = None;
        }
    }

    /// Apply one key. Enter submits the pending line as a new command.
    pub async fn handle_key(&mut self, key: Key) {
        if self.is_busy() {
            log::trace!("busy, dropping {key:?}");
            return;
        }
        match key {
            Key::Char(c) => {
                if key.is_printable() {
                    self.editor.insert(c);
                }
            },
            Key::Backspace => self.editor.backspace(),
            Key::Up => self.editor.history_up(),
            Key::Down => self.editor.history_down(),
            Key::Tab => {
                if let Some(listing) = self.editor.tab_complete(self.dispatcher.registry()) {
                    let _ = self.out.line("");
                    self.out.line(listing).await;
                }
            },
            Key::Enter => self.submit().await,
        }
    }

    async fn submit(&mut self) {
        let prompt = self.dispatcher.prompt();
        let line = self.editor.submit();
        let _ = self
            .out
            .enqueue(format!("{prompt}{line}"), StyleHint::Prompt);
        if line.is_empty() {
            return;
        }
        let dispatcher = Arc::clone(&self.dispatcher);
        self.running = self.scheduler.spawn("command", async move {
            dispatcher.dispatch(&line).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hackme_types::testing::SurfaceEvent;

    use super::*;
    use crate::test_support::Harness;

    fn console(h: &Harness) -> Console {
        Console::new(Arc::clone(&h.dispatcher), h.out.clone(), h.scheduler.clone())
    }

    async fn type_line(c: &mut Console, text: &str) {
        for ch in text.chars() {
            c.handle_key(Key::Char(ch)).await;
        }
        c.handle_key(Key::Enter).await;
    }

    #[tokio::test(start_paused = true)]
    async fn enter_echoes_prompt_then_runs() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "pwd").await;
        c.idle().await;
        assert_eq!(
            h.surface.events(),
            vec![
                SurfaceEvent::Line("blackhat@kali:/home/blackhat$ pwd".into(), StyleHint::Prompt),
                SurfaceEvent::Line("/home/blackhat".into(), StyleHint::Normal),
            ]
        );
        assert_eq!(c.editor().history().front().unwrap(), "pwd");
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_follows_cwd() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "cd tools").await;
        c.idle().await;
        assert_eq!(c.input_line(), "blackhat@kali:/home/blackhat/tools$ ");
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_swallowed_while_busy() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "nmap 10.0.0.1").await;
        assert!(c.is_busy());
        c.handle_key(Key::Char('x')).await;
        c.handle_key(Key::Enter).await;
        assert_eq!(c.editor().buffer(), "");
        c.idle().await;
        assert!(!c.is_busy());
        c.handle_key(Key::Char('x')).await;
        assert_eq!(c.editor().buffer(), "x");
        let prompts = h
            .surface
            .events()
            .into_iter()
            .filter(|e| matches!(e, SurfaceEvent::Line(_, StyleHint::Prompt)))
            .count();
        assert_eq!(prompts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_enter_echoes_prompt_only() {
        let h = Harness::new();
        let mut c = console(&h);
        c.handle_key(Key::Enter).await;
        c.idle().await;
        assert_eq!(h.surface.lines(), vec!["blackhat@kali:/home/blackhat$ "]);
        assert!(c.editor().history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_command_leaves_history_entry_only() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "hackthegibson").await;
        c.idle().await;
        assert_eq!(
            h.surface.lines().last().unwrap(),
            "hackthegibson: command not found"
        );
        assert_eq!(h.dispatcher.cwd().await, "/home/blackhat");
    }

    async fn assert_sequential_order(h: &Harness) {
        let mut c = console(h);
        for line in ["whoami", "nmap 10.0.0.1", "pwd"] {
            type_line(&mut c, line).await;
            c.idle().await;
        }
        let lines = h.surface.lines();
        let pos = |needle: &str| lines.iter().position(|l| l == needle).unwrap();
        assert!(pos("blackhat") < pos("Starting Nmap scan on 10.0.0.1"));
        assert!(pos("Nmap done: 1 IP address (1 host up) scanned") < pos("/home/blackhat"));
        let prompts: Vec<_> = lines.iter().filter(|l| l.starts_with("blackhat@kali:")).collect();
        assert_eq!(prompts.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_commands_render_in_order() {
        assert_sequential_order(&Harness::new()).await;
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_commands_render_in_order_with_typewriter_jitter() {
        let h = Harness::typewriter();
        assert_sequential_order(&h).await;
        assert!(h.surface.reveal_count() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn input_row_redraws_while_busy() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "demo-autoplay").await;
        assert!(c.is_busy());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.dispatcher.is_busy());
        c.handle_key(Key::Char('x')).await;
        assert_eq!(c.input_line(), "blackhat@kali:/home/blackhat$ ");
        h.scheduler.cancel();
        c.idle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn tab_lists_or_completes() {
        let h = Harness::new();
        let mut c = console(&h);
        c.handle_key(Key::Char('c')).await;
        c.handle_key(Key::Tab).await;
        assert_eq!(h.surface.lines(), vec!["", "cat  cd  clear  clearlogs  cryptominer  curl"]);
        c.handle_key(Key::Char('u')).await;
        c.handle_key(Key::Tab).await;
        assert_eq!(c.editor().buffer(), "curl");
    }

    #[tokio::test(start_paused = true)]
    async fn history_keys_recall_lines() {
        let h = Harness::new();
        let mut c = console(&h);
        type_line(&mut c, "whoami").await;
        c.idle().await;
        c.handle_key(Key::Up).await;
        assert_eq!(c.editor().buffer(), "whoami");
        c.handle_key(Key::Down).await;
        assert_eq!(c.editor().buffer(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn control_chars_are_ignored() {
        let h = Harness::new();
        let mut c = console(&h);
        c.handle_key(Key::Char('\u{7}')).await;
        assert_eq!(c.editor().buffer(), "");
    }
}
