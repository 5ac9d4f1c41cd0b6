//! Command registry, per-session environment, and dispatch.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use hackme_runtime::{Completion, EventBus, OutputSequencer, Scheduler};
use hackme_types::collab::{GameStateSink, StyleHint, WindowVisibility};
use hackme_types::error::{HackError, Result};
use hackme_vfs::StaticVfs;
use tokio::sync::watch;

/// Async command body. Receives the arguments after the command name.
pub type Handler = for<'a> fn(Vec<String>, &'a mut Environment) -> BoxFuture<'a, Result<()>>;

/// A registered command.
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub category: &'static str,
    /// Only listed by `help --hidden`.
    pub hidden: bool,
    pub handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Everything a handler may touch.
pub struct Environment {
    /// Current working directory.
    pub cwd: String,
    pub home: String,
    pub username: String,
    pub hostname: String,
    pub vfs: Arc<StaticVfs>,
    pub registry: Arc<CommandRegistry>,
    /// The terminal surface.
    pub out: OutputSequencer,
    pub bus: EventBus,
    pub sink: Arc<dyn GameStateSink>,
    pub windows: Arc<dyn WindowVisibility>,
    pub scheduler: Scheduler,
}

impl Environment {
    /// `user@host:cwd$ `
    pub fn prompt(&self) -> String {
        format!("{}@{}:{}$ ", self.username, self.hostname, self.cwd)
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve(&self, input: &str) -> String {
        hackme_vfs::resolve(&self.cwd, input)
    }

    /// Queue one line on the terminal surface.
    pub fn print(&self, text: impl Into<String>) -> Completion {
        self.out.line(text)
    }

    /// Queue one line with an explicit style.
    pub fn print_styled(&self, text: impl Into<String>, style: StyleHint) -> Completion {
        self.out.enqueue(text, style)
    }

    /// Queue canned output and wait until the last line is shown.
    pub async fn print_lines(&self, lines: &[&str]) {
        self.out.lines(lines.iter().copied(), StyleHint::Normal).await;
    }

    /// Simulated tool latency.
    pub async fn pause(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("cwd", &self.cwd)
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .finish_non_exhaustive()
    }
}

/// Map a filesystem error to the one-line message a shell tool would print.
pub fn fs_error(command: &str, operand: &str, err: HackError) -> HackError {
    let reason = match err {
        HackError::NotFound(_) => "No such file or directory",
        HackError::NotAFile(_) => "Is a directory",
        HackError::NotADirectory(_) => "Not a directory",
        other => return other,
    };
    HackError::handler(format!("{command}: {operand}: {reason}"))
}

/// Registry of available commands, keyed by exact name.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A name can only be registered once; the first
    /// registration stays in place.
    pub fn register(&mut self, cmd: Command) -> Result<()> {
        if self.commands.contains_key(cmd.name) {
            log::warn!("refusing to register '{}' twice", cmd.name);
            return Err(HackError::DuplicateCommand(cmd.name.to_string()));
        }
        self.commands.insert(cmd.name, cmd);
        Ok(())
    }

    /// Look up a command by exact name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Number of registered commands, hidden ones included.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sorted (name, description) pairs, hidden commands included.
    pub fn list_commands(&self) -> Vec<(&'static str, &'static str)> {
        self.commands
            .values()
            .map(|c| (c.name, c.description))
            .collect()
    }

    /// Sorted names starting with `partial`. Case-sensitive, like dispatch.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        self.commands
            .keys()
            .filter(|name| name.starts_with(partial))
            .map(|name| name.to_string())
            .collect()
    }

    /// Category overview used by `help`.
    pub fn help_lines(&self, hidden: bool) -> Vec<String> {
        let mut categories: BTreeMap<&str, Vec<&Command>> = BTreeMap::new();
        for cmd in self.commands.values().filter(|c| c.hidden == hidden) {
            categories.entry(cmd.category).or_default().push(cmd);
        }

        let mut out = Vec::new();
        if hidden {
            out.push("🕵️  HIDDEN COMMANDS REVEALED:".to_string());
        } else {
            out.push("Available commands:".to_string());
        }
        for (category, cmds) in &categories {
            out.push(String::new());
            out.push(format!("{category}:"));
            if hidden {
                for cmd in cmds {
                    out.push(format!("  {:16} - {}", cmd.name, cmd.description));
                }
            } else {
                let names: Vec<&str> = cmds.iter().map(|c| c.name).collect();
                out.push(format!("  {}", names.join(", ")));
            }
        }
        out.push(String::new());
        if hidden {
            out.push("🎮 Use \"demo-autoplay\" to watch the complete hacking demo!".to_string());
        } else {
            out.push("💡 Tip: Type \"help --hidden\" to reveal secret commands".to_string());
            out.push("Type 'help <command>' for details.".to_string());
        }
        out
    }
}

/// Split a command line on whitespace. No quoting or escapes.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Value of `--flag value` or `--flag=value` in an argument list.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == flag {
            args.get(i + 1).map(String::as_str)
        } else {
            arg.strip_prefix(flag)?.strip_prefix('=')
        }
    })
}

/// Run one command line to completion against `env`.
///
/// Unknown commands, handler errors, and handler panics each end up as a
/// single error line on the terminal surface.
pub async fn run_line(env: &mut Environment, line: &str) {
    let mut tokens = tokenize(line).into_iter();
    let Some(name) = tokens.next() else {
        return;
    };
    let args: Vec<String> = tokens.collect();

    let registry = Arc::clone(&env.registry);
    let Some(command) = registry.get(&name) else {
        let err = HackError::UnknownCommand(name);
        log::debug!("{err}");
        env.print_styled(err.to_string(), StyleHint::Error).await;
        return;
    };

    log::debug!("running '{}' with {} args", command.name, args.len());
    let outcome = AssertUnwindSafe((command.handler)(args, env))
        .catch_unwind()
        .await;
    let failure = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            log::error!("command '{}' panicked: {msg}", command.name);
            HackError::handler(format!("{}: {msg}", command.name))
        },
    };
    log::warn!("command '{}' failed: {failure}", command.name);
    env.print_styled(failure.to_string(), StyleHint::Error).await;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}

struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owns the session environment and runs one command at a time.
///
/// The prompt is republished after every line so it can be read while a
/// command still holds the environment.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    env: tokio::sync::Mutex<Environment>,
    prompt: watch::Sender<String>,
    in_flight: AtomicUsize,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.registry.len())
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl Dispatcher {
    /// Take ownership of the session environment.
    pub fn new(env: Environment) -> Self {
        let (prompt, _) = watch::channel(env.prompt());
        Self {
            registry: Arc::clone(&env.registry),
            env: tokio::sync::Mutex::new(env),
            prompt,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The commands this dispatcher resolves against.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Whether a command line is queued or running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Run `line`. Concurrent callers are served one after another.
    pub async fn dispatch(&self, line: &str) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let _busy = BusyGuard(&self.in_flight);
        let mut env = self.env.lock().await;
        run_line(&mut env, line).await;
        self.prompt.send_replace(env.prompt());
    }

    /// Working directory once the queued lines have run.
    pub async fn cwd(&self) -> String {
        self.env.lock().await.cwd.clone()
    }

    /// Prompt as of the last finished line. Never waits on a running command.
    pub fn prompt(&self) -> String {
        self.prompt.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use hackme_types::testing::SurfaceEvent;

    use super::*;
    use crate::test_support::Harness;

    fn noop(_args: Vec<String>, _env: &mut Environment) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn failing(_args: Vec<String>, _env: &mut Environment) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Err(HackError::handler("boom: it broke")) })
    }

    fn panicking(args: Vec<String>, _env: &mut Environment) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if args.is_empty() {
                panic!("handler exploded");
            }
            Ok(())
        })
    }

    fn echo_args(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            env.print(args.join("|")).await;
            Ok(())
        })
    }

    fn command(name: &'static str, handler: Handler) -> Command {
        Command {
            name,
            description: "test command",
            usage: name,
            category: "Test",
            hidden: false,
            handler,
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = CommandRegistry::new();
        reg.register(command("ls", noop)).unwrap();
        assert!(reg.get("ls").is_some());
        assert!(reg.get("LS").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = CommandRegistry::new();
        reg.register(Command {
            description: "first",
            ..command("ls", noop)
        })
        .unwrap();
        let err = reg
            .register(Command {
                description: "second",
                ..command("ls", failing)
            })
            .unwrap_err();
        assert!(matches!(err, HackError::DuplicateCommand(ref n) if n == "ls"));
        assert_eq!(reg.get("ls").unwrap().description, "first");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn completions_are_sorted_prefix_matches() {
        let mut reg = CommandRegistry::new();
        for name in ["hydra", "hashcat", "help", "ls"] {
            reg.register(command(name, noop)).unwrap();
        }
        assert_eq!(reg.completions("h"), vec!["hashcat", "help", "hydra"]);
        assert_eq!(reg.completions("he"), vec!["help"]);
        assert!(reg.completions("x").is_empty());
        assert!(reg.completions("H").is_empty());
    }

    #[test]
    fn help_lines_split_hidden_commands() {
        let mut reg = CommandRegistry::new();
        reg.register(command("ls", noop)).unwrap();
        reg.register(Command {
            hidden: true,
            category: "Stealth",
            ..command("rootkit", noop)
        })
        .unwrap();
        let normal = reg.help_lines(false).join("\n");
        assert!(normal.contains("  ls"));
        assert!(!normal.contains("rootkit"));
        let hidden = reg.help_lines(true).join("\n");
        assert!(hidden.contains("rootkit"));
        assert!(hidden.contains("Stealth:"));
        assert!(!hidden.contains("  ls"));
    }

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        assert_eq!(tokenize("  nmap   -sV\t10.0.0.1 "), vec!["nmap", "-sV", "10.0.0.1"]);
        assert!(tokenize("   ").is_empty());
        assert_eq!(tokenize("echo 'a b'"), vec!["echo", "'a", "b'"]);
    }

    #[test]
    fn flag_value_forms() {
        let args = tokenize("--type banking --amount=5000 --to");
        assert_eq!(flag_value(&args, "--type"), Some("banking"));
        assert_eq!(flag_value(&args, "--amount"), Some("5000"));
        assert_eq!(flag_value(&args, "--to"), None);
        assert_eq!(flag_value(&args, "--from"), None);
        assert_eq!(flag_value(&args, "--am"), None);
    }

    #[test]
    fn fs_error_uses_operand_as_typed() {
        let err = fs_error("cat", "nope", HackError::NotFound("/home/blackhat/nope".into()));
        assert_eq!(err.to_string(), "cat: nope: No such file or directory");
        let err = fs_error("cd", "x", HackError::NotADirectory("/x".into()));
        assert_eq!(err.to_string(), "cd: x: Not a directory");
        let passthrough = fs_error("cd", "x", HackError::handler("other"));
        assert_eq!(passthrough.to_string(), "other");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_command_prints_exactly_one_line() {
        let h = Harness::with_registry(CommandRegistry::new());
        h.dispatcher.dispatch("frobnicate --now").await;
        assert_eq!(
            h.surface.events(),
            vec![SurfaceEvent::Line(
                "frobnicate: command not found".into(),
                StyleHint::Error
            )]
        );
        assert_eq!(h.dispatcher.cwd().await, "/home/blackhat");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_line_is_a_noop() {
        let h = Harness::with_registry(CommandRegistry::new());
        h.dispatcher.dispatch("").await;
        h.dispatcher.dispatch(" \t ").await;
        assert!(h.surface.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn handler_receives_remaining_tokens() {
        let mut reg = CommandRegistry::new();
        reg.register(command("echo", echo_args)).unwrap();
        let h = Harness::with_registry(reg);
        h.dispatcher.dispatch("echo  a b   c").await;
        assert_eq!(h.surface.lines(), vec!["a|b|c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn handler_error_becomes_one_line() {
        let mut reg = CommandRegistry::new();
        reg.register(command("boom", failing)).unwrap();
        let h = Harness::with_registry(reg);
        h.dispatcher.dispatch("boom").await;
        assert_eq!(
            h.surface.events(),
            vec![SurfaceEvent::Line("boom: it broke".into(), StyleHint::Error)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn handler_panic_is_contained() {
        let mut reg = CommandRegistry::new();
        reg.register(command("crash", panicking)).unwrap();
        reg.register(command("echo", echo_args)).unwrap();
        let h = Harness::with_registry(reg);
        h.dispatcher.dispatch("crash").await;
        h.dispatcher.dispatch("echo still alive").await;
        assert_eq!(
            h.surface.lines(),
            vec!["crash: handler exploded", "still|alive"]
        );
        assert!(!h.dispatcher.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn prompt_is_readable_while_a_command_runs() {
        let h = Harness::new();
        let dispatcher = Arc::clone(&h.dispatcher);
        let running = tokio::spawn(async move { dispatcher.dispatch("nmap 10.0.0.1").await });
        tokio::task::yield_now().await;
        assert!(h.dispatcher.is_busy());
        assert_eq!(h.dispatcher.prompt(), "blackhat@kali:/home/blackhat$ ");
        running.await.unwrap();
        h.dispatcher.dispatch("cd tools").await;
        assert_eq!(h.dispatcher.prompt(), "blackhat@kali:/home/blackhat/tools$ ");
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_is_case_sensitive() {
        let mut reg = CommandRegistry::new();
        reg.register(command("echo", echo_args)).unwrap();
        let h = Harness::with_registry(reg);
        h.dispatcher.dispatch("ECHO hi").await;
        assert_eq!(h.surface.lines(), vec!["ECHO: command not found"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unknown_tokens_print_one_not_found_line(name in "[A-Z][a-zA-Z0-9_-]{0,12}") {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .start_paused(true)
                    .build()
                    .unwrap();
                let lines = rt.block_on(async {
                    let h = Harness::new();
                    h.dispatcher.dispatch(&format!("{name} arg")).await;
                    assert_eq!(h.dispatcher.cwd().await, "/home/blackhat");
                    h.surface.lines()
                });
                prop_assert_eq!(lines, vec![format!("{name}: command not found")]);
            }
        }
    }
}
