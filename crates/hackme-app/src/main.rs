//! HackmeNow console entry point.
//!
//! Runs one session in the current terminal: raw-mode keyboard input, the
//! command console on the scrolling screen, story beats interleaved with it.
//! Ctrl-C, Ctrl-D or `exit` end the session.
//!
//! Configuration comes from the TOML file named by the first argument or by
//! `HACKME_CONFIG`; without either the stock session is used.

mod keys;
mod screen;
mod session;
mod windows;

use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use hackme_types::collab::WindowId;
use hackme_types::config::SessionConfig;
use hackme_types::records::GameLog;
use keys::Action;
use screen::{Screen, SurfaceKind, SurfaceView};
use session::{Session, Surfaces};
use windows::TtyWindows;

fn load_config() -> Result<SessionConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HACKME_CONFIG").ok());
    match path {
        Some(path) => Ok(SessionConfig::load(Path::new(&path))?),
        None => {
            log::info!("No config given, using defaults");
            Ok(SessionConfig::default())
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    log::info!(
        "Starting HackmeNow as {}@{}",
        config.shell.username,
        config.shell.hostname
    );

    let screen = Arc::new(Screen::new(io::stdout()));
    let windows = Arc::new(TtyWindows::new());
    let game_log = Arc::new(GameLog::new());
    let surfaces = Surfaces {
        terminal: Arc::new(SurfaceView::new(Arc::clone(&screen), SurfaceKind::Terminal)),
        story: Arc::new(SurfaceView::new(Arc::clone(&screen), SurfaceKind::Story)),
        windows: Arc::clone(&windows) as _,
        sink: Arc::clone(&game_log) as _,
    };
    let mut session = Session::build(&config, surfaces)?;

    enable_raw_mode()?;
    let result = run(&mut session, &screen, &windows).await;
    session.shutdown();
    disable_raw_mode()?;
    println!();

    if !windows.is_visible(WindowId::Terminal) {
        log::info!("Terminal window closed");
    }
    log::info!("Session ended. Game log: {}", game_log.to_json());
    result
}

async fn run(session: &mut Session, screen: &Screen<Stdout>, windows: &TtyWindows) -> Result<()> {
    let mut keys = keys::spawn_reader();
    session.begin().await;
    screen.set_input(session.console.input_line())?;

    loop {
        let busy = session.console.is_busy();
        tokio::select! {
            action = keys.recv() => match action {
                Some(Action::Key(key)) => session.console.handle_key(key).await,
                Some(Action::Quit) | None => break,
            },
            _ = session.console.idle(), if busy => {},
            _ = windows.terminal_closed() => break,
        }
        screen.set_input(session.console.input_line())?;
    }
    Ok(())
}
