//! System commands: help, ls, cd, cat, pwd, whoami, clear, exit, ps,
//! netstat, ifconfig. Also registers the full built-in set.

use futures::future::BoxFuture;
use hackme_types::collab::{StyleHint, WindowId};
use hackme_types::error::{HackError, Result};
use hackme_vfs::EntryKind;

use crate::interpreter::{Command, CommandRegistry, Environment, fs_error};
use crate::{attack_commands, covert_commands, demo, network_commands};

/// Register every built-in command into `reg`.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    let groups: [&[Command]; 4] = [
        COMMANDS,
        network_commands::COMMANDS,
        attack_commands::COMMANDS,
        covert_commands::COMMANDS,
    ];
    for cmd in groups.into_iter().flatten() {
        reg.register(*cmd)?;
    }
    reg.register(demo::DEMO_AUTOPLAY)?;
    log::debug!("registered {} built-in commands", reg.len());
    Ok(())
}

pub const COMMANDS: &[Command] = &[HELP, LS, CD, CAT, PWD, WHOAMI, CLEAR, EXIT, PS, NETSTAT, IFCONFIG];

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

pub const HELP: Command = Command {
    name: "help",
    description: "List available commands",
    usage: "help [command | --hidden]",
    category: "System",
    hidden: false,
    handler: help,
};

fn help(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let lines = if args.iter().any(|a| a == "--hidden" || a == "--all") {
            env.registry.help_lines(true)
        } else if let Some(name) = args.first() {
            let cmd = env
                .registry
                .get(name)
                .ok_or_else(|| HackError::handler(format!("help: no help topics match '{name}'")))?;
            vec![
                format!("{} ({})", cmd.name, cmd.category),
                format!("  {}", cmd.description),
                format!("  Usage: {}", cmd.usage),
            ]
        } else {
            env.registry.help_lines(false)
        };
        env.out.lines(lines, StyleHint::Normal).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

pub const LS: Command = Command {
    name: "ls",
    description: "List directory contents",
    usage: "ls [path]",
    category: "System",
    hidden: false,
    handler: ls,
};

fn ls(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let (path, shown) = match args.first() {
            Some(operand) => (env.resolve(operand), operand.as_str()),
            None => (env.cwd.clone(), "."),
        };
        match env.vfs.stat(&path).map_err(|e| fs_error("ls", shown, e))? {
            EntryKind::File => {
                env.print(shown).await;
            },
            EntryKind::Directory => {
                let entries: Vec<String> = env
                    .vfs
                    .list(&path)?
                    .iter()
                    .map(|name| {
                        if env.vfs.is_dir(&hackme_vfs::resolve(&path, name)) {
                            format!("{name}/")
                        } else {
                            name.clone()
                        }
                    })
                    .collect();
                if !entries.is_empty() {
                    env.print(entries.join("  ")).await;
                }
            },
        }
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

pub const CD: Command = Command {
    name: "cd",
    description: "Change the working directory",
    usage: "cd [path]",
    category: "System",
    hidden: false,
    handler: cd,
};

fn cd(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(target) = args.first() else {
            env.cwd = env.home.clone();
            return Ok(());
        };
        let path = env.resolve(target);
        match env.vfs.stat(&path).map_err(|e| fs_error("cd", target, e))? {
            EntryKind::Directory => {
                log::debug!("cwd -> {path}");
                env.cwd = path;
                Ok(())
            },
            EntryKind::File => Err(fs_error("cd", target, HackError::NotADirectory(path))),
        }
    })
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

pub const CAT: Command = Command {
    name: "cat",
    description: "Print file contents",
    usage: "cat <file>",
    category: "System",
    hidden: false,
    handler: cat,
};

fn cat(args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let Some(operand) = args.first() else {
            return Err(HackError::handler("cat: missing file operand"));
        };
        let path = env.resolve(operand);
        let content = env.vfs.read(&path).map_err(|e| fs_error("cat", operand, e))?;
        env.out.lines(content.lines(), StyleHint::Normal).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// pwd / whoami
// ---------------------------------------------------------------------------

pub const PWD: Command = Command {
    name: "pwd",
    description: "Print the working directory",
    usage: "pwd",
    category: "System",
    hidden: false,
    handler: pwd,
};

fn pwd(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print(env.cwd.clone()).await;
        Ok(())
    })
}

pub const WHOAMI: Command = Command {
    name: "whoami",
    description: "Print the current user",
    usage: "whoami",
    category: "System",
    hidden: false,
    handler: whoami,
};

fn whoami(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print(env.username.clone()).await;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// clear / exit
// ---------------------------------------------------------------------------

pub const CLEAR: Command = Command {
    name: "clear",
    description: "Clear the terminal",
    usage: "clear",
    category: "System",
    hidden: false,
    handler: clear,
};

fn clear(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.out.clear().await;
        Ok(())
    })
}

pub const EXIT: Command = Command {
    name: "exit",
    description: "Close the terminal window",
    usage: "exit",
    category: "System",
    hidden: false,
    handler: exit,
};

fn exit(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print("Goodbye!").await;
        env.windows.hide(WindowId::Terminal);
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// ps / netstat / ifconfig
// ---------------------------------------------------------------------------

pub const PS: Command = Command {
    name: "ps",
    description: "List running processes",
    usage: "ps",
    category: "System",
    hidden: false,
    handler: ps,
};

const PROCESS_TABLE: &[&str] = &[
    "PID  USER     COMMAND",
    "1    root     /sbin/init",
    "123  root     [kthreadd]",
    "456  blackhat /bin/bash",
    "789  blackhat wireshark",
    "1011 blackhat python3 keylogger.py",
    "1213 blackhat nc -l 4444",
    "1415 blackhat metasploit",
];

fn ps(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(PROCESS_TABLE).await;
        Ok(())
    })
}

pub const NETSTAT: Command = Command {
    name: "netstat",
    description: "Show network connections",
    usage: "netstat",
    category: "Network",
    hidden: false,
    handler: netstat,
};

const CONNECTIONS: &[&str] = &[
    "Active Internet connections:",
    "Proto Recv-Q Send-Q Local Address      Foreign Address    State",
    "tcp        0      0 127.0.0.1:4444     0.0.0.0:*          LISTEN",
    "tcp        0      0 192.168.1.100:22   192.168.1.1:52341  ESTABLISHED",
    "tcp        0      0 192.168.1.100:443  74.125.224.72:443  ESTABLISHED",
    "udp        0      0 0.0.0.0:53         0.0.0.0:*",
];

fn netstat(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(CONNECTIONS).await;
        Ok(())
    })
}

pub const IFCONFIG: Command = Command {
    name: "ifconfig",
    description: "Show network interfaces",
    usage: "ifconfig",
    category: "Network",
    hidden: false,
    handler: ifconfig,
};

const INTERFACES: &[&str] = &[
    "eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500",
    "        inet 192.168.1.100  netmask 255.255.255.0  broadcast 192.168.1.255",
    "        inet6 fe80::a00:27ff:fe4e:66a1  prefixlen 64  scopeid 0x20<link>",
    "        ether 08:00:27:4e:66:a1  txqueuelen 1000  (Ethernet)",
    "",
    "wlan0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500",
    "        inet 192.168.1.101  netmask 255.255.255.0  broadcast 192.168.1.255",
    "        ether 00:1f:3f:12:34:56  txqueuelen 1000  (IEEE 802.11)",
];

fn ifconfig(_args: Vec<String>, env: &mut Environment) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        env.print_lines(INTERFACES).await;
        Ok(())
    })
}
