// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Alert notification capability
//!
//! The detection loop calls [`AlertSink::notify`] once per frame that contains
//! an intrusion. Sinks never report failure back to the loop.

use std::io::{IsTerminal, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Enable alerts at all
    pub enabled: bool,

    /// Ring the terminal bell when stderr is a terminal
    pub terminal_bell: bool,

    /// External command to spawn per alert, e.g. `["paplay", "/usr/share/sounds/alarm.oga"]`
    pub command: Option<Vec<String>>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            terminal_bell: true,
            command: None,
        }
    }
}

/// Fire-and-forget notification
pub trait AlertSink: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Signal one intrusion; must not block the caller
    fn notify(&self);
}

/// Does nothing; used when the host has no way to alert
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlert;

impl AlertSink for NoopAlert {
    fn name(&self) -> &'static str {
        "none"
    }

    fn notify(&self) {}
}

/// Writes BEL to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn name(&self) -> &'static str {
        "terminal-bell"
    }

    fn notify(&self) {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Spawns an external program per alert without waiting on it
#[derive(Debug, Clone)]
pub struct CommandAlert {
    program: String,
    args: Vec<String>,
}

impl CommandAlert {
    /// `argv[0]` is the program; `None` for an empty argv
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Executable that is spawned per alert
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AlertSink for CommandAlert {
    fn name(&self) -> &'static str {
        "command"
    }

    fn notify(&self) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                // Reap in the background so finished alerts don't linger as zombies
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => debug!("Alert command '{}' failed to start: {}", self.program, e),
        }
    }
}

/// Pick an alert sink for this host
pub fn select(config: &AlertConfig) -> Arc<dyn AlertSink> {
    let sink: Arc<dyn AlertSink> = if !config.enabled {
        Arc::new(NoopAlert)
    } else if let Some(cmd) = config.command.as_deref().and_then(CommandAlert::from_argv) {
        Arc::new(cmd)
    } else if config.terminal_bell && std::io::stderr().is_terminal() {
        Arc::new(TerminalBell)
    } else {
        Arc::new(NoopAlert)
    };

    info!("Alert sink: {}", sink.name());
    sink
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_noop() {
        let config = AlertConfig {
            enabled: false,
            command: Some(vec!["true".into()]),
            ..Default::default()
        };
        assert_eq!(select(&config).name(), "none");
    }

    #[test]
    fn test_command_preferred() {
        let config = AlertConfig {
            command: Some(vec!["paplay".into(), "alarm.oga".into()]),
            ..Default::default()
        };
        assert_eq!(select(&config).name(), "command");
    }

    #[test]
    fn test_empty_command_ignored() {
        assert!(CommandAlert::from_argv(&[]).is_none());
        assert!(CommandAlert::from_argv(&[" ".to_string()]).is_none());

        let config = AlertConfig {
            terminal_bell: false,
            command: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(select(&config).name(), "none");
    }

    #[test]
    fn test_missing_program_is_swallowed() {
        let alert = CommandAlert::from_argv(&["/nonexistent/sentrycam-alert".to_string()]).unwrap();
        alert.notify();
        assert_eq!(alert.program(), "/nonexistent/sentrycam-alert");
    }
}
