//! ADB client that shells out to the `adb` program.

use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, TvError};
use crate::keys::{KeyCode, TvCommand};

/// Default TV address on the local network.
pub const DEFAULT_ADB_HOST: &str = "192.168.1.11";

/// Default wireless debugging port.
pub const DEFAULT_ADB_PORT: &str = "36275";

/// Default bound on each adb invocation.
pub const DEFAULT_ADB_TIMEOUT: Duration = Duration::from_secs(10);

/// ADB client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbConfig {
    /// adb executable name or path.
    pub program: String,
    pub host: String,
    pub port: String,
    /// Applied to `connect` and `shell` separately.
    pub timeout: Duration,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            host: DEFAULT_ADB_HOST.to_string(),
            port: DEFAULT_ADB_PORT.to_string(),
            timeout: DEFAULT_ADB_TIMEOUT,
        }
    }
}

impl AdbConfig {
    /// Parse a `host:port` target, keeping the other defaults.
    pub fn from_target(target: &str) -> Result<Self> {
        let (host, port) = target
            .rsplit_once(':')
            .ok_or_else(|| TvError::invalid_target(target, "expected host:port"))?;
        if host.is_empty() {
            return Err(TvError::invalid_target(target, "empty host"));
        }
        if port.parse::<u16>().is_err() {
            return Err(TvError::invalid_target(target, "port is not a number"));
        }
        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
            ..Self::default()
        })
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Device serial as adb expects it (`host:port`).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sends remote button presses to an Android TV.
#[derive(Debug, Clone)]
pub struct AdbClient {
    config: AdbConfig,
}

impl AdbClient {
    pub fn new(config: AdbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdbConfig {
        &self.config
    }

    /// Arguments for `adb connect host:port`.
    pub fn connect_args(&self) -> Vec<String> {
        vec!["connect".to_string(), self.config.address()]
    }

    /// Arguments for `adb -s host:port shell input keyevent <code>`.
    pub fn key_args(&self, code: KeyCode) -> Vec<String> {
        vec![
            "-s".to_string(),
            self.config.address(),
            "shell".to_string(),
            "input".to_string(),
            "keyevent".to_string(),
            code.to_string(),
        ]
    }

    /// Press one remote button.
    pub async fn send(&self, command: TvCommand) -> Result<()> {
        self.send_key(command.key_code()).await?;
        info!(%command, address = %self.config.address(), "tv command sent");
        Ok(())
    }

    /// Connect (idempotent on the adb side) and send a raw key event.
    pub async fn send_key(&self, code: KeyCode) -> Result<()> {
        self.run("connect", self.connect_args()).await?;
        self.run("shell", self.key_args(code)).await?;
        Ok(())
    }

    async fn run(&self, step: &'static str, args: Vec<String>) -> Result<()> {
        debug!(program = %self.config.program, ?args, "running adb");

        let child = Command::new(&self.config.program)
            .args(&args)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.config.timeout, child)
            .await
            .map_err(|_| TvError::timeout(step, self.config.timeout))?
            .map_err(|source| TvError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TvError::CommandFailed {
                step,
                status: output.status.to_string(),
                output: combined_output(&output),
            });
        }
        Ok(())
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = AdbConfig::default();
        assert_eq!(config.program, "adb");
        assert_eq!(config.address(), "192.168.1.11:36275");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_from_target() {
        let config = AdbConfig::from_target("10.0.0.5:5555").unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, "5555");
        assert_eq!(config.program, "adb");
    }

    #[rstest]
    #[case("10.0.0.5")]
    #[case(":5555")]
    #[case("tv:adb")]
    #[case("tv:70000")]
    fn test_from_target_rejects(#[case] target: &str) {
        let result = AdbConfig::from_target(target);
        assert!(matches!(result, Err(TvError::InvalidTarget { .. })));
    }

    #[test]
    fn test_command_arguments() {
        let client = AdbClient::new(AdbConfig::from_target("tv.local:5555").unwrap());

        assert_eq!(client.connect_args(), vec!["connect", "tv.local:5555"]);
        assert_eq!(
            client.key_args(TvCommand::Power.key_code()),
            vec!["-s", "tv.local:5555", "shell", "input", "keyevent", "26"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_send_succeeds_when_adb_exits_cleanly() {
        let client = AdbClient::new(AdbConfig::default().with_program("true"));
        client.send(TvCommand::VolumeUp).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_connect_failure_stops_before_keyevent() {
        let client = AdbClient::new(AdbConfig::default().with_program("false"));
        let result = client.send(TvCommand::Home).await;
        assert!(matches!(
            result,
            Err(TvError::CommandFailed { step: "connect", .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let client = AdbClient::new(
            AdbConfig::default().with_program("relaypanel-no-such-adb-binary"),
        );
        let result = client.send(TvCommand::Back).await;
        assert!(matches!(result, Err(TvError::Spawn { .. })));
    }
}
