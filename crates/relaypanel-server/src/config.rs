//! Command-line configuration.
//!
//! Flags accept both `--flag value` and `--flag=value`; a single leading dash
//! works too. Device mode precedence is `--multi`, then `--telnet`, then
//! serial.

use std::net::SocketAddr;
use std::path::PathBuf;

use relaypanel_hardware::transport::serial::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT};
use relaypanel_hardware::transport::telnet::DEFAULT_TELNET_PORT;
use relaypanel_hardware::transport::{SerialConfig, TelnetTarget};
use relaypanel_tv::AdbConfig;

/// Relay board host in multi mode.
pub const MULTI_RELAYS_HOST: &str = "esp32-1.local";

/// Buzzer controller host in multi mode.
pub const MULTI_BUZZER_HOST: &str = "esp32-2.local";

/// Default HTTP listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:42069";

pub const USAGE: &str = "\
Usage: relaypanel [--serial PORT] [--baud BAUD] [--telnet HOST[:PORT]] [--multi]
                  [--http ADDR] [--db PATH] [--adb HOST:PORT] [--static DIR]

Examples:
  # Serial mode (default COM5, 9600 baud):
  relaypanel --serial=COM5 --baud=9600
  # Telnet mode:
  relaypanel --telnet=192.168.1.50:23
  # Multi telnet mode (relays at esp32-1.local, buzzer at esp32-2.local):
  relaypanel --multi

Options:
  --serial PORT       serial port of the relay board (default COM5)
  --baud BAUD         serial baud rate (default 9600)
  --telnet HOST:PORT  relay board telnet address, port defaults to 23
  --multi             connect relays and buzzer over telnet
  --http ADDR         HTTP listen address (default 0.0.0.0:42069)
  --db PATH           label database (default .relaypanel.db next to the binary)
  --adb HOST:PORT     Android TV adb target (default 192.168.1.11:36275)
  --static DIR        static web files (default static/ next to the binary)
  --help              show this message
";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown flag: {flag}")]
    UnknownFlag { flag: String },

    #[error("flag needs a value: --{flag}")]
    MissingValue { flag: &'static str },

    #[error("flag takes no value: --{flag}")]
    UnexpectedValue { flag: &'static str },

    #[error("invalid value {value:?} for --{flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(flag: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            flag,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// How the controllers are reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMode {
    /// Relay board on a serial port; no buzzer.
    Serial(SerialConfig),

    /// Relay board over telnet; no buzzer.
    Telnet(TelnetTarget),

    /// Relay board and buzzer on separate telnet hosts.
    Multi {
        relays: TelnetTarget,
        buzzer: TelnetTarget,
    },
}

impl DeviceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serial(_) => "serial",
            Self::Telnet(_) => "telnet",
            Self::Multi { .. } => "multi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub mode: DeviceMode,
    pub http_addr: SocketAddr,
    /// `None` uses the file next to the executable.
    pub database_path: Option<PathBuf>,
    pub adb: AdbConfig,
    /// `None` uses `static/` next to the executable.
    pub static_dir: Option<PathBuf>,
}

/// Result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(Box<ServerConfig>),
    Help,
}

#[derive(Default)]
struct RawFlags {
    serial: Option<String>,
    baud: Option<String>,
    telnet: Option<String>,
    multi: bool,
    http: Option<String>,
    db: Option<String>,
    adb: Option<String>,
    static_dir: Option<String>,
}

impl ServerConfig {
    /// Parse flags (without the program name).
    ///
    /// An empty argument list asks for help, so a bare invocation prints the
    /// usage instead of opening the default serial port.
    pub fn from_args<I, S>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into).peekable();
        if args.peek().is_none() {
            return Ok(CliAction::Help);
        }

        let mut raw = RawFlags::default();
        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                return Err(ConfigError::UnknownFlag { flag: arg.clone() });
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (flag, None),
            };

            let mut value = |flag: &'static str| {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or(ConfigError::MissingValue { flag })
            };

            match name {
                "help" | "h" => return Ok(CliAction::Help),
                "multi" => {
                    raw.multi = match inline.as_deref() {
                        None | Some("true") => true,
                        Some("false") => false,
                        Some(_) => return Err(ConfigError::UnexpectedValue { flag: "multi" }),
                    };
                }
                "serial" => raw.serial = Some(value("serial")?),
                "baud" => raw.baud = Some(value("baud")?),
                "telnet" => raw.telnet = Some(value("telnet")?),
                "http" => raw.http = Some(value("http")?),
                "db" => raw.db = Some(value("db")?),
                "adb" => raw.adb = Some(value("adb")?),
                "static" => raw.static_dir = Some(value("static")?),
                _ => return Err(ConfigError::UnknownFlag { flag: arg.clone() }),
            }
        }

        raw.build().map(|config| CliAction::Run(Box::new(config)))
    }
}

impl RawFlags {
    fn build(self) -> Result<ServerConfig, ConfigError> {
        let mode = if self.multi {
            DeviceMode::Multi {
                relays: TelnetTarget::new(MULTI_RELAYS_HOST, DEFAULT_TELNET_PORT),
                buzzer: TelnetTarget::new(MULTI_BUZZER_HOST, DEFAULT_TELNET_PORT),
            }
        } else if let Some(address) = self.telnet.filter(|a| !a.is_empty()) {
            let target = TelnetTarget::parse(&address)
                .map_err(|e| ConfigError::invalid("telnet", &address, e))?;
            DeviceMode::Telnet(target)
        } else {
            let baud_rate = match self.baud {
                Some(baud) => baud
                    .parse::<u32>()
                    .map_err(|e| ConfigError::invalid("baud", &baud, e))?,
                None => DEFAULT_BAUD_RATE,
            };
            let port = self.serial.unwrap_or_else(|| DEFAULT_SERIAL_PORT.to_string());
            DeviceMode::Serial(SerialConfig::new(port, baud_rate))
        };

        let http = self.http.unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = http
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("http", &http, e))?;

        let adb = match self.adb {
            Some(target) => {
                AdbConfig::from_target(&target).map_err(|e| ConfigError::invalid("adb", &target, e))?
            }
            None => AdbConfig::default(),
        };

        Ok(ServerConfig {
            mode,
            http_addr,
            database_path: self.db.map(PathBuf::from),
            adb,
            static_dir: self.static_dir.map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run(args: &[&str]) -> ServerConfig {
        match ServerConfig::from_args(args.iter().copied()).unwrap() {
            CliAction::Run(config) => *config,
            CliAction::Help => panic!("expected a run config"),
        }
    }

    #[test]
    fn test_no_arguments_prints_help() {
        let action = ServerConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(action, CliAction::Help);
    }

    #[rstest]
    #[case(&["--help"])]
    #[case(&["-h"])]
    #[case(&["--serial", "COM3", "--help"])]
    fn test_help_flag(#[case] args: &[&str]) {
        let action = ServerConfig::from_args(args.iter().copied()).unwrap();
        assert_eq!(action, CliAction::Help);
    }

    #[test]
    fn test_serial_defaults() {
        let config = run(&["--baud", "9600"]);
        assert_eq!(config.mode, DeviceMode::Serial(SerialConfig::new("COM5", 9600)));
        assert_eq!(config.http_addr, "0.0.0.0:42069".parse().unwrap());
        assert_eq!(config.adb, AdbConfig::default());
        assert!(config.database_path.is_none());
        assert!(config.static_dir.is_none());
    }

    #[rstest]
    #[case(&["--serial=COM6", "--baud=115200"])]
    #[case(&["--serial", "COM6", "--baud", "115200"])]
    #[case(&["-serial", "COM6", "-baud=115200"])]
    fn test_serial_flag_forms(#[case] args: &[&str]) {
        let config = run(args);
        assert_eq!(config.mode, DeviceMode::Serial(SerialConfig::new("COM6", 115200)));
        assert_eq!(config.mode.as_str(), "serial");
    }

    #[test]
    fn test_telnet_mode() {
        let config = run(&["--telnet=192.168.1.50"]);
        assert_eq!(
            config.mode,
            DeviceMode::Telnet(TelnetTarget::new("192.168.1.50", 23))
        );
    }

    #[test]
    fn test_multi_takes_precedence() {
        let config = run(&["--telnet", "10.0.0.2:2323", "--multi"]);
        assert_eq!(
            config.mode,
            DeviceMode::Multi {
                relays: TelnetTarget::new("esp32-1.local", 23),
                buzzer: TelnetTarget::new("esp32-2.local", 23),
            }
        );
        assert_eq!(config.mode.as_str(), "multi");
    }

    #[test]
    fn test_server_options() {
        let config = run(&[
            "--multi",
            "--http=127.0.0.1:8080",
            "--db",
            "/tmp/labels.db",
            "--adb=10.0.0.9:5555",
            "--static",
            "web",
        ]);
        assert_eq!(config.http_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/labels.db")));
        assert_eq!(config.adb.address(), "10.0.0.9:5555");
        assert_eq!(config.static_dir, Some(PathBuf::from("web")));
    }

    #[rstest]
    #[case(&["--baud", "fast"], "baud")]
    #[case(&["--http", "nowhere"], "http")]
    #[case(&["--adb", "tv"], "adb")]
    #[case(&["--telnet", "host:port"], "telnet")]
    fn test_invalid_values(#[case] args: &[&str], #[case] expected: &str) {
        match ServerConfig::from_args(args.iter().copied()) {
            Err(ConfigError::InvalidValue { flag, .. }) => assert_eq!(flag, expected),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_value() {
        let result = ServerConfig::from_args(["--serial"]);
        assert_eq!(result, Err(ConfigError::MissingValue { flag: "serial" }));
    }

    #[rstest]
    #[case(&["--verbose"])]
    #[case(&["COM5"])]
    fn test_unknown_flags(#[case] args: &[&str]) {
        let result = ServerConfig::from_args(args.iter().copied());
        assert!(matches!(result, Err(ConfigError::UnknownFlag { .. })));
    }

    #[test]
    fn test_multi_rejects_value() {
        let result = ServerConfig::from_args(["--multi=yes"]);
        assert_eq!(result, Err(ConfigError::UnexpectedValue { flag: "multi" }));
    }
}
