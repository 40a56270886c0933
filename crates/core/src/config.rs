use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BOT_NAME: &str = "blockbot";
pub const DEFAULT_TRIGGER_WORD: &str = "blockbot";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    /// Shared secret Slack sends in the `token` field of every outgoing webhook.
    pub webhook_token: SecretString,
    /// Used when a request does not carry its own `trigger_word`.
    pub trigger_word: String,
}

#[derive(Clone, Debug, Default)]
pub struct BotConfig {
    pub username: Option<String>,
    pub icon_emoji: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub webhook_token: Option<String>,
    pub trigger_word: Option<String>,
    pub bot_username: Option<String>,
    pub bot_icon_emoji: Option<String>,
    pub server_port: Option<u16>,
    pub health_check_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://blockbot.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            slack: SlackConfig {
                webhook_token: String::new().into(),
                trigger_word: DEFAULT_TRIGGER_WORD.to_string(),
            },
            bot: BotConfig::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 4567,
                health_check_port: 8080,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl BotConfig {
    /// Name users type to invoke the bot; interpolated into help and error replies.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_BOT_NAME)
    }
}

impl SlackConfig {
    pub fn token_matches(&self, candidate: Option<&str>) -> bool {
        let expected = self.webhook_token.expose_secret();
        matches!(candidate, Some(token) if !expected.is_empty() && token == expected)
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("blockbot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(webhook_token) = slack.webhook_token {
                self.slack.webhook_token = secret_value(webhook_token);
            }
            if let Some(trigger_word) = slack.trigger_word {
                self.slack.trigger_word = trigger_word;
            }
        }

        if let Some(bot) = patch.bot {
            if let Some(username) = bot.username {
                self.bot.username = Some(username);
            }
            if let Some(icon_emoji) = bot.icon_emoji {
                self.bot.icon_emoji = Some(icon_emoji);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BLOCKBOT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("BLOCKBOT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("BLOCKBOT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("BLOCKBOT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("BLOCKBOT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        let webhook_token =
            read_env("BLOCKBOT_SLACK_WEBHOOK_TOKEN").or_else(|| read_env("OUTGOING_WEBHOOK_TOKEN"));
        if let Some(value) = webhook_token {
            self.slack.webhook_token = secret_value(value);
        }
        if let Some(value) = read_env("BLOCKBOT_SLACK_TRIGGER_WORD") {
            self.slack.trigger_word = value;
        }

        let username = read_env("BLOCKBOT_BOT_USERNAME").or_else(|| read_env("BOT_USERNAME"));
        if let Some(value) = username {
            self.bot.username = Some(value);
        }
        let icon = read_env("BLOCKBOT_BOT_ICON").or_else(|| read_env("BOT_ICON"));
        if let Some(value) = icon {
            self.bot.icon_emoji = Some(value);
        }

        if let Some(value) = read_env("BLOCKBOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("BLOCKBOT_SERVER_PORT") {
            self.server.port = parse_u16("BLOCKBOT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("BLOCKBOT_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("BLOCKBOT_SERVER_HEALTH_CHECK_PORT", &value)?;
        }

        let log_level =
            read_env("BLOCKBOT_LOGGING_LEVEL").or_else(|| read_env("BLOCKBOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BLOCKBOT_LOGGING_FORMAT").or_else(|| read_env("BLOCKBOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(webhook_token) = overrides.webhook_token {
            self.slack.webhook_token = secret_value(webhook_token);
        }
        if let Some(trigger_word) = overrides.trigger_word {
            self.slack.trigger_word = trigger_word;
        }
        if let Some(username) = overrides.bot_username {
            self.bot.username = Some(username);
        }
        if let Some(icon_emoji) = overrides.bot_icon_emoji {
            self.bot.icon_emoji = Some(icon_emoji);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(health_check_port) = overrides.health_check_port {
            self.server.health_check_port = health_check_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_slack(&self.slack)?;
        validate_bot(&self.bot)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("blockbot.toml"), PathBuf::from("config/blockbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if slack.webhook_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.webhook_token is required. Copy it from the outgoing webhook integration settings (Slack > Apps > Outgoing WebHooks > Token)".to_string(),
        ));
    }

    if slack.trigger_word.trim().is_empty() {
        return Err(ConfigError::Validation("slack.trigger_word must not be empty".to_string()));
    }

    Ok(())
}

fn validate_bot(bot: &BotConfig) -> Result<(), ConfigError> {
    if let Some(username) = &bot.username {
        if username.trim().is_empty() {
            return Err(ConfigError::Validation(
                "bot.username must not be blank when set".to_string(),
            ));
        }
    }

    if let Some(icon) = &bot.icon_emoji {
        let well_formed = icon.len() > 2 && icon.starts_with(':') && icon.ends_with(':');
        if !well_formed {
            return Err(ConfigError::Validation(format!(
                "bot.icon_emoji must look like `:emoji_name:` (got `{icon}`)"
            )));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.port and server.health_check_port must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    slack: Option<SlackPatch>,
    bot: Option<BotPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    webhook_token: Option<String>,
    trigger_word: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    username: Option<String>,
    icon_emoji: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
