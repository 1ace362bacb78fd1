use {
    config::{Config, ConfigError, Environment, File, FileFormat},
    reqwest::Url,
    serde::Deserialize,
    std::env,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Logger {
    pub level: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Accessory {
    /// Display name shown by the hub.
    pub name: String,
}

/// Where the CO2 reading is fetched from.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub url: String,
    /// JSON field holding the reading.
    #[serde(default = "default_field")]
    pub field: String,
    /// Whole-request timeout, 0 disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Answer unparseable bodies with the last known level instead of an error.
    #[serde(default)]
    pub stale_on_parse_error: bool,
}

impl Source {
    /// Parses `url`, which must be an absolute http(s) URL with a host.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| {
            ConfigError::Message(format!("source.url `{}` is not a valid URL: {}", self.url, e))
        })?;

        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err(ConfigError::Message(format!(
                "source.url `{}` must be an absolute http or https URL",
                self.url
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mqtt {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic_prefix: String,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Poll {
    #[serde(default)]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logger: Logger,
    pub accessory: Accessory,
    pub source: Source,
    pub mqtt: Mqtt,
    #[serde(default)]
    pub poll: Poll,
}

fn default_field() -> String {
    "co2level".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_keep_alive_secs() -> u64 {
    5
}

impl Settings {
    /// Loads `configs/default`, the optional `configs/$RUN_MODE` overlay and
    /// `CO2__`-prefixed environment variables, in that order.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("CO2")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.accessory.name.trim().is_empty() {
            return Err(ConfigError::Message(
                "accessory.name must not be empty".into(),
            ));
        }

        if self.source.field.is_empty() {
            return Err(ConfigError::Message("source.field must not be empty".into()));
        }

        self.source.endpoint()?;

        Ok(())
    }
}
