use clap::ValueEnum;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was already installed for this process.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Annotation service variants a process can serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    /// Named-entity extraction backed by the remote CoBot NER API.
    CobotNer,
    /// Lexicon-based "bad words" flag computed in process.
    BadlistedWords,
    /// Pattern flags signalling that a user may need assistance.
    Assistance,
    /// Dialog-response ranking backed by a DialogRPT scorer.
    Dialogrpt,
}

impl ServiceKind {
    /// Stable name used in logs, reports and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CobotNer => "cobot_ner",
            Self::BadlistedWords => "badlisted_words",
            Self::Assistance => "assistance",
            Self::Dialogrpt => "dialogrpt",
        }
    }

    /// Per-call deadline applied when no override is configured.
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::CobotNer => Duration::from_millis(600),
            Self::BadlistedWords | Self::Assistance => Duration::from_millis(100),
            Self::Dialogrpt => Duration::from_millis(2000),
        }
    }

    /// Environment variable overriding the per-call deadline, in milliseconds.
    pub const fn timeout_variable(self) -> &'static str {
        match self {
            Self::CobotNer => "COBOT_NER_TIMEOUT_MS",
            Self::BadlistedWords => "BADLIST_TIMEOUT_MS",
            Self::Assistance => "ASSISTANCE_TIMEOUT_MS",
            Self::Dialogrpt => "DIALOGRPT_TIMEOUT_MS",
        }
    }
}

/// Backend-specific settings for the selected service variant.
#[derive(Clone, Debug)]
pub enum BackendConfig {
    /// Remote NER API credentials and endpoint.
    CobotNer {
        /// Value sent in the `x-api-key` header.
        api_key: String,
        /// Full URL of the NER endpoint.
        service_url: String,
    },
    /// Optional lexicon override for the badlisted-words detector.
    BadlistedWords {
        /// Path to a lexicon file; the built-in lexicon is used when absent.
        lexicon_path: Option<PathBuf>,
    },
    /// The assistance detector needs no backend settings.
    Assistance,
    /// Remote DialogRPT scorer endpoint and model selection.
    DialogRpt {
        /// Full URL of the scoring endpoint.
        scorer_url: String,
        /// Checkpoint name forwarded to the scorer.
        model_name: String,
        /// Skip the startup warm-up call.
        skip_warmup: bool,
    },
}

/// Runtime configuration for an annotation service process.
#[derive(Clone, Debug)]
pub struct Config {
    /// Service variant served by this process.
    pub service: ServiceKind,
    /// Port the HTTP listener binds to.
    pub server_port: u16,
    /// Maximum number of downstream calls in flight for a single batch.
    pub batch_concurrency: usize,
    /// Deadline applied to every downstream call.
    pub timeout: Duration,
    /// Variant-specific backend settings.
    pub backend: BackendConfig,
}

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MODEL_NAME: &str = "dialogrpt_ru_ckpt_v0.pth";

impl Config {
    /// Load configuration for `service` from environment variables.
    pub fn from_env(service: ServiceKind) -> Result<Self, ConfigError> {
        Self::from_lookup(service, |key| env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names.
    pub fn from_lookup<F>(service: ServiceKind, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let backend = match service {
            ServiceKind::CobotNer => BackendConfig::CobotNer {
                api_key: vars.required("COBOT_API_KEY")?,
                service_url: vars.required("COBOT_NER_SERVICE_URL")?,
            },
            ServiceKind::BadlistedWords => BackendConfig::BadlistedWords {
                lexicon_path: vars.optional("BADLIST_PATH").map(PathBuf::from),
            },
            ServiceKind::Assistance => BackendConfig::Assistance,
            ServiceKind::Dialogrpt => BackendConfig::DialogRpt {
                scorer_url: vars.required("DIALOGRPT_SCORER_URL")?,
                model_name: vars
                    .optional("PRETRAINED_MODEL_FNAME")
                    .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
                skip_warmup: vars
                    .parsed::<bool>("DIALOGRPT_SKIP_WARMUP")?
                    .unwrap_or(false),
            },
        };

        let batch_concurrency = vars.parsed::<usize>("BATCH_CONCURRENCY")?.unwrap_or(1);
        if batch_concurrency == 0 {
            return Err(ConfigError::InvalidValue("BATCH_CONCURRENCY".into()));
        }

        let timeout = vars
            .parsed::<u64>(service.timeout_variable())?
            .map(Duration::from_millis)
            .unwrap_or_else(|| service.default_timeout());

        Ok(Self {
            service,
            server_port: vars
                .parsed("SERVER_PORT")?
                .unwrap_or(DEFAULT_SERVER_PORT),
            batch_concurrency,
            timeout,
            backend,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config(service: ServiceKind) -> Result<&'static Config, ConfigError> {
    let config = Config::from_env(service)?;
    tracing::debug!(
        service = service.as_str(),
        server_port = config.server_port,
        batch_concurrency = config.batch_concurrency,
        timeout_ms = config.timeout.as_millis() as u64,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    CONFIG.get().ok_or(ConfigError::AlreadyInitialized)
}
