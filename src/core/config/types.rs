use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub(super) runtime: RuntimeSettings,
    pub(super) portal: PortalSettings,
    pub(super) store: StoreSettings,
    pub(super) admin: AdminSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub project_name: String,
    pub version: String,
    pub locale: String,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub data_dir: String,
    pub blob_quota_mb: u64,
    pub max_upload_size_mb: u64,
    pub allowed_attachment_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub first_admin_email: String,
    pub first_admin_password: String,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
    pub prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub environment: Environment,
    pub strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl StoreSettings {
    pub fn blob_quota_bytes(&self) -> u64 {
        self.blob_quota_mb * 1024 * 1024
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}
