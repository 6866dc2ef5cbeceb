mod parsing;
mod settings;
mod types;

pub use types::{
    AdminSettings, ConfigError, Environment, PortalSettings, RuntimeSettings, Settings,
    StoreSettings, TelemetrySettings,
};
