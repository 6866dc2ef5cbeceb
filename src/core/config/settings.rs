use super::parsing::{
    env_optional, env_or_default, is_supported_attachment_extension, parse_bool, parse_environment,
    parse_string_list, parse_u64,
};
use super::types::{
    AdminSettings, ConfigError, PortalSettings, RuntimeSettings, Settings, StoreSettings,
    TelemetrySettings,
};

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("BAGRUT_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("BAGRUT_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Bagrut Portal");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let locale = env_or_default("PORTAL_LOCALE", "he");

        let data_dir = env_or_default("BAGRUT_DATA_DIR", "data");
        let blob_quota_mb = parse_u64("BLOB_QUOTA_MB", env_or_default("BLOB_QUOTA_MB", "5"))?;
        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let allowed_attachment_extensions = parse_string_list(
            env_optional("ALLOWED_ATTACHMENT_EXTENSIONS"),
            &["jpg", "jpeg", "png", "pdf"],
        );

        let first_admin_email = env_or_default("FIRST_ADMIN_EMAIL", "admin@bagrut.local");
        let first_admin_password = env_or_default("FIRST_ADMIN_PASSWORD", "");

        let log_level = env_or_default("BAGRUT_LOG_LEVEL", "info");
        let json = env_optional("BAGRUT_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            portal: PortalSettings { project_name, version, locale },
            store: StoreSettings {
                data_dir,
                blob_quota_mb,
                max_upload_size_mb,
                allowed_attachment_extensions,
            },
            admin: AdminSettings { first_admin_email, first_admin_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn portal(&self) -> &PortalSettings {
        &self.portal
    }

    pub fn store(&self) -> &StoreSettings {
        &self.store
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.allowed_attachment_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_ATTACHMENT_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.store.allowed_attachment_extensions {
            if !is_supported_attachment_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_ATTACHMENT_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.store.blob_quota_mb == 0 {
            return Err(ConfigError::InvalidValue { field: "BLOB_QUOTA_MB", value: "0".into() });
        }

        if self.store.max_upload_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_UPLOAD_SIZE_MB",
                value: "0".into(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.admin.first_admin_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_ADMIN_PASSWORD"));
        }

        Ok(())
    }
}
