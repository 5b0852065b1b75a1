use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub schema: SchemaConfig,
    pub rebuild: RebuildConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Hard ceiling on component nesting while expanding blueprints
    pub max_component_depth: u32,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildConfig {
    /// Maximum in-flight rebuild tasks per schema change
    pub concurrency: usize,
    pub log_degradations: bool,
    pub slow_rebuild_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub default_locale: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Schema overrides
        if let Ok(v) = env::var("SCHEMA_MAX_COMPONENT_DEPTH") {
            self.schema.max_component_depth = v.parse().unwrap_or(self.schema.max_component_depth);
        }
        if let Ok(v) = env::var("SCHEMA_DEBUG_LOGGING") {
            self.schema.debug_logging = v.parse().unwrap_or(self.schema.debug_logging);
        }

        // Rebuild overrides
        if let Ok(v) = env::var("REBUILD_CONCURRENCY") {
            self.rebuild.concurrency = v.parse().unwrap_or(self.rebuild.concurrency);
        }
        if let Ok(v) = env::var("REBUILD_LOG_DEGRADATIONS") {
            self.rebuild.log_degradations = v.parse().unwrap_or(self.rebuild.log_degradations);
        }
        if let Ok(v) = env::var("REBUILD_SLOW_THRESHOLD_MS") {
            self.rebuild.slow_rebuild_threshold_ms =
                v.parse().unwrap_or(self.rebuild.slow_rebuild_threshold_ms);
        }

        // Locale overrides
        if let Ok(v) = env::var("LOCALE_DEFAULT") {
            self.locale.default_locale = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            schema: SchemaConfig {
                max_component_depth: 16,
                debug_logging: true,
            },
            rebuild: RebuildConfig {
                concurrency: 4,
                log_degradations: true,
                slow_rebuild_threshold_ms: 100,
            },
            locale: LocaleConfig {
                default_locale: "en".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            schema: SchemaConfig {
                max_component_depth: 16,
                debug_logging: false,
            },
            rebuild: RebuildConfig {
                concurrency: 8,
                log_degradations: true,
                slow_rebuild_threshold_ms: 500,
            },
            locale: LocaleConfig {
                default_locale: "en".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            schema: SchemaConfig {
                max_component_depth: 8,
                debug_logging: false,
            },
            rebuild: RebuildConfig {
                concurrency: 16,
                log_degradations: true,
                slow_rebuild_threshold_ms: 1000,
            },
            locale: LocaleConfig {
                default_locale: "en".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
});

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
