use std::env;

/// Logging settings resolved from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub json_logs: bool,
    /// Filter used when `RUST_LOG` is unset or unparsable.
    pub default_filter: String,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        Self::from_lookup(default_service_name, default_service_version, |key| {
            env::var(key).ok()
        })
    }

    pub(crate) fn from_lookup(
        default_service_name: &str,
        default_service_version: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let service_name = lookup("SERVICE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_service_name.to_string());
        let service_version = lookup("SERVICE_VERSION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_service_version.to_string());
        let environment = lookup("DEPLOYMENT_ENV").unwrap_or_else(|| "dev".into());
        let json_logs = lookup("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);
        let default_filter = lookup("LOG_LEVEL").unwrap_or_else(|| "info".into());

        Self {
            service_name,
            service_version,
            environment,
            json_logs,
            default_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_json_logs_and_info() {
        let cfg = TelemetryConfig::from_lookup("dialogs", "0.1.0", lookup(&[]));
        assert_eq!(cfg.service_name, "dialogs");
        assert_eq!(cfg.service_version, "0.1.0");
        assert_eq!(cfg.environment, "dev");
        assert!(cfg.json_logs);
        assert_eq!(cfg.default_filter, "info");
    }

    #[test]
    fn plain_formats_disable_json() {
        for format in ["text", "Pretty", "PLAIN"] {
            let cfg = TelemetryConfig::from_lookup("svc", "1", lookup(&[("LOG_FORMAT", format)]));
            assert!(!cfg.json_logs, "{format} should select plain output");
        }
    }

    #[test]
    fn env_overrides_service_identity() {
        let cfg = TelemetryConfig::from_lookup(
            "svc",
            "1",
            lookup(&[
                ("SERVICE_NAME", "prompts"),
                ("DEPLOYMENT_ENV", "prod"),
                ("LOG_LEVEL", "debug"),
            ]),
        );
        assert_eq!(cfg.service_name, "prompts");
        assert_eq!(cfg.environment, "prod");
        assert_eq!(cfg.default_filter, "debug");
    }
}
