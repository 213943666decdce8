use crate::application::retry::RetryPolicy;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard";
pub const ENV_PREFIX: &str = "CELERY_DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub aws: AwsSettings,
    pub retry: RetrySettings,
    pub layout: LayoutSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AwsSettings {
    pub region: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl AwsSettings {
    /// Custom endpoint (e.g. LocalStack); blank values mean the AWS default
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrySettings {
    pub max_tries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_tries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    pub width: u32,
    pub period: u32,
    #[serde(default)]
    pub right_axis_queues: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            width: 24,
            period: 60,
            right_axis_queues: vec![
                "edx.lms.core.ace".to_string(),
                "edx.lms.core.background_process".to_string(),
            ],
        }
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Defaults, then the optional file at `path`, then `CELERY_DASHBOARD_*` variables
pub fn load_config_from(path: &str) -> anyhow::Result<AppConfig> {
    load_config_with(path, environment())
}

/// `CELERY_DASHBOARD_RETRY__MAX_TRIES=5`; list keys take comma separated values,
/// e.g. `CELERY_DASHBOARD_LAYOUT__RIGHT_AXIS_QUEUES=edx.lms.core.ace,edx.lms.core.high`
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("layout.right_axis_queues")
}

fn load_config_with(path: &str, environment: config::Environment) -> anyhow::Result<AppConfig> {
    let layout = LayoutSettings::default();

    let settings = config::Config::builder()
        .set_default("aws.region", "us-east-1")?
        .set_default("retry.max_tries", 3)?
        .set_default("retry.base_delay_ms", 500)?
        .set_default("retry.max_delay_ms", 8000)?
        .set_default("layout.width", layout.width as i64)?
        .set_default("layout.period", layout.period as i64)?
        .set_default("layout.right_axis_queues", layout.right_axis_queues)?
        .add_source(config::File::with_name(path).required(false))
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let config = load_config_from("config/does-not-exist").unwrap();

        assert_eq!(config.layout.width, 24);
        assert_eq!(config.layout.period, 60);
        assert_eq!(
            config.layout.right_axis_queues,
            vec!["edx.lms.core.ace", "edx.lms.core.background_process"]
        );
        assert_eq!(config.retry.policy(), RetryPolicy::default());
    }

    #[test]
    fn test_environment_overrides() {
        let mut vars = config::Map::new();
        vars.insert(
            "CELERY_DASHBOARD_LAYOUT__RIGHT_AXIS_QUEUES".to_string(),
            "edx.lms.core.ace,edx.lms.core.high".to_string(),
        );
        vars.insert("CELERY_DASHBOARD_RETRY__MAX_TRIES".to_string(), "1".to_string());
        vars.insert("CELERY_DASHBOARD_AWS__REGION".to_string(), "eu-west-1".to_string());

        let config =
            load_config_with("config/does-not-exist", environment().source(Some(vars))).unwrap();

        assert_eq!(
            config.layout.right_axis_queues,
            vec!["edx.lms.core.ace", "edx.lms.core.high"]
        );
        assert_eq!(config.retry.max_tries, 1);
        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.layout.width, 24);
    }

    #[test]
    fn test_blank_endpoint_is_ignored() {
        let aws = AwsSettings {
            region: "us-east-1".to_string(),
            endpoint_url: Some("  ".to_string()),
        };
        assert_eq!(aws.endpoint(), None);

        let aws = AwsSettings {
            endpoint_url: Some("http://localhost:4566".to_string()),
            ..aws
        };
        assert_eq!(aws.endpoint(), Some("http://localhost:4566"));
    }
}
