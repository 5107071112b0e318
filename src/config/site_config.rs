use crate::core::retry::RetryPolicy;
use crate::domain::model::ContentDomain;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub api: ApiConfig,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
    pub welcome: WelcomeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Fast-fallback deadline per content domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub home_ms: u64,
    pub projects_ms: u64,
    pub experiences_ms: u64,
    pub skills_ms: u64,
    pub stats_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            home_ms: 2_000,
            projects_ms: 2_500,
            experiences_ms: 2_500,
            skills_ms: 2_500,
            stats_ms: 1_500,
        }
    }
}

impl TimeoutConfig {
    pub fn millis(&self, domain: ContentDomain) -> u64 {
        match domain {
            ContentDomain::Home => self.home_ms,
            ContentDomain::Projects => self.projects_ms,
            ContentDomain::Experiences => self.experiences_ms,
            ContentDomain::Skills => self.skills_ms,
            ContentDomain::Stats => self.stats_ms,
        }
    }
}

/// Each profile section may be partial; missing fields keep that profile's
/// own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    #[serde(deserialize_with = "standard_policy")]
    pub standard: RetryPolicy,
    #[serde(deserialize_with = "critical_policy")]
    pub critical: RetryPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RetryOverride {
    max_retries: Option<u32>,
    base_delay: Option<u64>,
    max_delay: Option<u64>,
    silent: Option<bool>,
}

impl RetryOverride {
    fn apply(self, mut policy: RetryPolicy) -> RetryPolicy {
        if let Some(max_retries) = self.max_retries {
            policy.max_retries = max_retries;
        }
        if let Some(base_delay) = self.base_delay {
            policy.base_delay = Duration::from_millis(base_delay);
        }
        if let Some(max_delay) = self.max_delay {
            policy.max_delay = Duration::from_millis(max_delay);
        }
        if let Some(silent) = self.silent {
            policy.silent = silent;
        }
        policy
    }
}

fn standard_policy<'de, D>(deserializer: D) -> std::result::Result<RetryPolicy, D::Error>
where
    D: Deserializer<'de>,
{
    RetryOverride::deserialize(deserializer).map(|overrides| overrides.apply(RetryPolicy::standard()))
}

fn critical_policy<'de, D>(deserializer: D) -> std::result::Result<RetryPolicy, D::Error>
where
    D: Deserializer<'de>,
{
    RetryOverride::deserialize(deserializer).map(|overrides| overrides.apply(RetryPolicy::critical()))
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            standard: RetryPolicy::standard(),
            critical: RetryPolicy::critical(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeConfig {
    pub first_visit_ms: u64,
    pub returning_ms: u64,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            first_visit_ms: 2_500,
            returning_ms: 1_200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `compact` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_positive_number("api.request_timeout_ms", self.api.request_timeout_ms, 1)?;

        for domain in ContentDomain::ALL {
            validate_positive_number(
                &format!("timeouts.{}_ms", domain.key()),
                self.timeouts.millis(domain),
                1,
            )?;
        }

        let policies = [
            ("standard", &self.retry.standard),
            ("critical", &self.retry.critical),
        ];
        for (name, policy) in policies {
            validate_range(&format!("retry.{}.max_retries", name), policy.max_retries, 0, 10)?;
            if policy.base_delay > policy.max_delay {
                return Err(SiteError::ConfigValidationError {
                    field: format!("retry.{}", name),
                    message: "base_delay must not exceed max_delay".to_string(),
                });
            }
        }

        if self.welcome.returning_ms > self.welcome.first_visit_ms {
            return Err(SiteError::ConfigValidationError {
                field: "welcome.returning_ms".to_string(),
                message: "returning splash must not be longer than the first-visit splash"
                    .to_string(),
            });
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(SiteError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: self.logging.format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for SiteConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.request_timeout_ms)
    }

    fn domain_timeout(&self, domain: ContentDomain) -> Duration {
        Duration::from_millis(self.timeouts.millis(domain))
    }

    fn welcome_first_visit(&self) -> Duration {
        Duration::from_millis(self.welcome.first_visit_ms)
    }

    fn welcome_returning(&self) -> Duration {
        Duration::from_millis(self.welcome.returning_ms)
    }

    fn standard_retry(&self) -> RetryPolicy {
        self.retry.standard.clone()
    }

    fn critical_retry(&self) -> RetryPolicy {
        self.retry.critical.clone()
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let toml_content = r#"
[api]
base_url = "https://portfolio.example.com/api"

[timeouts]
stats_ms = 800

[retry.critical]
max_retries = 5
base_delay = 200
max_delay = 4000
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://portfolio.example.com/api");
        assert_eq!(config.api.request_timeout_ms, 10_000);
        assert_eq!(config.domain_timeout(ContentDomain::Stats), Duration::from_millis(800));
        assert_eq!(config.domain_timeout(ContentDomain::Home), Duration::from_millis(2_000));
        assert_eq!(config.retry.critical.max_retries, 5);
        assert_eq!(config.retry.standard, RetryPolicy::standard());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_retry_sections_keep_profile_defaults() {
        let config = SiteConfig::from_toml_str(
            r#"
[retry.standard]
max_retries = 4

[retry.critical]
base_delay = 1500
"#,
        )
        .unwrap();

        assert_eq!(config.standard_retry().max_retries, 4);
        assert_eq!(config.standard_retry().base_delay, RetryPolicy::standard().base_delay);
        assert_eq!(config.standard_retry().max_delay, RetryPolicy::standard().max_delay);

        let critical = config.critical_retry();
        assert_eq!(critical.base_delay, Duration::from_millis(1_500));
        assert_eq!(critical.max_retries, RetryPolicy::critical().max_retries);
        assert_eq!(critical.max_delay, RetryPolicy::critical().max_delay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PORTFOLIO_TEST_API_URL", "https://env.example.com/api");
        let config = SiteConfig::from_toml_str(
            r#"
[api]
base_url = "${PORTFOLIO_TEST_API_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://env.example.com/api");

        let untouched = SiteConfig::substitute_env_vars("${PORTFOLIO_TEST_UNSET_VAR}").unwrap();
        assert_eq!(untouched, "${PORTFOLIO_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[welcome]\nfirst_visit_ms = 3000\nreturning_ms = 900").unwrap();

        let config = SiteConfig::from_file(file.path()).unwrap();
        assert_eq!(config.welcome_first_visit(), Duration::from_millis(3_000));
        assert_eq!(config.welcome_returning(), Duration::from_millis(900));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = SiteConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.timeouts.projects_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.retry.standard.base_delay = Duration::from_secs(10);
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.welcome.returning_ms = 5_000;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SiteConfig::from_toml_str("[api\nbase_url = 1").unwrap_err();
        assert!(matches!(err, SiteError::ConfigValidationError { .. }));
    }
}
