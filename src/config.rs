use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use crate::models::{
    default_candidate_fields, default_levels, default_sponsor_fields, default_stop_words,
    AffiliationSource, MatchingParams, ProfileField, ScoringParams, SolverKind,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub seniority: SenioritySettings,
    #[serde(default)]
    pub profile: ProfileSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_candidates")]
    pub max_candidates_per_sponsor: usize,
    #[serde(default)]
    pub restrict_timezone: bool,
    #[serde(default = "default_timezone_gap")]
    pub max_timezone_gap_hours: i32,
    #[serde(default)]
    pub solver: SolverKind,
    #[serde(default)]
    pub affiliation_source: AffiliationSource,
    #[serde(default = "default_skip_levels")]
    pub skip_candidate_levels: Vec<String>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_candidates_per_sponsor: default_max_candidates(),
            restrict_timezone: false,
            max_timezone_gap_hours: default_timezone_gap(),
            solver: SolverKind::default(),
            affiliation_source: AffiliationSource::default(),
            skip_candidate_levels: default_skip_levels(),
        }
    }
}

fn default_max_candidates() -> usize { 2 }
fn default_timezone_gap() -> i32 { 5 }
fn default_skip_levels() -> Vec<String> { vec!["Predoctoral".to_string()] }

/// Seniority ladder: level name → rank, higher outranks lower
#[derive(Debug, Clone, Deserialize)]
pub struct SenioritySettings {
    #[serde(default = "default_levels")]
    pub levels: BTreeMap<String, u8>,
}

impl Default for SenioritySettings {
    fn default() -> Self {
        Self { levels: default_levels() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSettings {
    #[serde(default = "default_sponsor_fields")]
    pub sponsor_fields: Vec<ProfileField>,
    #[serde(default = "default_candidate_fields")]
    pub candidate_fields: Vec<ProfileField>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            sponsor_fields: default_sponsor_fields(),
            candidate_fields: default_candidate_fields(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    pub max_document_frequency: Option<f64>,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            min_token_len: default_min_token_len(),
            max_document_frequency: None,
            stop_words: default_stop_words(),
        }
    }
}

fn default_min_token_len() -> usize { 2 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MENTOR__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MENTOR__MATCHING__RESTRICT_TIMEZONE -> matching.restrict_timezone
            .add_source(
                Environment::with_prefix("MENTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MENTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from TOML text, without consulting the environment
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Engine parameters described by these settings
    pub fn matching_params(&self) -> MatchingParams {
        MatchingParams {
            max_candidates_per_sponsor: self.matching.max_candidates_per_sponsor,
            restrict_timezone: self.matching.restrict_timezone,
            max_timezone_gap_hours: self.matching.max_timezone_gap_hours,
            solver: self.matching.solver,
            affiliation_source: self.matching.affiliation_source,
            skip_candidate_levels: self.matching.skip_candidate_levels.clone(),
            levels: self.seniority.levels.clone(),
            sponsor_fields: self.profile.sponsor_fields.clone(),
            candidate_fields: self.profile.candidate_fields.clone(),
            scoring: ScoringParams {
                min_token_len: self.scoring.min_token_len,
                max_document_frequency: self.scoring.max_document_frequency,
                stop_words: self.scoring.stop_words.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        let params = settings.matching_params();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(params.max_candidates_per_sponsor, 2);
        assert_eq!(params.max_timezone_gap_hours, 5);
        assert!(!params.restrict_timezone);
        assert_eq!(params.solver, SolverKind::Optimal);
        assert_eq!(params.levels.get("Professor"), Some(&7));
    }

    #[test]
    fn test_overrides_from_toml() {
        let settings = Settings::from_toml_str(
            r#"
            [matching]
            max_candidates_per_sponsor = 4
            restrict_timezone = true
            solver = "greedy"
            affiliation_source = "email_domain"

            [seniority.levels]
            "Junior" = 1
            "Senior" = 2

            [[profile.sponsor_fields]]
            field = "topic"

            [[profile.candidate_fields]]
            field = "topic"
            repeat = 3
            "#,
        )
        .unwrap();
        let params = settings.matching_params();

        assert_eq!(params.max_candidates_per_sponsor, 4);
        assert!(params.restrict_timezone);
        assert_eq!(params.solver, SolverKind::Greedy);
        assert_eq!(params.affiliation_source, AffiliationSource::EmailDomain);
        assert_eq!(params.levels.len(), 2);
        assert_eq!(params.sponsor_fields, vec![ProfileField::new("topic", 1)]);
        assert_eq!(params.candidate_fields, vec![ProfileField::new("topic", 3)]);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }
}
