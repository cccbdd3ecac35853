//! Configuration loading and the quiz service factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizengine_core::model::{Difficulty, QuizRequest};
use quizengine_core::session::EngineConfig;
use quizengine_core::traits::{QuizGenerator, QuizScorer};

use crate::http::{HttpQuizService, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::offline::OfflineQuizService;

/// Environment variable replacing the HTTP base URL.
pub const BASE_URL_ENV: &str = "QUIZENGINE_BASE_URL";

/// File name searched for in the current directory.
pub const CONFIG_FILE_NAME: &str = "quizengine.toml";

/// Starter configuration written by `quizengine init`.
pub const STARTER_CONFIG: &str = r#"# quizengine configuration

[service]
# "http" talks to a quiz backend; "offline" uses the built-in sample bank.
type = "http"
base_url = "http://localhost:8080"
timeout_secs = 30

# [service]
# type = "offline"

[defaults]
difficulty = "medium"
question_count = 10
# 0 means untimed.
time_limit_minutes = 0

[limits]
max_questions = 20
max_time_limit_minutes = 120
# Send the question list with each submission for stateless backends.
echo_questions = true
"#;

/// Which backend provides quizzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceConfig {
    Http {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Offline,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig::Http {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Settings used when the caller does not specify them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefaults {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    /// 0 means untimed.
    #[serde(default)]
    pub time_limit_minutes: u32,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            question_count: default_question_count(),
            time_limit_minutes: 0,
        }
    }
}

fn default_question_count() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_questions")]
    pub max_questions: u32,
    #[serde(default = "default_max_time_limit")]
    pub max_time_limit_minutes: u32,
    #[serde(default = "default_echo_questions")]
    pub echo_questions: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_questions: default_max_questions(),
            max_time_limit_minutes: default_max_time_limit(),
            echo_questions: default_echo_questions(),
        }
    }
}

fn default_max_questions() -> u32 {
    20
}
fn default_max_time_limit() -> u32 {
    120
}
fn default_echo_questions() -> bool {
    true
}

/// Top-level quizengine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizEngineConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub defaults: QuizDefaults,
    #[serde(default)]
    pub limits: Limits,
}

impl QuizEngineConfig {
    /// Controller settings derived from `limits`.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_questions: self.limits.max_questions,
            max_time_limit_minutes: self.limits.max_time_limit_minutes,
            echo_questions: self.limits.echo_questions,
        }
    }

    /// A request for `topic` filled in from `defaults`.
    pub fn default_request(&self, topic: impl Into<String>) -> QuizRequest {
        QuizRequest::new(topic)
            .with_difficulty(self.defaults.difficulty)
            .with_question_count(self.defaults.question_count)
            .with_time_limit_minutes(self.defaults.time_limit_minutes)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Applies the base URL override and expands `${VAR}` references.
fn apply_overrides(mut config: QuizEngineConfig, base_url_override: Option<String>) -> QuizEngineConfig {
    if let ServiceConfig::Http { base_url, .. } = &mut config.service {
        if let Some(url) = base_url_override.filter(|u| !u.trim().is_empty()) {
            *base_url = url;
        }
        *base_url = resolve_env_vars(base_url);
    }
    config
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizengine.toml` in the current directory
/// 2. `~/.config/quizengine/config.toml`
///
/// `QUIZENGINE_BASE_URL` overrides the HTTP base URL.
pub fn load_config() -> Result<QuizEngineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizEngineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            toml::from_str::<QuizEngineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizEngineConfig::default(),
    };

    Ok(apply_overrides(config, std::env::var(BASE_URL_ENV).ok()))
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizengine"))
}

/// Generator and scorer pair built from a [`ServiceConfig`].
pub struct QuizServices {
    pub generator: Arc<dyn QuizGenerator>,
    pub scorer: Arc<dyn QuizScorer>,
}

/// Create the quiz service described by `config`.
pub fn create_service(config: &ServiceConfig) -> Result<QuizServices> {
    match config {
        ServiceConfig::Http {
            base_url,
            timeout_secs,
        } => {
            let service = Arc::new(
                HttpQuizService::with_timeout(base_url, *timeout_secs)
                    .context("failed to create HTTP quiz service")?,
            );
            Ok(QuizServices {
                generator: service.clone(),
                scorer: service,
            })
        }
        ServiceConfig::Offline => {
            let service = Arc::new(OfflineQuizService::new());
            Ok(QuizServices {
                generator: service.clone(),
                scorer: service,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZENGINE_TEST_HOST", "quiz.internal");
        assert_eq!(
            resolve_env_vars("http://${_QUIZENGINE_TEST_HOST}:8080"),
            "http://quiz.internal:8080"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_QUIZENGINE_TEST_HOST");
    }

    #[test]
    fn default_config() {
        let config = QuizEngineConfig::default();
        assert_eq!(
            config.service,
            ServiceConfig::Http {
                base_url: "http://localhost:8080".into(),
                timeout_secs: 30
            }
        );
        assert_eq!(config.defaults.question_count, 10);
        assert_eq!(config.limits.max_questions, 20);
        assert!(config.limits.echo_questions);
    }

    #[test]
    fn starter_config_parses() {
        let config: QuizEngineConfig = toml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(config, QuizEngineConfig::default());
    }

    #[test]
    fn parse_offline_service() {
        let toml_str = r#"
[service]
type = "offline"

[defaults]
difficulty = "hard"
question_count = 5
time_limit_minutes = 15
"#;
        let config: QuizEngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service, ServiceConfig::Offline);
        let request = config.default_request("History");
        assert_eq!(request.difficulty, Difficulty::Hard);
        assert_eq!(request.question_count, 5);
        assert_eq!(request.time_limit_minutes, 15);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn engine_config_follows_limits() {
        let mut config = QuizEngineConfig::default();
        config.limits.max_questions = 8;
        config.limits.echo_questions = false;
        let engine = config.engine_config();
        assert_eq!(engine.max_questions, 8);
        assert_eq!(engine.max_time_limit_minutes, 120);
        assert!(!engine.echo_questions);
    }

    #[test]
    fn base_url_override_applies_to_http_only() {
        let config = apply_overrides(
            QuizEngineConfig::default(),
            Some("http://override:9000".into()),
        );
        assert!(matches!(
            config.service,
            ServiceConfig::Http { ref base_url, .. } if base_url == "http://override:9000"
        ));

        let offline = QuizEngineConfig {
            service: ServiceConfig::Offline,
            ..Default::default()
        };
        let config = apply_overrides(offline, Some("http://override:9000".into()));
        assert_eq!(config.service, ServiceConfig::Offline);
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[service]\ntype = \"http\"\nbase_url = \"http://example.test\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.defaults, QuizDefaults::default());
        assert!(matches!(config.service, ServiceConfig::Http { timeout_secs: 30, .. }));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizengine.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_toml_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[service\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }

    #[test]
    fn offline_factory_builds_both_roles() {
        let services = create_service(&ServiceConfig::Offline).unwrap();
        assert_eq!(services.generator.name(), "offline");
        let _scorer = services.scorer;
    }
}
