//! Application-level configuration loading, including the trivia timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    elimination::DEFAULT_CHECKPOINTS, players::DEFAULT_MAX_NAME_LENGTH,
    scoring::DEFAULT_BASE_POINTS,
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GAME_HUB_CONFIG_PATH";
/// Default location of the trivia question file.
const DEFAULT_QUESTIONS_PATH: &str = "data/trivia_questions.json";

/// Timings and rules of a trivia session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaSettings {
    /// Seconds the question is shown before answers open.
    pub question_display_secs: u32,
    /// Seconds players have to answer.
    pub answering_secs: u32,
    /// Seconds the results stay on screen.
    pub results_secs: u32,
    /// Seconds the leaderboard stays on screen.
    pub leaderboard_secs: u32,
    /// Show the leaderboard after every N resolved questions.
    pub leaderboard_every: usize,
    /// Answering countdown values at which one wrong option is removed.
    pub elimination_checkpoints: Vec<u32>,
    /// Points for a correct answer before the time bonus.
    pub base_points: u32,
    /// Maximum display name length.
    pub max_name_length: usize,
    /// Shuffle options once when the question bank is loaded.
    pub shuffle_options: bool,
    /// Real duration of one countdown second.
    pub tick_period: Duration,
}

impl Default for TriviaSettings {
    fn default() -> Self {
        Self {
            question_display_secs: 10,
            answering_secs: 40,
            results_secs: 5,
            leaderboard_secs: 8,
            leaderboard_every: 5,
            elimination_checkpoints: DEFAULT_CHECKPOINTS.to_vec(),
            base_points: DEFAULT_BASE_POINTS,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            shuffle_options: true,
            tick_period: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Trivia rules and timings.
    pub trivia: TriviaSettings,
    /// Question file to load at startup.
    pub questions_path: PathBuf,
    /// Optional JSON file seeding the content store.
    pub content_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            trivia: TriviaSettings::default(),
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            content_path: None,
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        questions = %app_config.questions_path.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    trivia: RawTrivia,
    questions_path: Option<PathBuf>,
    content_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the `trivia` section; absent keys keep their defaults.
struct RawTrivia {
    question_display_secs: Option<u32>,
    answering_secs: Option<u32>,
    results_secs: Option<u32>,
    leaderboard_secs: Option<u32>,
    leaderboard_every: Option<usize>,
    elimination_checkpoints: Option<Vec<u32>>,
    base_points: Option<u32>,
    max_name_length: Option<usize>,
    shuffle_options: Option<bool>,
    tick_millis: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            trivia: value.trivia.into(),
            questions_path: value.questions_path.unwrap_or(defaults.questions_path),
            content_path: value.content_path,
        }
    }
}

impl From<RawTrivia> for TriviaSettings {
    fn from(value: RawTrivia) -> Self {
        let defaults = TriviaSettings::default();
        let answering_secs = at_least_one(
            "answering_secs",
            value.answering_secs.unwrap_or(defaults.answering_secs),
        );

        let mut elimination_checkpoints = value
            .elimination_checkpoints
            .unwrap_or(defaults.elimination_checkpoints);
        elimination_checkpoints.retain(|checkpoint| {
            let inside = (1..answering_secs).contains(checkpoint);
            if !inside {
                warn!(
                    checkpoint,
                    answering_secs, "dropping elimination checkpoint outside the answering window"
                );
            }
            inside
        });

        Self {
            question_display_secs: at_least_one(
                "question_display_secs",
                value
                    .question_display_secs
                    .unwrap_or(defaults.question_display_secs),
            ),
            answering_secs,
            results_secs: at_least_one(
                "results_secs",
                value.results_secs.unwrap_or(defaults.results_secs),
            ),
            leaderboard_secs: at_least_one(
                "leaderboard_secs",
                value.leaderboard_secs.unwrap_or(defaults.leaderboard_secs),
            ),
            leaderboard_every: value
                .leaderboard_every
                .unwrap_or(defaults.leaderboard_every)
                .max(1),
            elimination_checkpoints,
            base_points: value.base_points.unwrap_or(defaults.base_points),
            max_name_length: value
                .max_name_length
                .unwrap_or(defaults.max_name_length)
                .max(1),
            shuffle_options: value.shuffle_options.unwrap_or(defaults.shuffle_options),
            tick_period: value
                .tick_millis
                .filter(|millis| *millis > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_period),
        }
    }
}

fn at_least_one(field: &'static str, value: u32) -> u32 {
    if value == 0 {
        warn!(field, "zero duration is not allowed; using 1 second");
        1
    } else {
        value
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.trivia, TriviaSettings::default());
        assert_eq!(config.questions_path, PathBuf::from(DEFAULT_QUESTIONS_PATH));
        assert_eq!(config.content_path, None);
    }

    #[test]
    fn partial_trivia_section_overrides_only_given_keys() {
        let config = AppConfig::from_json_str(
            r#"{ "trivia": { "answering_secs": 30, "base_points": 100, "tick_millis": 250 },
                 "questions_path": "custom.json" }"#,
        )
        .unwrap();
        assert_eq!(config.trivia.answering_secs, 30);
        assert_eq!(config.trivia.base_points, 100);
        assert_eq!(config.trivia.tick_period, Duration::from_millis(250));
        assert_eq!(config.trivia.question_display_secs, 10);
        assert_eq!(config.trivia.elimination_checkpoints, vec![25, 10]);
        assert_eq!(config.questions_path, PathBuf::from("custom.json"));
    }

    #[test]
    fn checkpoints_outside_answering_window_are_dropped() {
        let config = AppConfig::from_json_str(
            r#"{ "trivia": { "answering_secs": 20, "elimination_checkpoints": [25, 20, 12, 0, 5] } }"#,
        )
        .unwrap();
        assert_eq!(config.trivia.elimination_checkpoints, vec![12, 5]);
    }

    #[test]
    fn zero_durations_are_raised() {
        let config = AppConfig::from_json_str(
            r#"{ "trivia": { "question_display_secs": 0, "results_secs": 0, "leaderboard_every": 0, "tick_millis": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.trivia.question_display_secs, 1);
        assert_eq!(config.trivia.results_secs, 1);
        assert_eq!(config.trivia.leaderboard_every, 1);
        assert_eq!(config.trivia.tick_period, Duration::from_secs(1));
    }
}
