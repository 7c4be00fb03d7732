use std::{
    env,
    path::{Path, PathBuf},
};

use color_eyre::{eyre::eyre, Result};
use config::{ConfigError, Map};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use segment::HttpGateway;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cli::Cli;

/// Environment variable carrying the endpoint.
pub const WEBHOOK_ENV: &str = "SEGMENT_WEBHOOK_URL";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    /// Where segments are POSTed to.
    #[serde(default)]
    pub webhook_url: Option<String>,
    pub tick_rate: f64,
    pub frame_rate: f64,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = "SEGMENT_COMPOSER".to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

impl Config {
    /// Defaults, then `config.json5` / `config.toml` from the config dir, then
    /// `SEGMENT_*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(&get_config_dir(), &get_data_dir(), None)
    }

    /// Same layering as [`Config::new`] with explicit directories. `env`
    /// replaces the process environment when given.
    pub fn load(
        config_dir: &Path,
        data_dir: &Path,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("config_dir", config_dir.to_string_lossy().as_ref())?
            .set_default("tick_rate", 4.0)?
            .set_default("frame_rate", 30.0)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            debug!(dir = %config_dir.display(), "no configuration file found, using defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SEGMENT")
                .try_parsing(true)
                .source(env),
        );

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Command line flags win over every other source.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.endpoint {
            self.webhook_url = Some(endpoint.clone());
        }
        if let Some(tick_rate) = cli.tick_rate {
            self.tick_rate = tick_rate;
        }
        if let Some(frame_rate) = cli.frame_rate {
            self.frame_rate = frame_rate;
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Build the HTTP gateway for the configured endpoint.
    pub fn gateway(&self) -> Result<HttpGateway> {
        let Some(endpoint) = self.endpoint() else {
            warn!("no segment endpoint configured");
            return Err(eyre!(
                "{WEBHOOK_ENV} is not set; export it, add `webhook_url` to config.toml or pass --endpoint"
            ));
        };
        Ok(HttpGateway::new(endpoint)?)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "segments", env!("CARGO_PKG_NAME"))
}

pub fn ensure_data_dir_exists(data_dir: &Path) -> std::io::Result<()> {
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("composer-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn env_of(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_without_sources() {
        let dir = scratch_dir("defaults");
        let cfg = Config::load(&dir, &dir, env_of(&[])).unwrap();
        assert_eq!(cfg.tick_rate, 4.0);
        assert_eq!(cfg.frame_rate, 30.0);
        assert_eq!(cfg.endpoint(), None);
        assert_eq!(cfg.config.config_dir, dir);
        assert!(cfg.gateway().is_err());
    }

    #[test]
    fn endpoint_comes_from_environment() {
        let dir = scratch_dir("env");
        let cfg = Config::load(
            &dir,
            &dir,
            env_of(&[(WEBHOOK_ENV, "https://hooks.example.com/segment")]),
        )
        .unwrap();
        assert_eq!(cfg.endpoint(), Some("https://hooks.example.com/segment"));
        assert_eq!(
            cfg.gateway().unwrap().endpoint().as_str(),
            "https://hooks.example.com/segment"
        );
    }

    #[test]
    fn environment_overrides_config_file() {
        let dir = scratch_dir("file");
        std::fs::write(
            dir.join("config.toml"),
            "webhook_url = \"https://file.example.com/\"\ntick_rate = 2.0\n",
        )
        .unwrap();

        let from_file = Config::load(&dir, &dir, env_of(&[])).unwrap();
        assert_eq!(from_file.endpoint(), Some("https://file.example.com/"));
        assert_eq!(from_file.tick_rate, 2.0);

        let from_env =
            Config::load(&dir, &dir, env_of(&[(WEBHOOK_ENV, "https://env.example.com/")]))
                .unwrap();
        assert_eq!(from_env.endpoint(), Some("https://env.example.com/"));
    }

    #[test]
    fn cli_endpoint_wins() {
        let dir = scratch_dir("cli");
        let mut cfg =
            Config::load(&dir, &dir, env_of(&[(WEBHOOK_ENV, "https://env.example.com/")]))
                .unwrap();
        let cli = Cli::parse_from([
            "composer",
            "--endpoint",
            "http://localhost:8080/hook",
            "--frame-rate",
            "10",
        ]);
        cfg.apply_cli(&cli);
        assert_eq!(cfg.endpoint(), Some("http://localhost:8080/hook"));
        assert_eq!(cfg.frame_rate, 10.0);
        assert_eq!(cfg.tick_rate, 4.0);
    }

    #[test]
    fn blank_endpoint_counts_as_missing() {
        let dir = scratch_dir("blank");
        let cfg = Config::load(&dir, &dir, env_of(&[(WEBHOOK_ENV, "   ")])).unwrap();
        assert_eq!(cfg.endpoint(), None);
    }
}
