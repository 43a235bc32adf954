use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use iflow_tools_core::ToolsConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult, ErrorContext};
use crate::paths;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "IFLOW_TOOLS_CONFIG";

/// Prefix of environment variables overriding config keys
pub const ENV_PREFIX: &str = "IFLOW_TOOLS_";

/// Locates and loads the YAML configuration file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for a known file
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Find the config file for this process
    ///
    /// Priority: explicit `--config`, then `IFLOW_TOOLS_CONFIG`, then
    /// `iflow-tools.yaml`/`iflow-tools.yml` in the current directory, then the
    /// per-user config file.
    pub fn locate(explicit: Option<&Path>) -> CliResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| CliError::from_io_error(e, "."))?;
        let env_value = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::locate_from(
            explicit,
            env_value.as_deref(),
            &cwd,
            paths::get_user_config_path(),
        )
    }

    /// Lookup with every input passed in explicitly
    pub fn locate_from(
        explicit: Option<&Path>,
        env_value: Option<&Path>,
        cwd: &Path,
        user_config: Option<PathBuf>,
    ) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::existing(cwd, path, "--config");
        }

        if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
            return Self::existing(cwd, path, CONFIG_ENV);
        }

        let mut searched = Vec::new();
        for candidate in paths::local_config_candidates(cwd)
            .into_iter()
            .chain(user_config)
        {
            if candidate.is_file() {
                log::debug!("Using config file {}", candidate.display());
                return Ok(Self::with_path(candidate));
            }
            searched.push(candidate);
        }

        let mut error = CliError::filesystem("No configuration file found");
        for path in &searched {
            error = error.with_context("searched", &path.display().to_string());
        }
        Err(error.with_suggestion("Pass the config file with -c <config-file>"))
    }

    fn existing(cwd: &Path, path: &Path, source: &str) -> CliResult<Self> {
        let path = cwd.join(path);
        if path.is_file() {
            log::debug!("Using config file {} (from {source})", path.display());
            Ok(Self::with_path(path))
        } else {
            Err(
                CliError::filesystem(&format!("Config file not found: {}", path.display()))
                    .with_context("from", source),
            )
        }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    /// Directory relative paths in the file are anchored at
    pub fn config_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(Path::new("."))
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<ToolsConfig> {
        let content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file {}", self.config_path.display())
        })?;

        // Layer 1: Defaults
        let mut figment = Figment::new().merge(Serialized::defaults(ToolsConfig::default()));

        // Layer 2: Config file (an empty file means "all defaults")
        if !content.trim().is_empty() {
            figment = figment.merge(Yaml::string(&content));
        }

        // Layer 3: Environment variables
        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

        figment.extract().with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.config_path.display()
            )
        })
    }

    /// Load and anchor relative paths at the config file's directory
    pub fn load_resolved(&self) -> CliResult<ToolsConfig> {
        let config = self
            .load()
            .map_err(|e| CliError::misuse(&format!("{e:#}")))?;
        let resolved = config.resolve(self.config_dir())?;
        log::debug!("Resolved configuration: {resolved:?}");
        Ok(resolved)
    }
}
