use crate::config::AnalysisConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and validate an analysis configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<AnalysisConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: AnalysisConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise fall back to defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<AnalysisConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using built-in defaults");
            Ok(AnalysisConfig::default())
        }
    }
}

/// CLI arguments that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub record_limit: Option<usize>,
    pub removal_count: Option<usize>,
    pub sort_by_timestamp: bool,
    pub exact_betweenness: bool,
}

/// Apply CLI overrides to a configuration and re-validate
pub fn apply_overrides(config: &mut AnalysisConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(limit) = overrides.record_limit {
        info!("Record limit overridden to {}", limit);
        config.record_limit = if limit == 0 { None } else { Some(limit) };
    }

    if let Some(count) = overrides.removal_count {
        info!("Removal count overridden to {}", count);
        config.removal_count = count;
    }

    if overrides.sort_by_timestamp {
        info!("Messages will be sorted by timestamp before reply matching");
        config.sort_by_timestamp = true;
    }

    if overrides.exact_betweenness {
        info!("Using exact betweenness centrality");
        config.betweenness_sample_size = None;
    }

    config.validate()?;

    Ok(())
}
