use crate::config::Config;
use crate::traffic::TrafficPolicy;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub arity: Option<usize>,
    pub seed: Option<u64>,
    pub policy: Option<TrafficPolicy>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(arity) = overrides.arity {
        info!("Overriding arity: {} -> {}", config.topology.arity, arity);
        config.topology.arity = arity;
    }

    if let Some(seed) = overrides.seed {
        info!("Overriding seed: {} -> {}", config.general.seed, seed);
        config.general.seed = seed;
    }

    if let Some(policy) = overrides.policy {
        info!("Overriding traffic policy: {:?} -> {:?}", config.traffic.policy, policy);
        config.traffic.policy = policy;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  seed: 11
topology:
  arity: 8
traffic:
  policy: stride
  stride: 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general.seed, 11);
        assert_eq!(config.topology.arity, 8);
        assert_eq!(config.traffic.policy, TrafficPolicy::Stride);
        assert_eq!(config.traffic.stride, 3);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "topology:\n  arity: 5\n").unwrap();
        assert!(load_config(temp_file.path()).is_err());

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "topology: [not, a, map]\n").unwrap();
        assert!(load_config(temp_file.path()).is_err());

        assert!(load_config(Path::new("/nonexistent/fattree.yaml")).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "topology:\n  arity: 4\n").unwrap();
        let mut config = load_config(temp_file.path()).unwrap();

        let overrides = CliOverrides {
            arity: Some(6),
            seed: Some(99),
            policy: Some(TrafficPolicy::HalfDuplex),
        };
        apply_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.topology.arity, 6);
        assert_eq!(config.general.seed, 99);
        assert_eq!(config.traffic.policy, TrafficPolicy::HalfDuplex);

        // Overrides are validated like the file itself.
        let bad = CliOverrides { arity: Some(7), ..Default::default() };
        assert!(apply_overrides(&mut config, &bad).is_err());
    }
}
