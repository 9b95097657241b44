//! Configurable objects.
use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// A configuration that can be stored in and loaded from a yaml file.
pub trait Configurable: Serialize + DeserializeOwned + Sized {
    /// Loads the configuration from the yaml file of the given path.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves the configuration to the yaml file of the given path.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempdir::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct SimConfig {
        dt: f64,
        substeps: usize,
        gravity: [f64; 3],
    }

    impl Configurable for SimConfig {}

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new("configurable")?;
        let path = dir.path().join("sim.yaml");
        let config = SimConfig {
            dt: 0.004,
            substeps: 4,
            gravity: [0.0, 0.0, -9.81],
        };

        config.save(&path)?;
        assert_eq!(SimConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SimConfig::load("/nonexistent/sim.yaml").is_err());
    }
}
