use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    animal::Species,
    engine::{Engine, EngineBuilder, EngineSettings},
    error,
    island::{Coord, Placement},
    params::{LandscapeOverrides, Parameters, SpeciesOverrides},
};

fn default_years() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub years: Option<u64>,
    pub map: String,
    /// Parameter overrides keyed by species name.
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesOverrides>,
    /// Parameter overrides keyed by landscape code.
    #[serde(default)]
    pub landscapes: BTreeMap<String, LandscapeOverrides>,
    #[serde(default)]
    pub populations: Vec<ScenarioPopulation>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioPopulation {
    /// `[row, col]`, zero-based.
    pub loc: [usize; 2],
    pub pop: Vec<ScenarioAnimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioAnimal {
    pub species: Species,
    #[serde(default)]
    pub age: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Parameter table with this scenario's overrides applied to the defaults.
    pub fn parameters(&self) -> error::Result<Parameters> {
        let mut params = Parameters::default();
        for (name, overrides) in &self.species {
            params.set_species(name, overrides)?;
        }
        for (code, overrides) in &self.landscapes {
            params.set_landscape(code, overrides)?;
        }
        Ok(params)
    }

    pub fn placements(&self) -> Vec<Placement> {
        self.populations
            .iter()
            .flat_map(|group| {
                let loc = Coord::new(group.loc[0], group.loc[1]);
                group
                    .pop
                    .iter()
                    .map(move |a| Placement::new(loc, a.species, a.age, a.weight))
            })
            .collect()
    }

    /// Builds a seeded engine with the map loaded and the initial population placed.
    pub fn build_engine(&self) -> error::Result<Engine> {
        let settings = EngineSettings {
            name: self.name.clone(),
            seed: self.seed,
        };
        let mut engine = EngineBuilder::new(settings)
            .with_parameters(self.parameters()?)
            .with_map(self.map.as_str())
            .build()?;
        engine.add_population(&self.placements())?;
        Ok(engine)
    }

    pub fn years(&self, override_years: Option<u64>) -> u64 {
        override_years.or(self.years).unwrap_or_else(default_years)
    }
}
