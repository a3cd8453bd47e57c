use tracing::{debug, info};

use crate::{
    error::{Result, SimError},
    island::{Island, Placement},
    params::{LandscapeOverrides, Parameters, SpeciesOverrides},
    rng::RngManager,
    snapshot::{self, CellSnapshot, IslandSnapshot, SpeciesCounts},
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub name: String,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    params: Parameters,
    map: Option<String>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            params: Parameters::default(),
            map: None,
        }
    }

    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }

    pub fn with_parameters(mut self, params: Parameters) -> Self {
        self.params = params;
        self
    }

    pub fn build(self) -> Result<Engine> {
        self.params.validate()?;
        let island = self
            .map
            .as_deref()
            .map(|map| Island::from_map(map, self.params.clone()))
            .transpose()?;
        Ok(Engine {
            rng: RngManager::new(self.settings.seed),
            island,
            params: self.params,
            year: 0,
            settings: self.settings,
        })
    }
}

/// Owns one island and advances it a year at a time.
pub struct Engine {
    rng: RngManager,
    island: Option<Island>,
    params: Parameters,
    year: u64,
    settings: EngineSettings,
}

impl Engine {
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn year(&self) -> u64 {
        self.year
    }

    /// Builds the island from map text, replacing any previous one and
    /// restarting the year count.
    pub fn load_map(&mut self, map: &str) -> Result<()> {
        self.island = Some(Island::from_map(map, self.params.clone())?);
        self.year = 0;
        Ok(())
    }

    pub fn island(&self) -> Result<&Island> {
        self.island
            .as_ref()
            .ok_or_else(|| SimError::state("no island map has been loaded"))
    }

    fn island_mut(&mut self) -> Result<&mut Island> {
        self.island
            .as_mut()
            .ok_or_else(|| SimError::state("no island map has been loaded"))
    }

    pub fn set_species_parameters(&mut self, species: &str, overrides: &SpeciesOverrides) -> Result<()> {
        let mut params = self.params.clone();
        params.set_species(species, overrides)?;
        self.apply_parameters(params)
    }

    pub fn set_landscape_parameters(&mut self, code: &str, overrides: &LandscapeOverrides) -> Result<()> {
        let mut params = self.params.clone();
        params.set_landscape(code, overrides)?;
        self.apply_parameters(params)
    }

    fn apply_parameters(&mut self, params: Parameters) -> Result<()> {
        if let Some(island) = self.island.as_mut() {
            island.set_parameters(params.clone())?;
        }
        self.params = params;
        Ok(())
    }

    pub fn add_population(&mut self, placements: &[Placement]) -> Result<()> {
        self.island_mut()?.add_population(placements)
    }

    pub fn run(&mut self, years: u64) -> Result<()> {
        self.run_with_hook(years, |_| {})
    }

    /// Runs `years` annual cycles, handing the hook a snapshot after each.
    pub fn run_with_hook<F>(&mut self, years: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&IslandSnapshot),
    {
        let island = self
            .island
            .as_mut()
            .ok_or_else(|| SimError::state("cannot run before an island map is loaded"))?;
        info!(
            name = %self.settings.name,
            seed = self.rng.seed(),
            start_year = self.year,
            years,
            "simulation started"
        );
        for _ in 0..years {
            let report = island.annual_cycle(&mut self.rng);
            self.year += 1;
            let counts = island.species_counts();
            debug!(
                year = self.year,
                herbivores = counts.herbivores,
                carnivores = counts.carnivores,
                born = report.born,
                killed = report.killed,
                migrated = report.migrated,
                died = report.died,
                "year complete"
            );
            hook(&IslandSnapshot::capture(&self.settings.name, self.year, island));
        }
        info!(
            name = %self.settings.name,
            year = self.year,
            animals = island.num_animals(),
            "simulation finished"
        );
        Ok(())
    }

    pub fn num_animals(&self) -> Result<usize> {
        Ok(self.island()?.num_animals())
    }

    pub fn num_animals_per_species(&self) -> Result<SpeciesCounts> {
        Ok(self.island()?.species_counts())
    }

    pub fn animal_distribution(&self) -> Result<Vec<CellSnapshot>> {
        Ok(snapshot::distribution(self.island()?))
    }

    pub fn snapshot(&self) -> Result<IslandSnapshot> {
        Ok(IslandSnapshot::capture(
            &self.settings.name,
            self.year,
            self.island()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::Species;
    use crate::island::Coord;

    fn settings() -> EngineSettings {
        EngineSettings {
            name: "unit".into(),
            seed: 3,
        }
    }

    #[test]
    fn operations_before_map_are_state_errors() {
        let mut engine = EngineBuilder::new(settings()).build().unwrap();
        let placement = [Placement::new(Coord::new(1, 1), Species::Herbivore, 1, 10.0)];
        assert!(matches!(engine.add_population(&placement), Err(SimError::State(_))));
        assert!(matches!(engine.run(1), Err(SimError::State(_))));
        assert!(matches!(engine.num_animals(), Err(SimError::State(_))));

        engine.load_map("OOO\nOJO\nOOO").unwrap();
        engine.add_population(&placement).unwrap();
        assert_eq!(engine.num_animals().unwrap(), 1);
    }

    #[test]
    fn parameters_set_before_map_reach_the_island() {
        let mut engine = EngineBuilder::new(settings()).build().unwrap();
        engine
            .set_landscape_parameters(
                "J",
                &LandscapeOverrides {
                    f_max: Some(500.0),
                    alpha: None,
                },
            )
            .unwrap();
        engine.load_map("OOO\nOJO\nOOO").unwrap();
        let fodder = engine.island().unwrap().cell(Coord::new(1, 1)).unwrap().fodder();
        assert_eq!(fodder, 500.0);
    }

    #[test]
    fn rejected_parameters_change_nothing() {
        let mut engine = EngineBuilder::new(settings())
            .with_map("OOO\nOJO\nOOO")
            .build()
            .unwrap();
        let bad = SpeciesOverrides {
            omega: Some(-0.5),
            ..Default::default()
        };
        assert!(engine.set_species_parameters("Herbivore", &bad).is_err());
        assert!(engine.set_species_parameters("Dragon", &SpeciesOverrides::default()).is_err());
        assert_eq!(engine.parameters(), &Parameters::default());
        assert_eq!(engine.island().unwrap().parameters(), &Parameters::default());
    }

    #[test]
    fn year_counter_advances() {
        let mut engine = EngineBuilder::new(settings())
            .with_map("OOO\nOJO\nOOO")
            .build()
            .unwrap();
        engine.run(3).unwrap();
        engine.run(2).unwrap();
        assert_eq!(engine.year(), 5);
        assert_eq!(engine.snapshot().unwrap().year, 5);

        engine.load_map("OOOO\nOJSO\nOOOO").unwrap();
        assert_eq!(engine.year(), 0);
        assert_eq!(engine.snapshot().unwrap().year, 0);
    }

    #[test]
    fn builder_rejects_invalid_fodder_parameters() {
        let mut params = Parameters::default();
        params.jungle.f_max = -10.0;
        let result = EngineBuilder::new(settings())
            .with_map("OOO\nOJO\nOOO")
            .with_parameters(params)
            .build();
        assert!(matches!(result, Err(SimError::Configuration(_))));

        let mut params = Parameters::default();
        params.savannah.alpha = 1.5;
        let result = EngineBuilder::new(settings())
            .with_parameters(params)
            .build();
        assert!(matches!(result, Err(SimError::Configuration(_))));
    }
}
