//! The island grid and the ordered annual cycle.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animal::{Animal, Species};
use crate::cell::Cell;
use crate::error::{Result, SimError};
use crate::landscape::Landscape;
use crate::params::Parameters;
use crate::rng::RngManager;
use crate::snapshot::SpeciesCounts;

/// Zero-based grid position; row 0 is the first map line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One animal to be seeded onto the island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub loc: Coord,
    pub species: Species,
    pub age: u32,
    pub weight: f64,
}

impl Placement {
    pub fn new(loc: Coord, species: Species, age: u32, weight: f64) -> Self {
        Self {
            loc,
            species,
            age,
            weight,
        }
    }
}

/// What happened during one annual cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub killed: usize,
    pub born: usize,
    pub migrated: usize,
    pub died: usize,
}

pub struct Island {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    params: Parameters,
}

impl Island {
    /// Builds the grid from a rectangular block of landscape codes whose
    /// outer ring is all ocean. Blank lines around the block are ignored;
    /// whitespace inside a row is not.
    pub fn from_map(map: &str, params: Parameters) -> Result<Self> {
        params.validate()?;
        let lines: Vec<&str> = map.trim().lines().collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        if rows == 0 || cols == 0 {
            return Err(SimError::config("island map is empty"));
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != cols {
                return Err(SimError::config(format!(
                    "map row {row} has {width} cells, expected {cols}"
                )));
            }
            for (col, code) in line.chars().enumerate() {
                let landscape = Landscape::from_code(code).ok_or_else(|| {
                    SimError::config(format!(
                        "unknown landscape code '{code}' at {}",
                        Coord::new(row, col)
                    ))
                })?;
                let on_border = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
                if on_border && landscape != Landscape::Ocean {
                    return Err(SimError::config(format!(
                        "border cell {} is {landscape}; the island must be surrounded by ocean",
                        Coord::new(row, col)
                    )));
                }
                cells.push(Cell::new(landscape, &params));
            }
        }

        debug!(rows, cols, "island constructed");
        Ok(Self {
            rows,
            cols,
            cells,
            params,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Replaces the parameter table. Fodder above a lowered maximum is cut
    /// back so the cap holds from the next cycle on.
    pub fn set_parameters(&mut self, params: Parameters) -> Result<()> {
        params.validate()?;
        for cell in &mut self.cells {
            cell.cap_fodder(&params);
        }
        self.params = params;
        Ok(())
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        (coord.row < self.rows && coord.col < self.cols).then(|| coord.row * self.cols + coord.col)
    }

    fn coord_of(&self, index: usize) -> Coord {
        Coord::new(index / self.cols, index % self.cols)
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// All cells with their coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.coord_of(i), cell))
    }

    /// Orthogonal in-grid neighbours: up, left, down, right.
    pub fn neighbours(&self, coord: Coord) -> Vec<Coord> {
        let mut out = Vec::with_capacity(4);
        if coord.row > 0 {
            out.push(Coord::new(coord.row - 1, coord.col));
        }
        if coord.col > 0 {
            out.push(Coord::new(coord.row, coord.col - 1));
        }
        if coord.row + 1 < self.rows {
            out.push(Coord::new(coord.row + 1, coord.col));
        }
        if coord.col + 1 < self.cols {
            out.push(Coord::new(coord.row, coord.col + 1));
        }
        out
    }

    /// Seeds animals. Every placement is checked before any is inserted, so a
    /// rejected batch leaves the island unchanged.
    pub fn add_population(&mut self, placements: &[Placement]) -> Result<()> {
        let mut targets = Vec::with_capacity(placements.len());
        for placement in placements {
            let index = self.index(placement.loc).ok_or_else(|| {
                SimError::placement(format!(
                    "{} is outside the {}x{} island",
                    placement.loc, self.rows, self.cols
                ))
            })?;
            let cell = &self.cells[index];
            if !cell.is_passable() {
                return Err(SimError::placement(format!(
                    "cannot place animals on {} at {}",
                    cell.landscape(),
                    placement.loc
                )));
            }
            if !placement.weight.is_finite() || placement.weight <= 0.0 {
                return Err(SimError::config(format!(
                    "{} at {} has invalid weight {}",
                    placement.species, placement.loc, placement.weight
                )));
            }
            targets.push(index);
        }
        for (placement, index) in placements.iter().zip(targets) {
            let params = self.params.species(placement.species);
            let animal = Animal::new(placement.species, placement.age, placement.weight, params);
            self.cells[index].add_animal(animal);
        }
        debug!(count = placements.len(), "population added");
        Ok(())
    }

    pub fn count(&self, species: Species) -> usize {
        self.cells.iter().map(|cell| cell.count(species)).sum()
    }

    pub fn num_animals(&self) -> usize {
        self.cells.iter().map(Cell::population).sum()
    }

    pub fn species_counts(&self) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.count(Species::Herbivore),
            carnivores: self.count(Species::Carnivore),
        }
    }

    pub fn grow_fodder_all_cells(&mut self) {
        for cell in &mut self.cells {
            cell.grow_fodder(&self.params);
        }
    }

    /// Herbivores graze, then carnivores hunt, cell by cell. Returns kills.
    pub fn feed_all_cells<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut killed = 0;
        for cell in self.cells.iter_mut().filter(|c| c.population() > 0) {
            cell.feed_herbivores(&self.params);
            killed += cell.feed_carnivores(&self.params, rng);
        }
        trace!(killed, "feeding done");
        killed
    }

    pub fn procreate_all_cells<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut born = 0;
        for cell in self.cells.iter_mut().filter(|c| c.population() > 0) {
            for species in Species::ALL {
                born += cell.procreate(species, &self.params, rng);
            }
        }
        trace!(born, "procreation done");
        born
    }

    /// Decides every move against the pre-migration grid, then applies them
    /// all. Returns the number of animals that moved.
    pub fn migrate_all<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        // (source cell, species) -> [(animal index, destination cell)]
        let mut departures: BTreeMap<(usize, Species), Vec<(usize, usize)>> = BTreeMap::new();

        for (source, cell) in self.cells.iter().enumerate() {
            if !cell.is_passable() || cell.population() == 0 {
                continue;
            }
            let neighbours = self.neighbours(self.coord_of(source));
            for species in Species::ALL {
                let animals = cell.animals(species);
                if animals.is_empty() {
                    continue;
                }
                let params = self.params.species(species);
                let relative: Vec<(usize, Option<f64>)> = neighbours
                    .iter()
                    .filter_map(|&coord| self.index(coord))
                    .map(|target| {
                        let neighbour = &self.cells[target];
                        let value = neighbour
                            .is_passable()
                            .then(|| neighbour.relative_fodder(species, &self.params));
                        (target, value)
                    })
                    .collect();
                // Only ratios matter, so shift by the best value to keep exp finite.
                let best = relative
                    .iter()
                    .filter_map(|(_, value)| *value)
                    .fold(f64::NEG_INFINITY, f64::max);
                let candidates: Vec<(usize, f64)> = relative
                    .into_iter()
                    .map(|(target, value)| {
                        let propensity = value.map_or(0.0, |v| {
                            Animal::migration_propensity(v - best, params)
                        });
                        (target, propensity)
                    })
                    .collect();
                for (index, animal) in animals.iter().enumerate() {
                    if let Some(target) = animal.choose_migration_destination(&candidates, params, rng)
                    {
                        departures
                            .entry((source, species))
                            .or_default()
                            .push((index, target));
                    }
                }
            }
        }

        let mut migrated = 0;
        for ((source, species), moves) in departures {
            let indices: Vec<usize> = moves.iter().map(|&(index, _)| index).collect();
            let leaving = self.cells[source].take_animals(species, &indices);
            for (animal, (_, target)) in leaving.into_iter().zip(moves) {
                self.cells[target].receive(animal);
                migrated += 1;
            }
        }
        trace!(migrated, "migration done");
        migrated
    }

    pub fn age_all(&mut self) {
        for cell in &mut self.cells {
            cell.age_animals(&self.params);
        }
    }

    pub fn lose_weight_all(&mut self) {
        for cell in &mut self.cells {
            cell.lose_weight(&self.params);
        }
    }

    pub fn remove_dead_all<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut died = 0;
        for cell in self.cells.iter_mut().filter(|c| c.population() > 0) {
            died += cell.remove_dead(&self.params, rng);
        }
        trace!(died, "deaths done");
        died
    }

    pub fn reset_moved_all(&mut self) {
        for cell in &mut self.cells {
            cell.reset_moved();
        }
    }

    /// Runs one year: fodder growth, feeding, procreation, migration, aging,
    /// weight loss, death, then clears the moved flags.
    pub fn annual_cycle(&mut self, rng: &mut RngManager) -> CycleReport {
        self.grow_fodder_all_cells();
        let killed = self.feed_all_cells(&mut rng.stream("feeding"));
        let born = self.procreate_all_cells(&mut rng.stream("procreation"));
        let migrated = self.migrate_all(&mut rng.stream("migration"));
        self.age_all();
        self.lose_weight_all();
        let died = self.remove_dead_all(&mut rng.stream("death"));
        self.reset_moved_all();
        CycleReport {
            killed,
            born,
            migrated,
            died,
        }
    }
}
