//! Read-only population statistics for reporting and visualisation.

use serde::{Deserialize, Serialize};

use crate::animal::Species;
use crate::island::{Coord, Island};
use crate::landscape::Landscape;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl SpeciesCounts {
    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }

    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub row: usize,
    pub col: usize,
    pub landscape: Landscape,
    pub fodder: f64,
    pub herbivores: usize,
    pub carnivores: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandSnapshot {
    pub name: String,
    pub year: u64,
    pub total: usize,
    pub per_species: SpeciesCounts,
    /// Passable cells only, row-major.
    pub cells: Vec<CellSnapshot>,
}

impl IslandSnapshot {
    pub fn capture(name: &str, year: u64, island: &Island) -> Self {
        let per_species = island.species_counts();
        Self {
            name: name.to_string(),
            year,
            total: per_species.total(),
            per_species,
            cells: distribution(island),
        }
    }

    pub fn cell(&self, coord: Coord) -> Option<&CellSnapshot> {
        self.cells
            .iter()
            .find(|c| c.row == coord.row && c.col == coord.col)
    }
}

/// Per-cell population breakdown of the passable cells.
pub fn distribution(island: &Island) -> Vec<CellSnapshot> {
    island
        .cells()
        .filter(|(_, cell)| cell.is_passable())
        .map(|(coord, cell)| CellSnapshot {
            row: coord.row,
            col: coord.col,
            landscape: cell.landscape(),
            fodder: cell.fodder(),
            herbivores: cell.count(Species::Herbivore),
            carnivores: cell.count(Species::Carnivore),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::Placement;
    use crate::params::Parameters;

    #[test]
    fn capture_lists_passable_cells() {
        let mut island = Island::from_map("OOOO\nOJSO\nOOOO", Parameters::default()).unwrap();
        island
            .add_population(&[
                Placement::new(Coord::new(1, 1), Species::Herbivore, 3, 20.0),
                Placement::new(Coord::new(1, 2), Species::Carnivore, 3, 20.0),
                Placement::new(Coord::new(1, 2), Species::Herbivore, 3, 20.0),
            ])
            .unwrap();
        let snapshot = IslandSnapshot::capture("test", 4, &island);
        assert_eq!(snapshot.year, 4);
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.per_species.get(Species::Herbivore), 2);
        assert_eq!(snapshot.cells.len(), 2);
        let savannah = snapshot.cell(Coord::new(1, 2)).unwrap();
        assert_eq!(savannah.landscape, Landscape::Savannah);
        assert_eq!(savannah.carnivores, 1);
        assert_eq!(savannah.fodder, 300.0);
        assert!(snapshot.cell(Coord::new(0, 0)).is_none());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"landscape\":\"Savannah\""));
    }
}
