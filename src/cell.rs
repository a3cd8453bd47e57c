//! A single landscape tile and the animals living on it.

use rand::Rng;

use crate::animal::{Animal, Species};
use crate::landscape::Landscape;
use crate::params::Parameters;

#[derive(Debug, Clone)]
pub struct Cell {
    landscape: Landscape,
    fodder: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(landscape: Landscape, params: &Parameters) -> Self {
        Self {
            landscape,
            fodder: landscape.initial_fodder(params),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn landscape(&self) -> Landscape {
        self.landscape
    }

    pub fn is_passable(&self) -> bool {
        self.landscape.is_passable()
    }

    pub fn fodder(&self) -> f64 {
        self.fodder
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn animals_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.animals(species).len()
    }

    pub fn population(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    pub fn add_animal(&mut self, animal: Animal) {
        assert!(
            self.is_passable(),
            "animal placed on impassable {} cell",
            self.landscape
        );
        self.animals_mut(animal.species()).push(animal);
    }

    /// Lowers fodder to the landscape maximum after a parameter change.
    pub(crate) fn cap_fodder(&mut self, params: &Parameters) {
        let max = self.landscape.initial_fodder(params);
        self.fodder = self.fodder.min(max);
    }

    pub fn grow_fodder(&mut self, params: &Parameters) {
        self.fodder = self.landscape.regrow(self.fodder, params);
        assert!(self.fodder >= 0.0, "negative fodder after regrowth");
    }

    /// Stable sort by fitness; equal fitness keeps insertion order.
    pub fn sort_by_fitness(&mut self, species: Species, descending: bool) {
        let animals = self.animals_mut(species);
        if descending {
            animals.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        } else {
            animals.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        }
    }

    /// Fittest herbivores eat first until the fodder runs out.
    pub fn feed_herbivores(&mut self, params: &Parameters) {
        self.sort_by_fitness(Species::Herbivore, true);
        let herb = &params.herbivore;
        for animal in self.herbivores.iter_mut() {
            if self.fodder <= 0.0 {
                break;
            }
            let eaten = herb.appetite.min(self.fodder);
            self.fodder -= eaten;
            animal.gain_weight_from_food(eaten, herb);
        }
        assert!(self.fodder >= 0.0, "fodder depleted below zero");
    }

    /// Each carnivore, fittest first, hunts the surviving herbivores from the
    /// weakest up. Returns the number of herbivores killed.
    pub fn feed_carnivores<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> usize {
        if self.carnivores.is_empty() || self.herbivores.is_empty() {
            return 0;
        }
        self.sort_by_fitness(Species::Herbivore, false);
        self.sort_by_fitness(Species::Carnivore, true);
        let carn = &params.carnivore;
        let mut total_killed = 0;
        for hunter in self.carnivores.iter_mut() {
            if self.herbivores.is_empty() {
                break;
            }
            let killed = hunter.hunt(&self.herbivores, carn, rng);
            total_killed += killed.len();
            for index in killed.into_iter().rev() {
                self.herbivores.remove(index);
            }
        }
        total_killed
    }

    /// Attempts a birth for every animal of `species`. The same-species count
    /// is taken before any newborn is added. Returns the number born.
    pub fn procreate<R: Rng + ?Sized>(
        &mut self,
        species: Species,
        params: &Parameters,
        rng: &mut R,
    ) -> usize {
        let same_species = self.count(species);
        if same_species < 2 {
            return 0;
        }
        let species_params = params.species(species);
        let newborns: Vec<Animal> = self
            .animals_mut(species)
            .iter_mut()
            .filter_map(|parent| parent.attempt_birth(same_species, species_params, &mut *rng))
            .collect();
        let born = newborns.len();
        self.animals_mut(species).extend(newborns);
        born
    }

    /// Available food per competing consumer, as seen by a `species` animal
    /// considering a move here.
    pub fn relative_fodder(&self, species: Species, params: &Parameters) -> f64 {
        if !self.is_passable() {
            return 0.0;
        }
        let appetite = params.species(species).appetite;
        if appetite <= 0.0 {
            return 0.0;
        }
        let food = match species {
            Species::Herbivore => self.fodder,
            Species::Carnivore => self.herbivores.iter().map(Animal::weight).sum::<f64>(),
        };
        food / ((self.count(species) + 1) as f64 * appetite)
    }

    pub fn age_animals(&mut self, params: &Parameters) {
        for animal in self.herbivores.iter_mut() {
            animal.age_one_cycle(&params.herbivore);
        }
        for animal in self.carnivores.iter_mut() {
            animal.age_one_cycle(&params.carnivore);
        }
    }

    pub fn lose_weight(&mut self, params: &Parameters) {
        for animal in self.herbivores.iter_mut() {
            animal.lose_weight_annual(&params.herbivore);
        }
        for animal in self.carnivores.iter_mut() {
            animal.lose_weight_annual(&params.carnivore);
        }
    }

    /// Removes the animals that die this year. Returns the number removed.
    pub fn remove_dead<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> usize {
        let before = self.population();
        let herb = &params.herbivore;
        self.herbivores.retain(|animal| !animal.attempt_death(herb, &mut *rng));
        let carn = &params.carnivore;
        self.carnivores.retain(|animal| !animal.attempt_death(carn, &mut *rng));
        before - self.population()
    }

    pub(crate) fn reset_moved(&mut self) {
        self.herbivores
            .iter_mut()
            .chain(self.carnivores.iter_mut())
            .for_each(Animal::reset_moved);
    }

    /// Removes the animals at `indices` (ascending) and hands them over.
    pub(crate) fn take_animals(&mut self, species: Species, indices: &[usize]) -> Vec<Animal> {
        let animals = self.animals_mut(species);
        let mut taken: Vec<Animal> = indices
            .iter()
            .rev()
            .map(|&index| animals.remove(index))
            .collect();
        taken.reverse();
        taken
    }

    pub(crate) fn receive(&mut self, mut animal: Animal) {
        animal.mark_moved();
        self.add_animal(animal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn herbivore(age: u32, weight: f64, params: &Parameters) -> Animal {
        Animal::new(Species::Herbivore, age, weight, &params.herbivore)
    }

    fn carnivore(age: u32, weight: f64, params: &Parameters) -> Animal {
        Animal::new(Species::Carnivore, age, weight, &params.carnivore)
    }

    #[test]
    fn fodder_starts_full_and_regrows() {
        let params = Parameters::default();
        let mut jungle = Cell::new(Landscape::Jungle, &params);
        let mut desert = Cell::new(Landscape::Desert, &params);
        assert_eq!(jungle.fodder(), 800.0);
        assert_eq!(desert.fodder(), 0.0);
        jungle.feed_herbivores(&params);
        jungle.grow_fodder(&params);
        desert.grow_fodder(&params);
        assert_eq!(jungle.fodder(), 800.0);
        assert_eq!(desert.fodder(), 0.0);
    }

    #[test]
    fn fittest_herbivore_eats_first() {
        let mut params = Parameters::default();
        params.savannah.f_max = 15.0;
        let mut cell = Cell::new(Landscape::Savannah, &params);
        cell.add_animal(herbivore(80, 5.0, &params));
        cell.add_animal(herbivore(5, 30.0, &params));
        cell.feed_herbivores(&params);

        assert_eq!(cell.fodder(), 0.0);
        let herbs = cell.animals(Species::Herbivore);
        assert!((herbs[0].weight() - 39.0).abs() < 1e-12);
        assert!((herbs[1].weight() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn hungry_cell_feeds_nobody() {
        let params = Parameters::default();
        let mut cell = Cell::new(Landscape::Desert, &params);
        cell.add_animal(herbivore(5, 30.0, &params));
        cell.feed_herbivores(&params);
        assert_eq!(cell.animals(Species::Herbivore)[0].weight(), 30.0);
    }

    #[test]
    fn carnivores_remove_killed_prey() {
        let mut params = Parameters::default();
        params.carnivore.delta_phi_max = Some(0.1);
        let mut cell = Cell::new(Landscape::Jungle, &params);
        for _ in 0..4 {
            cell.add_animal(herbivore(150, 20.0, &params));
        }
        cell.add_animal(carnivore(5, 40.0, &params));
        cell.add_animal(carnivore(5, 40.0, &params));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let killed = cell.feed_carnivores(&params, &mut rng);

        // The first hunter fills up on three prey, the second takes the last.
        assert_eq!(killed, 4);
        assert_eq!(cell.count(Species::Herbivore), 0);
    }

    #[test]
    fn single_animal_cannot_procreate() {
        let params = Parameters::default();
        let mut cell = Cell::new(Landscape::Jungle, &params);
        cell.add_animal(herbivore(5, 50.0, &params));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(cell.procreate(Species::Herbivore, &params, &mut rng), 0);
        }
        assert_eq!(cell.count(Species::Herbivore), 1);
    }

    #[test]
    fn procreation_counts_parents_only() {
        let mut params = Parameters::default();
        params.herbivore.gamma = 1.0;
        let mut cell = Cell::new(Landscape::Jungle, &params);
        for _ in 0..10 {
            cell.add_animal(herbivore(5, 80.0, &params));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let born = cell.procreate(Species::Herbivore, &params, &mut rng);
        assert_eq!(born, 10);
        assert_eq!(cell.count(Species::Herbivore), 20);
        let newborns = &cell.animals(Species::Herbivore)[10..];
        assert!(newborns.iter().all(|a| a.age() == 0 && a.has_moved()));
        assert_eq!(cell.procreate(Species::Carnivore, &params, &mut rng), 0);
    }

    #[test]
    fn relative_fodder_formula() {
        let params = Parameters::default();
        let mut cell = Cell::new(Landscape::Jungle, &params);
        assert_eq!(cell.relative_fodder(Species::Herbivore, &params), 80.0);
        cell.add_animal(herbivore(5, 30.0, &params));
        assert_eq!(cell.relative_fodder(Species::Herbivore, &params), 40.0);
        cell.add_animal(herbivore(5, 70.0, &params));
        assert_eq!(cell.relative_fodder(Species::Carnivore, &params), 2.0);

        let ocean = Cell::new(Landscape::Ocean, &params);
        assert_eq!(ocean.relative_fodder(Species::Herbivore, &params), 0.0);
    }

    #[test]
    fn starved_animals_are_removed() {
        let params = Parameters::default();
        let mut cell = Cell::new(Landscape::Jungle, &params);
        cell.add_animal(herbivore(5, 0.0, &params));
        cell.add_animal(carnivore(5, 0.0, &params));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(cell.remove_dead(&params, &mut rng), 2);
        assert_eq!(cell.population(), 0);
    }

    #[test]
    fn take_and_receive_move_animals() {
        let params = Parameters::default();
        let mut source = Cell::new(Landscape::Jungle, &params);
        let mut target = Cell::new(Landscape::Savannah, &params);
        for age in 0..4 {
            source.add_animal(herbivore(age, 20.0, &params));
        }
        let moved = source.take_animals(Species::Herbivore, &[1, 3]);
        assert_eq!(moved.iter().map(Animal::age).collect::<Vec<_>>(), vec![1, 3]);
        for animal in moved {
            target.receive(animal);
        }
        assert_eq!(source.count(Species::Herbivore), 2);
        assert!(target.animals(Species::Herbivore).iter().all(Animal::has_moved));
        target.reset_moved();
        assert!(!target.animals(Species::Herbivore)[0].has_moved());
    }

    #[test]
    #[should_panic]
    fn ocean_rejects_animals() {
        let params = Parameters::default();
        let mut ocean = Cell::new(Landscape::Ocean, &params);
        ocean.add_animal(herbivore(5, 20.0, &params));
    }
}
