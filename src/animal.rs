//! Individual animals and their per-year biology.

use std::fmt;
use std::str::FromStr;

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use rand_distr::LogNormal;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::params::SpeciesParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Herbivore => f.write_str("Herbivore"),
            Species::Carnivore => f.write_str("Carnivore"),
        }
    }
}

impl FromStr for Species {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Herbivore" => Ok(Species::Herbivore),
            "Carnivore" => Ok(Species::Carnivore),
            other => Err(SimError::config(format!("unknown species '{other}'"))),
        }
    }
}

/// `1 / (1 + e^(phi * (x - x_half)))`, falling from 1 towards 0 as `x` grows.
fn falling_logistic(x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (phi * (x - x_half)).exp())
}

/// Fitness for the given age and weight; zero for non-positive weight.
pub fn fitness_of(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let age_term = falling_logistic(age as f64, params.a_half, params.phi_age);
    let weight_term = falling_logistic(weight, params.w_half, -params.phi_weight);
    age_term * weight_term
}

/// Draws a newborn weight whose mean and standard deviation are `w_birth`
/// and `sigma_birth`.
fn sample_birth_weight<R: Rng + ?Sized>(params: &SpeciesParams, rng: &mut R) -> f64 {
    let mean = params.w_birth;
    let std = params.sigma_birth;
    if std <= 0.0 {
        return mean;
    }
    let sigma_sq = (1.0 + (std * std) / (mean * mean)).ln();
    let mu = mean.ln() - sigma_sq / 2.0;
    match LogNormal::new(mu, sigma_sq.sqrt()) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    has_moved: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: fitness_of(age, weight, params),
            has_moved: false,
        }
    }

    /// Newborns count as already moved so they stay put in their birth year.
    fn newborn(species: Species, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            has_moved: true,
            ..Self::new(species, 0, weight, params)
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub(crate) fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    pub(crate) fn reset_moved(&mut self) {
        self.has_moved = false;
    }

    pub fn recompute_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = fitness_of(self.age, self.weight, params);
        debug_assert!((0.0..=1.0).contains(&self.fitness));
    }

    pub fn age_one_cycle(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.recompute_fitness(params);
    }

    pub fn lose_weight_annual(&mut self, params: &SpeciesParams) {
        self.weight -= self.weight * params.eta;
        self.recompute_fitness(params);
    }

    pub fn gain_weight_from_food(&mut self, eaten: f64, params: &SpeciesParams) {
        self.weight += eaten * params.beta;
        self.recompute_fitness(params);
    }

    /// Tries to give birth given `same_species` animals (including this one)
    /// in the cell. On success the mother loses `xi` times the newborn's
    /// weight.
    pub fn attempt_birth<R: Rng + ?Sized>(
        &mut self,
        same_species: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        if self.weight < params.birth_weight_threshold() {
            return None;
        }
        let others = same_species.saturating_sub(1) as f64;
        let probability = (params.gamma * self.fitness * others).min(1.0);
        if probability <= 0.0 || rng.gen::<f64>() >= probability {
            return None;
        }
        let newborn_weight = sample_birth_weight(params, rng);
        let loss = params.xi * newborn_weight;
        if loss >= self.weight {
            return None;
        }
        self.weight -= loss;
        self.recompute_fitness(params);
        Some(Animal::newborn(self.species, newborn_weight, params))
    }

    pub fn attempt_death<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        rng.gen::<f64>() < params.omega * (1.0 - self.fitness)
    }

    /// Weight of a neighbouring cell as a destination. Depends only on the
    /// species, so it is computed once per cell and species.
    pub fn migration_propensity(relative_fodder: f64, params: &SpeciesParams) -> f64 {
        (params.lambda * relative_fodder).exp()
    }

    /// Decides whether to move this year and where. `candidates` pairs each
    /// neighbour with its propensity; impassable neighbours carry zero.
    pub fn choose_migration_destination<T: Copy, R: Rng + ?Sized>(
        &self,
        candidates: &[(T, f64)],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<T> {
        if self.has_moved || candidates.is_empty() {
            return None;
        }
        if rng.gen::<f64>() >= params.mu * self.fitness {
            return None;
        }
        let index = WeightedIndex::new(candidates.iter().map(|(_, p)| *p)).ok()?;
        Some(candidates[index.sample(rng)].0)
    }

    /// Hunts through `prey`, which must be sorted by ascending fitness.
    /// Returns the indices of the killed animals; the caller removes them.
    pub fn hunt<R: Rng + ?Sized>(
        &mut self,
        prey: &[Animal],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Vec<usize> {
        debug_assert_eq!(self.species, Species::Carnivore);
        let Some(delta_max) = params.delta_phi_max else {
            return Vec::new();
        };
        let mut eaten = 0.0;
        let mut killed = Vec::new();
        for (index, herbivore) in prey.iter().enumerate() {
            if eaten >= params.appetite {
                break;
            }
            let difference = self.fitness - herbivore.fitness;
            let chance = if difference <= 0.0 {
                0.0
            } else if difference >= delta_max {
                1.0
            } else {
                difference / delta_max
            };
            if chance > 0.0 && rng.gen::<f64>() < chance {
                let portion = herbivore.weight.min(params.appetite - eaten);
                eaten += portion;
                self.gain_weight_from_food(portion, params);
                killed.push(index);
            }
        }
        killed
    }
}
