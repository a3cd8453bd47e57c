//! Species and landscape parameter tables.
//!
//! Parameters are keyed by the closed [`Species`] and [`Landscape`] tags; the
//! simulation never branches on a type hierarchy, it looks the record up here.

use serde::{Deserialize, Serialize};

use crate::animal::Species;
use crate::error::{Result, SimError};
use crate::landscape::Landscape;

/// Per-species coefficients, named as in the BioSim parameter sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean newborn weight.
    pub w_birth: f64,
    /// Standard deviation of newborn weight.
    pub sigma_birth: f64,
    /// Conversion factor from food eaten to weight gained.
    pub beta: f64,
    /// Annual weight-loss rate.
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    /// Migration-probability coefficient.
    pub mu: f64,
    /// Migration-stimulus coefficient.
    pub lambda: f64,
    /// Birth-rate coefficient.
    pub gamma: f64,
    /// Birth-weight threshold factor.
    pub zeta: f64,
    /// Birth-weight loss coefficient.
    pub xi: f64,
    /// Death-rate coefficient.
    pub omega: f64,
    /// Appetite.
    #[serde(rename = "F")]
    pub appetite: f64,
    /// Maximum fitness difference for a certain kill. Carnivores only.
    #[serde(rename = "DeltaPhiMax", default)]
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.2,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            lambda: 1.0,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            delta_phi_max: None,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 60.0,
            phi_age: 0.4,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            lambda: 1.0,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.9,
            appetite: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    pub fn defaults_for(species: Species) -> Self {
        match species {
            Species::Herbivore => Self::herbivore(),
            Species::Carnivore => Self::carnivore(),
        }
    }

    /// Weight a mother must reach before a birth can be considered.
    pub fn birth_weight_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    /// Returns a copy with the overrides applied, or an error if the result is
    /// outside the documented domains.
    pub fn with_overrides(&self, species: Species, overrides: &SpeciesOverrides) -> Result<Self> {
        let mut next = self.clone();
        let fields: [(&mut f64, Option<f64>); 15] = [
            (&mut next.w_birth, overrides.w_birth),
            (&mut next.sigma_birth, overrides.sigma_birth),
            (&mut next.beta, overrides.beta),
            (&mut next.eta, overrides.eta),
            (&mut next.a_half, overrides.a_half),
            (&mut next.phi_age, overrides.phi_age),
            (&mut next.w_half, overrides.w_half),
            (&mut next.phi_weight, overrides.phi_weight),
            (&mut next.mu, overrides.mu),
            (&mut next.lambda, overrides.lambda),
            (&mut next.gamma, overrides.gamma),
            (&mut next.zeta, overrides.zeta),
            (&mut next.xi, overrides.xi),
            (&mut next.omega, overrides.omega),
            (&mut next.appetite, overrides.appetite),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(delta) = overrides.delta_phi_max {
            if species != Species::Carnivore {
                return Err(SimError::config(format!(
                    "DeltaPhiMax is not a parameter of {species}"
                )));
            }
            next.delta_phi_max = Some(delta);
        }
        next.validate(species)?;
        Ok(next)
    }

    pub fn validate(&self, species: Species) -> Result<()> {
        let named = [
            ("w_birth", self.w_birth),
            ("sigma_birth", self.sigma_birth),
            ("beta", self.beta),
            ("eta", self.eta),
            ("a_half", self.a_half),
            ("phi_age", self.phi_age),
            ("w_half", self.w_half),
            ("phi_weight", self.phi_weight),
            ("mu", self.mu),
            ("lambda", self.lambda),
            ("gamma", self.gamma),
            ("zeta", self.zeta),
            ("xi", self.xi),
            ("omega", self.omega),
            ("F", self.appetite),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::config(format!(
                    "{species} parameter {name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.w_birth <= 0.0 {
            return Err(SimError::config(format!(
                "{species} parameter w_birth must be positive"
            )));
        }
        if self.eta > 1.0 {
            return Err(SimError::config(format!(
                "{species} parameter eta must not exceed 1, got {}",
                self.eta
            )));
        }
        match (species, self.delta_phi_max) {
            (Species::Carnivore, Some(delta)) if delta.is_finite() && delta > 0.0 => Ok(()),
            (Species::Carnivore, Some(delta)) => Err(SimError::config(format!(
                "Carnivore parameter DeltaPhiMax must be positive, got {delta}"
            ))),
            (Species::Carnivore, None) => Err(SimError::config(
                "Carnivore parameter DeltaPhiMax is required",
            )),
            (Species::Herbivore, Some(_)) => Err(SimError::config(
                "DeltaPhiMax is not a parameter of Herbivore",
            )),
            (Species::Herbivore, None) => Ok(()),
        }
    }
}

/// Partial species parameter update. Unknown keys are rejected on deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesOverrides {
    pub w_birth: Option<f64>,
    pub sigma_birth: Option<f64>,
    pub beta: Option<f64>,
    pub eta: Option<f64>,
    pub a_half: Option<f64>,
    pub phi_age: Option<f64>,
    pub w_half: Option<f64>,
    pub phi_weight: Option<f64>,
    pub mu: Option<f64>,
    pub lambda: Option<f64>,
    pub gamma: Option<f64>,
    pub zeta: Option<f64>,
    pub xi: Option<f64>,
    pub omega: Option<f64>,
    #[serde(rename = "F")]
    pub appetite: Option<f64>,
    #[serde(rename = "DeltaPhiMax")]
    pub delta_phi_max: Option<f64>,
}

/// Fodder parameters for a growable landscape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FodderParams {
    pub f_max: f64,
    /// Savannah regrowth rate; unused by Jungle.
    pub alpha: f64,
}

impl FodderParams {
    pub fn validate(&self, landscape: Landscape) -> Result<()> {
        if !self.f_max.is_finite() || self.f_max < 0.0 {
            return Err(SimError::config(format!(
                "{landscape} parameter f_max must be non-negative, got {}",
                self.f_max
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SimError::config(format!(
                "{landscape} parameter alpha must lie in [0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandscapeOverrides {
    pub f_max: Option<f64>,
    pub alpha: Option<f64>,
}

/// Full parameter table consulted by every cell and animal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub jungle: FodderParams,
    pub savannah: FodderParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            jungle: FodderParams {
                f_max: 800.0,
                alpha: 0.0,
            },
            savannah: FodderParams {
                f_max: 300.0,
                alpha: 0.3,
            },
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }

    /// Fodder parameters for growable landscapes, `None` for barren ones.
    pub fn fodder(&self, landscape: Landscape) -> Option<&FodderParams> {
        match landscape {
            Landscape::Jungle => Some(&self.jungle),
            Landscape::Savannah => Some(&self.savannah),
            Landscape::Desert | Landscape::Mountain | Landscape::Ocean => None,
        }
    }

    /// Applies overrides for the species called `name`. The table is left
    /// untouched if anything is invalid.
    pub fn set_species(&mut self, name: &str, overrides: &SpeciesOverrides) -> Result<()> {
        let species: Species = name.parse()?;
        let updated = self.species(species).with_overrides(species, overrides)?;
        *self.species_mut(species) = updated;
        Ok(())
    }

    /// Applies overrides for the landscape with map code `code`. Only growable
    /// landscapes carry parameters.
    pub fn set_landscape(&mut self, code: &str, overrides: &LandscapeOverrides) -> Result<()> {
        let landscape: Landscape = code.parse()?;
        let target = match landscape {
            Landscape::Jungle => &mut self.jungle,
            Landscape::Savannah => &mut self.savannah,
            other => {
                return Err(SimError::config(format!(
                    "landscape {other} has no parameters"
                )))
            }
        };
        let mut next = *target;
        if let Some(f_max) = overrides.f_max {
            next.f_max = f_max;
        }
        if let Some(alpha) = overrides.alpha {
            if landscape != Landscape::Savannah {
                return Err(SimError::config(format!(
                    "alpha is not a parameter of {landscape}"
                )));
            }
            next.alpha = alpha;
        }
        next.validate(landscape)?;
        *target = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.herbivore.validate(Species::Herbivore)?;
        self.carnivore.validate(Species::Carnivore)?;
        self.jungle.validate(Landscape::Jungle)?;
        self.savannah.validate(Landscape::Savannah)
    }
}
