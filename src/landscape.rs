use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::params::{FodderParams, Parameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landscape {
    Jungle,
    Savannah,
    Desert,
    Mountain,
    Ocean,
}

/// Next-year fodder given current fodder and the landscape's parameters.
type RegrowthFn = fn(f64, Option<&FodderParams>) -> f64;

fn reset_to_max(_current: f64, params: Option<&FodderParams>) -> f64 {
    params.map_or(0.0, |p| p.f_max)
}

fn logistic_regrowth(current: f64, params: Option<&FodderParams>) -> f64 {
    match params {
        Some(p) => current + p.alpha * (p.f_max - current),
        None => 0.0,
    }
}

fn barren(_current: f64, _params: Option<&FodderParams>) -> f64 {
    0.0
}

impl Landscape {
    pub const ALL: [Landscape; 5] = [
        Landscape::Jungle,
        Landscape::Savannah,
        Landscape::Desert,
        Landscape::Mountain,
        Landscape::Ocean,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'J' => Some(Landscape::Jungle),
            'S' => Some(Landscape::Savannah),
            'D' => Some(Landscape::Desert),
            'M' => Some(Landscape::Mountain),
            'O' => Some(Landscape::Ocean),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Landscape::Jungle => 'J',
            Landscape::Savannah => 'S',
            Landscape::Desert => 'D',
            Landscape::Mountain => 'M',
            Landscape::Ocean => 'O',
        }
    }

    pub fn is_passable(self) -> bool {
        !matches!(self, Landscape::Mountain | Landscape::Ocean)
    }

    fn regrowth(self) -> RegrowthFn {
        match self {
            Landscape::Jungle => reset_to_max,
            Landscape::Savannah => logistic_regrowth,
            Landscape::Desert | Landscape::Mountain | Landscape::Ocean => barren,
        }
    }

    /// Fodder a freshly built cell of this type starts with.
    pub fn initial_fodder(self, params: &Parameters) -> f64 {
        params.fodder(self).map_or(0.0, |p| p.f_max)
    }

    /// Applies this landscape's annual regrowth rule.
    pub fn regrow(self, current: f64, params: &Parameters) -> f64 {
        (self.regrowth())(current, params.fodder(self))
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Landscape::Jungle => "Jungle",
            Landscape::Savannah => "Savannah",
            Landscape::Desert => "Desert",
            Landscape::Mountain => "Mountain",
            Landscape::Ocean => "Ocean",
        };
        f.write_str(name)
    }
}

impl FromStr for Landscape {
    type Err = SimError;

    /// Accepts a single-letter map code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(code), None) => Landscape::from_code(code)
                .ok_or_else(|| SimError::config(format!("unknown landscape code '{s}'"))),
            _ => Err(SimError::config(format!("unknown landscape code '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn codes_round_trip() {
        for landscape in Landscape::ALL {
            assert_eq!(Landscape::from_code(landscape.code()), Some(landscape));
        }
        assert_eq!(Landscape::from_code('X'), None);
        assert!("JJ".parse::<Landscape>().is_err());
    }

    #[test]
    fn only_mountain_and_ocean_block() {
        assert!(Landscape::Jungle.is_passable());
        assert!(Landscape::Savannah.is_passable());
        assert!(Landscape::Desert.is_passable());
        assert!(!Landscape::Mountain.is_passable());
        assert!(!Landscape::Ocean.is_passable());
    }

    #[test]
    fn regrowth_rules() {
        let params = Parameters::default();
        assert_eq!(Landscape::Jungle.regrow(12.0, &params), 800.0);
        assert_eq!(Landscape::Savannah.regrow(60.0, &params), 132.0);
        assert_eq!(Landscape::Savannah.regrow(300.0, &params), 300.0);
        assert_eq!(Landscape::Desert.regrow(0.0, &params), 0.0);
        assert_eq!(Landscape::Ocean.regrow(0.0, &params), 0.0);
        assert_eq!(Landscape::Mountain.initial_fodder(&params), 0.0);
        assert_eq!(Landscape::Savannah.initial_fodder(&params), 300.0);
    }

    proptest! {
        #[test]
        fn savannah_regrowth_stays_below_cap(current in 0.0f64..300.0, alpha in 0.0f64..=1.0) {
            let mut params = Parameters::default();
            params.savannah.alpha = alpha;
            let next = Landscape::Savannah.regrow(current, &params);
            prop_assert!(next >= current - 1e-9);
            prop_assert!(next <= 300.0 + 1e-9);
        }
    }
}
