//! Roll outcomes, critical bands, gambling bands, and roll modifiers

use serde::{Deserialize, Serialize};

pub const FLAVOR_CRITICAL_SUCCESS: &str = "Fate smiles upon you...";
pub const FLAVOR_CRITICAL_FAILURE: &str = "The stars align against you...";
pub const FLAVOR_PLAIN: &str = "The die is cast.";
/// Placeholder until narrated rolls go through the request queue.
pub const FLAVOR_AI_PLACEHOLDER: &str = "The cosmic forces stir...";

/// Outcome of a single roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub value: i32,
    pub min: i32,
    pub max: i32,
    /// What the roll was for ("Attack", "Saving throw: dread", ...)
    pub context: String,
    pub flavor_text: String,
    pub critical_success: bool,
    pub critical_failure: bool,
}

impl RollResult {
    pub fn new(value: i32, min: i32, max: i32, context: impl Into<String>) -> Self {
        Self {
            value,
            min,
            max,
            context: context.into(),
            flavor_text: String::new(),
            critical_success: false,
            critical_failure: false,
        }
    }

    pub fn with_flavor(mut self, flavor_text: impl Into<String>) -> Self {
        self.flavor_text = flavor_text.into();
        self
    }

    /// Mark criticals using the top/bottom 10% of `min..=max`.
    pub fn with_critical_bands(mut self) -> Self {
        let crit = CriticalBands::for_range(self.min, self.max).classify(self.value);
        self.critical_success = crit == Critical::Success;
        self.critical_failure = crit == Critical::Failure;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Critical {
    Success,
    Failure,
    None,
}

/// Top and bottom slices of a roll range that count as criticals.
///
/// The band width is `(max - min) / 10` with integer division, so ranges
/// narrower than ten collapse to single-value bands at each end. Success is
/// checked first, which only matters when `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalBands {
    success_from: i64,
    failure_to: i64,
}

impl CriticalBands {
    pub fn for_range(min: i32, max: i32) -> Self {
        let (min, max) = (i64::from(min), i64::from(max));
        let band = (max - min) / 10;
        Self {
            success_from: max - band,
            failure_to: min + band,
        }
    }

    pub fn classify(&self, value: i32) -> Critical {
        let value = i64::from(value);
        if value >= self.success_from {
            Critical::Success
        } else if value <= self.failure_to {
            Critical::Failure
        } else {
            Critical::None
        }
    }
}

/// Outcome bands of the 0-100 gambling roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamblingBand {
    /// 75 and up
    Win,
    /// 50 to 74
    ModestWin,
    /// 25 to 49
    Neutral,
    /// 10 to 24
    Loss,
    /// below 10
    CriticalLoss,
}

impl GamblingBand {
    pub fn from_roll(roll: i32) -> Self {
        match roll {
            r if r >= 75 => Self::Win,
            r if r >= 50 => Self::ModestWin,
            r if r >= 25 => Self::Neutral,
            r if r >= 10 => Self::Loss,
            _ => Self::CriticalLoss,
        }
    }

    pub fn flavor(self) -> &'static str {
        match self {
            Self::Win => "Fortune favors you! The elder bloom glows with approval.",
            Self::ModestWin => "A modest victory. The spores shimmer faintly.",
            Self::Neutral => "The fungus remains dormant. Nothing gained, nothing lost.",
            Self::Loss => "The bloom wilts. Your luck turns sour.",
            Self::CriticalLoss => "The elder bloom recoils in disgust. Dire consequences await.",
        }
    }

    pub fn is_critical_success(self) -> bool {
        self == Self::Win
    }

    pub fn is_critical_failure(self) -> bool {
        self == Self::CriticalLoss
    }
}

/// Luck, curses, items: anything that shifts a player's rolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollModifier {
    pub name: String,
    pub flat_bonus: i32,
    pub multiplier: f32,
    pub description: String,
}

impl RollModifier {
    pub fn new(name: impl Into<String>, flat_bonus: i32, multiplier: f32) -> Self {
        Self {
            name: name.into(),
            flat_bonus,
            multiplier,
            description: String::new(),
        }
    }
}

/// `(base + sum of flat bonuses) * product of multipliers`, truncated.
pub fn apply_modifiers(base: i32, modifiers: &[RollModifier]) -> i32 {
    if modifiers.is_empty() {
        return base;
    }

    let flat: i64 = modifiers.iter().map(|m| i64::from(m.flat_bonus)).sum();
    let multiplier: f64 = modifiers.iter().map(|m| f64::from(m.multiplier)).product();
    let total = (i64::from(base) + flat) as f64 * multiplier;
    // `as` saturates at the i32 bounds and maps NaN to 0
    total.trunc() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_to_ten_bands_are_single_values() {
        let bands = CriticalBands::for_range(1, 10);
        assert_eq!(bands.classify(10), Critical::Success);
        assert_eq!(bands.classify(1), Critical::Failure);
        assert_eq!(bands.classify(5), Critical::None);
        assert_eq!(bands.classify(9), Critical::None);
        assert_eq!(bands.classify(2), Critical::None);
    }

    #[test]
    fn wide_range_uses_ten_percent_bands() {
        let bands = CriticalBands::for_range(0, 100);
        assert_eq!(bands.classify(90), Critical::Success);
        assert_eq!(bands.classify(89), Critical::None);
        assert_eq!(bands.classify(10), Critical::Failure);
        assert_eq!(bands.classify(11), Critical::None);
    }

    #[test]
    fn result_flags_follow_bands() {
        let hit = RollResult::new(10, 1, 10, "test").with_critical_bands();
        assert!(hit.critical_success && !hit.critical_failure);

        let miss = RollResult::new(1, 1, 10, "test").with_critical_bands();
        assert!(miss.critical_failure && !miss.critical_success);

        let plain = RollResult::new(5, 1, 10, "test").with_critical_bands();
        assert!(!plain.critical_failure && !plain.critical_success);
    }

    #[test]
    fn gambling_band_edges() {
        assert_eq!(GamblingBand::from_roll(100), GamblingBand::Win);
        assert_eq!(GamblingBand::from_roll(75), GamblingBand::Win);
        assert_eq!(GamblingBand::from_roll(74), GamblingBand::ModestWin);
        assert_eq!(GamblingBand::from_roll(50), GamblingBand::ModestWin);
        assert_eq!(GamblingBand::from_roll(49), GamblingBand::Neutral);
        assert_eq!(GamblingBand::from_roll(25), GamblingBand::Neutral);
        assert_eq!(GamblingBand::from_roll(24), GamblingBand::Loss);
        assert_eq!(GamblingBand::from_roll(10), GamblingBand::Loss);
        assert_eq!(GamblingBand::from_roll(9), GamblingBand::CriticalLoss);
        assert_eq!(GamblingBand::from_roll(0), GamblingBand::CriticalLoss);
    }

    #[test]
    fn modifiers_sum_then_multiply() {
        let mods = vec![
            RollModifier::new("lucky charm", 2, 1.5),
            RollModifier::new("spore curse", -1, 0.5),
            RollModifier::new("ritual", 3, 2.0),
        ];
        // (10 + 4) * 1.5 = 21
        assert_eq!(apply_modifiers(10, &mods), 21);

        let mut reversed = mods.clone();
        reversed.reverse();
        assert_eq!(apply_modifiers(10, &reversed), 21);
    }

    #[test]
    fn modifiers_truncate_toward_zero() {
        let mods = vec![RollModifier::new("frail", 0, 0.75)];
        assert_eq!(apply_modifiers(5, &mods), 3);
        assert_eq!(apply_modifiers(-5, &mods), -3);
        assert_eq!(apply_modifiers(7, &[]), 7);
    }
}
