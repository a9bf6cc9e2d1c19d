//! Roll use cases: dice, ranged rolls, gambling, attacks, saving throws, and
//! per-player modifier stacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use necronomicore_domain::{
    apply_modifiers, GamblingBand, PlayerId, RollModifier, RollResult, FLAVOR_AI_PLACEHOLDER,
    FLAVOR_CRITICAL_FAILURE, FLAVOR_CRITICAL_SUCCESS, FLAVOR_PLAIN,
};

use crate::infrastructure::ports::RandomPort;

const ATTACK_CRITICAL_FLAVOR: &str = "A devastating blow! Fungal tendrils erupt from the wound.";
const ATTACK_HIT_FLAVOR: &str = "Your strike connects.";
const SAVE_NATURAL_20_FLAVOR: &str = "Against all odds, you resist the horror!";
const SAVE_NATURAL_1_FLAVOR: &str = "Your mind fractures. Sanity slips away...";
const SAVE_SUCCESS_FLAVOR: &str = "You steel yourself against the darkness.";
const SAVE_FAILURE_FLAVOR: &str = "The eldritch forces overwhelm you.";

pub struct RollService {
    random: Arc<dyn RandomPort>,
    modifiers: DashMap<PlayerId, Vec<RollModifier>>,
    ai_flavor: AtomicBool,
}

impl RollService {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self {
            random,
            modifiers: DashMap::new(),
            ai_flavor: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, seed: u64) {
        self.random.reseed(seed);
    }

    pub fn set_ai_flavor_enabled(&self, enabled: bool) {
        self.ai_flavor.store(enabled, Ordering::Relaxed);
    }

    pub fn is_ai_flavor_enabled(&self) -> bool {
        self.ai_flavor.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Basic rolls
    // =========================================================================

    /// Sum of `count` rolls of a `sides`-sided die. 0 if either is below 1.
    pub fn roll_dice(&self, count: i32, sides: i32) -> i32 {
        if count < 1 || sides < 1 {
            return 0;
        }
        (0..count).fold(0i32, |total, _| {
            total.saturating_add(self.random.gen_range(1, sides))
        })
    }

    /// Uniform in `min..=max`.
    pub fn roll_range(&self, min: i32, max: i32) -> i32 {
        self.random.gen_range(min, max)
    }

    /// `true` with probability `chance` (0.0 to 1.0).
    pub fn roll_percentage(&self, chance: f32) -> bool {
        self.random.gen_unit() <= chance
    }

    /// Range roll with critical bands at the top and bottom tenth.
    pub fn roll_with_context(&self, min: i32, max: i32, context: &str) -> RollResult {
        let value = self.roll_range(min, max);
        let mut result = RollResult::new(value, min, max, context).with_critical_bands();
        result.flavor_text = self.flavor_for(&result).to_string();
        tracing::debug!(
            value,
            min,
            max,
            context,
            critical_success = result.critical_success,
            critical_failure = result.critical_failure,
            "Roll"
        );
        result
    }

    fn flavor_for(&self, result: &RollResult) -> &'static str {
        if self.is_ai_flavor_enabled() {
            FLAVOR_AI_PLACEHOLDER
        } else if result.critical_success {
            FLAVOR_CRITICAL_SUCCESS
        } else if result.critical_failure {
            FLAVOR_CRITICAL_FAILURE
        } else {
            FLAVOR_PLAIN
        }
    }

    // =========================================================================
    // Situational rolls
    // =========================================================================

    /// A 0-100 draw read against the gambling bands.
    pub fn roll_gambling(&self, game_type: &str, bet: i32) -> RollResult {
        let value = self.roll_range(0, 100);
        let band = GamblingBand::from_roll(value);
        tracing::debug!(game_type, bet, value, ?band, "Gambling roll");

        let mut result = RollResult::new(value, 0, 100, format!("Gambling: {game_type}"))
            .with_flavor(band.flavor());
        result.critical_success = band.is_critical_success();
        result.critical_failure = band.is_critical_failure();
        result
    }

    /// Critical hits deal double `base`; other hits land in `base/2..=base`.
    pub fn roll_attack(&self, base_damage: i32, critical_chance: f32) -> RollResult {
        let critical = self.roll_percentage(critical_chance);
        let value = if critical {
            base_damage.saturating_mul(2)
        } else {
            self.roll_range(base_damage / 2, base_damage)
        };

        let mut result = RollResult::new(value, 0, base_damage, "Attack").with_flavor(if critical {
            ATTACK_CRITICAL_FLAVOR
        } else {
            ATTACK_HIT_FLAVOR
        });
        result.critical_success = critical;
        result
    }

    /// d20 against `difficulty`. A natural 20 always succeeds, a natural 1 always fails.
    pub fn roll_saving_throw(&self, difficulty: i32, situation: &str) -> RollResult {
        let roll = self.roll_dice(1, 20);
        let mut result = RollResult::new(roll, 1, 20, format!("Saving throw: {situation}"));

        let flavor = match roll {
            20 => {
                result.critical_success = true;
                SAVE_NATURAL_20_FLAVOR
            }
            1 => {
                result.critical_failure = true;
                SAVE_NATURAL_1_FLAVOR
            }
            r if r >= difficulty => SAVE_SUCCESS_FLAVOR,
            _ => SAVE_FAILURE_FLAVOR,
        };
        result.with_flavor(flavor)
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    pub fn add_modifier(&self, player: &PlayerId, modifier: RollModifier) {
        self.modifiers
            .entry(player.clone())
            .or_default()
            .push(modifier);
    }

    /// Remove every modifier named `name`. Returns how many were removed.
    pub fn remove_modifier(&self, player: &PlayerId, name: &str) -> usize {
        let Some(mut stack) = self.modifiers.get_mut(player) else {
            return 0;
        };
        let before = stack.len();
        stack.retain(|modifier| modifier.name != name);
        before - stack.len()
    }

    pub fn clear_all_modifiers(&self, player: &PlayerId) {
        self.modifiers.remove(player);
    }

    pub fn active_modifiers(&self, player: &PlayerId) -> Vec<RollModifier> {
        self.modifiers
            .get(player)
            .map(|stack| stack.clone())
            .unwrap_or_default()
    }

    /// `base` shifted by the player's stack; unchanged when the stack is empty.
    pub fn apply_modifiers(&self, base: i32, player: &PlayerId) -> i32 {
        match self.modifiers.get(player) {
            Some(stack) => apply_modifiers(base, &stack),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::random::{FixedRandom, SystemRandom};

    fn service(value: i32) -> RollService {
        RollService::new(Arc::new(FixedRandom::new(value)))
    }

    #[test]
    fn one_to_ten_critical_bands() {
        let hit = service(10).roll_with_context(1, 10, "Test");
        assert!(hit.critical_success && !hit.critical_failure);
        assert_eq!(hit.flavor_text, FLAVOR_CRITICAL_SUCCESS);

        let miss = service(1).roll_with_context(1, 10, "Test");
        assert!(miss.critical_failure && !miss.critical_success);
        assert_eq!(miss.flavor_text, FLAVOR_CRITICAL_FAILURE);

        let plain = service(5).roll_with_context(1, 10, "Test");
        assert!(!plain.critical_success && !plain.critical_failure);
        assert_eq!(plain.flavor_text, FLAVOR_PLAIN);
        assert_eq!(plain.context, "Test");
    }

    #[test]
    fn ai_flavor_uses_placeholder() {
        let rolls = service(5);
        rolls.set_ai_flavor_enabled(true);
        assert_eq!(rolls.roll_with_context(1, 10, "Test").flavor_text, FLAVOR_AI_PLACEHOLDER);
    }

    #[test]
    fn saving_throw_naturals() {
        let natural_20 = service(20).roll_saving_throw(25, "spore cloud");
        assert!(natural_20.critical_success);
        assert_eq!(natural_20.flavor_text, SAVE_NATURAL_20_FLAVOR);
        assert_eq!(natural_20.context, "Saving throw: spore cloud");

        let natural_1 = service(1).roll_saving_throw(0, "spore cloud");
        assert!(natural_1.critical_failure);
        assert_eq!(natural_1.flavor_text, SAVE_NATURAL_1_FLAVOR);

        assert_eq!(service(12).roll_saving_throw(12, "x").flavor_text, SAVE_SUCCESS_FLAVOR);
        assert_eq!(service(11).roll_saving_throw(12, "x").flavor_text, SAVE_FAILURE_FLAVOR);
    }

    #[test]
    fn attack_critical_doubles_base() {
        let crit = RollService::new(Arc::new(FixedRandom::new(0).with_unit(0.01)));
        let result = crit.roll_attack(10, 0.5);
        assert_eq!(result.value, 20);
        assert!(result.critical_success);
        assert_eq!(result.flavor_text, ATTACK_CRITICAL_FLAVOR);

        let normal = RollService::new(Arc::new(FixedRandom::new(0).with_unit(0.99)));
        let result = normal.roll_attack(10, 0.5);
        assert_eq!(result.value, 5);
        assert_eq!((result.min, result.max), (0, 10));
        assert_eq!(result.flavor_text, ATTACK_HIT_FLAVOR);
    }

    #[test]
    fn gambling_bands_and_context() {
        let win = service(80).roll_gambling("dice", 50);
        assert!(win.critical_success);
        assert_eq!(win.context, "Gambling: dice");

        let disaster = service(3).roll_gambling("cards", 10);
        assert!(disaster.critical_failure);
        assert_eq!(disaster.flavor_text, GamblingBand::CriticalLoss.flavor());

        let neutral = service(30).roll_gambling("cards", 10);
        assert!(!neutral.critical_success && !neutral.critical_failure);
    }

    #[test]
    fn dice_sum_and_degenerate_input() {
        let rolls = service(4);
        assert_eq!(rolls.roll_dice(3, 6), 12);
        assert_eq!(rolls.roll_dice(0, 6), 0);
        assert_eq!(rolls.roll_dice(2, 0), 0);

        let real = RollService::new(Arc::new(SystemRandom::with_seed(1)));
        for _ in 0..50 {
            let total = real.roll_dice(2, 6);
            assert!((2..=12).contains(&total));
        }
    }

    #[test]
    fn seeding_reproduces_rolls() {
        let rolls = RollService::new(Arc::new(SystemRandom::new()));
        rolls.seed(1234);
        let first: Vec<i32> = (0..10).map(|_| rolls.roll_range(1, 1000)).collect();
        rolls.seed(1234);
        let second: Vec<i32> = (0..10).map(|_| rolls.roll_range(1, 1000)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn modifier_stack_per_player() {
        let rolls = service(0);
        let player = PlayerId::default_player();
        let rival = PlayerId::new("rival");

        assert_eq!(rolls.apply_modifiers(10, &player), 10);

        rolls.add_modifier(&player, RollModifier::new("lucky charm", 2, 1.5));
        rolls.add_modifier(&player, RollModifier::new("spore curse", -1, 0.5));
        rolls.add_modifier(&player, RollModifier::new("ritual", 3, 2.0));
        assert_eq!(rolls.apply_modifiers(10, &player), 21);
        assert_eq!(rolls.apply_modifiers(10, &rival), 10);

        assert_eq!(rolls.remove_modifier(&player, "spore curse"), 1);
        assert_eq!(rolls.remove_modifier(&player, "missing"), 0);
        assert_eq!(rolls.active_modifiers(&player).len(), 2);
        // (10 + 5) * 3.0
        assert_eq!(rolls.apply_modifiers(10, &player), 45);

        rolls.clear_all_modifiers(&player);
        assert!(rolls.active_modifiers(&player).is_empty());
        assert_eq!(rolls.apply_modifiers(10, &player), 10);
    }
}
