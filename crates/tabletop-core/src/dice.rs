//! Dice formulas, roll resolution and the floating numbers that show results
//! above a token.

use std::fmt;
use std::str::FromStr;

use kurbo::Point;
use rand::Rng;
use thiserror::Error;

use crate::scene::ImageEntity;

/// Formula pre-filled in the roll dialog.
pub const DEFAULT_FORMULA: &str = "1d20+0";

/// Upper bound on dice per roll.
pub const MAX_DICE: u32 = 1000;

/// Upper bound on the absolute roll modifier.
pub const MAX_MODIFIER: i64 = 1_000_000;

/// A formula the roll dialog cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid format '{0}'. Use NdS or NdS+M, e.g. 1d20+2 or 2d6-1")]
    Malformed(String),
    #[error("Roll at least one die")]
    ZeroDice,
    #[error("Dice need at least one side")]
    ZeroSides,
    #[error("Too many dice (max {MAX_DICE})")]
    TooManyDice,
    #[error("Modifier out of range (max {MAX_MODIFIER})")]
    ModifierOutOfRange,
}

/// A parsed `NdS[+/-M]` formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceFormula {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

impl FromStr for DiceFormula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || DiceError::Malformed(trimmed.to_string());

        let (count, rest) = trimmed
            .split_once(['d', 'D'])
            .ok_or_else(malformed)?;
        let (sides, modifier) = match rest.find(['+', '-']) {
            Some(i) => (&rest[..i], Some(&rest[i..])),
            None => (rest, None),
        };

        let count = parse_digits(count).ok_or_else(malformed)?;
        let sides = parse_digits(sides).ok_or_else(malformed)?;
        let modifier = match modifier {
            Some(m) => {
                let magnitude = parse_digits(&m[1..]).ok_or_else(malformed)?;
                let magnitude = i64::try_from(magnitude)
                    .ok()
                    .filter(|&v| v <= MAX_MODIFIER)
                    .ok_or(DiceError::ModifierOutOfRange)?;
                if m.starts_with('-') { -magnitude } else { magnitude }
            }
            None => 0,
        };

        let count = u32::try_from(count).map_err(|_| DiceError::TooManyDice)?;
        if count == 0 {
            return Err(DiceError::ZeroDice);
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice);
        }
        let sides = u32::try_from(sides).map_err(|_| malformed())?;
        if sides == 0 {
            return Err(DiceError::ZeroSides);
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }
}

/// Non-empty ASCII digits only; no signs or whitespace.
fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}{:+}", self.count, self.sides, self.modifier)
    }
}

/// Source of individual die results.
pub trait DieRoller {
    /// A uniform integer in `[1, sides]`.
    fn roll(&mut self, sides: u32) -> u32;
}

/// Rolls with the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRoller;

impl DieRoller for ThreadRoller {
    fn roll(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides)
    }
}

/// Outcome of a roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollResult {
    pub total: i64,
    pub rolls: Vec<u32>,
    pub modifier: i64,
}

impl RollResult {
    /// Breakdown such as `[4+5]+3`.
    pub fn detail(&self) -> String {
        let rolls: Vec<String> = self.rolls.iter().map(u32::to_string).collect();
        format!("[{}]{:+}", rolls.join("+"), self.modifier)
    }
}

impl DiceFormula {
    pub fn roll(&self, roller: &mut dyn DieRoller) -> RollResult {
        let rolls: Vec<u32> = (0..self.count).map(|_| roller.roll(self.sides)).collect();
        let sum: i64 = rolls.iter().map(|&r| r as i64).sum();
        RollResult {
            total: sum + self.modifier,
            rolls,
            modifier: self.modifier,
        }
    }
}

/// Parse and roll in one step.
pub fn roll_formula(formula: &str, roller: &mut dyn DieRoller) -> Result<RollResult, DiceError> {
    let parsed: DiceFormula = formula.parse()?;
    let result = parsed.roll(roller);
    log::debug!("Rolled {parsed}: {} = {}", result.detail(), result.total);
    Ok(result)
}

/// A roll result drifting up and fading out above an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingNumber {
    pub position: Point,
    pub result: RollResult,
    pub opacity: f64,
    /// Milliseconds since spawn.
    pub lifetime: f64,
    pub max_lifetime: f64,
}

/// Animation parameters for floating numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatAnimation {
    pub lifetime_ms: f64,
    pub tick_ms: f64,
    /// Upward drift per tick, in world units.
    pub drift: f64,
}

impl Default for FloatAnimation {
    fn default() -> Self {
        Self {
            lifetime_ms: 3000.0,
            tick_ms: 16.0,
            drift: 0.5,
        }
    }
}

/// Active floating numbers. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct FloatingNumbers {
    items: Vec<FloatingNumber>,
    animation: FloatAnimation,
}

impl FloatingNumbers {
    pub fn new(animation: FloatAnimation) -> Self {
        Self {
            items: Vec::new(),
            animation,
        }
    }

    pub fn items(&self) -> &[FloatingNumber] {
        &self.items
    }

    pub fn is_active(&self) -> bool {
        !self.items.is_empty()
    }

    /// Spawn a result 50 units above the top edge of `anchor`.
    pub fn spawn(&mut self, anchor: &ImageEntity, result: RollResult) {
        let top = anchor.y - anchor.height * anchor.scale / 2.0 - 50.0;
        self.items.push(FloatingNumber {
            position: Point::new(anchor.x, top),
            result,
            opacity: 1.0,
            lifetime: 0.0,
            max_lifetime: self.animation.lifetime_ms,
        });
    }

    /// Advance one animation frame. Returns whether anything is still alive,
    /// i.e. whether another frame should be scheduled.
    pub fn tick(&mut self) -> bool {
        let FloatAnimation { tick_ms, drift, .. } = self.animation;
        self.items.retain_mut(|n| {
            n.lifetime += tick_ms;
            if n.lifetime >= n.max_lifetime {
                return false;
            }
            n.opacity = 1.0 - n.lifetime / n.max_lifetime;
            n.position.y -= drift;
            true
        });
        self.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use std::collections::VecDeque;

    struct Forced(VecDeque<u32>);

    impl DieRoller for Forced {
        fn roll(&mut self, _sides: u32) -> u32 {
            self.0.pop_front().unwrap()
        }
    }

    #[test]
    fn test_parse() {
        let f: DiceFormula = "2d6+3".parse().unwrap();
        assert_eq!(f, DiceFormula { count: 2, sides: 6, modifier: 3 });
        let f: DiceFormula = " 1D20-2 ".parse().unwrap();
        assert_eq!(f, DiceFormula { count: 1, sides: 20, modifier: -2 });
        let f: DiceFormula = "3d8".parse().unwrap();
        assert_eq!(f.modifier, 0);
        assert_eq!(f.to_string(), "3d8+0");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["bad", "d6", "2d", "2d6+", "2d6+-1", "2 d6", "2d6 +1", "2d6+1d4", "+2d6", ""] {
            assert!(
                matches!(bad.parse::<DiceFormula>(), Err(DiceError::Malformed(_))),
                "{bad:?} should be malformed"
            );
        }
        assert_eq!("0d6".parse::<DiceFormula>(), Err(DiceError::ZeroDice));
        assert_eq!("1d0".parse::<DiceFormula>(), Err(DiceError::ZeroSides));
        assert_eq!("1001d6".parse::<DiceFormula>(), Err(DiceError::TooManyDice));
    }

    #[test]
    fn test_modifier_bounds() {
        for big in [
            "1d6+9223372036854775807",
            "1d6-9223372036854775808",
            "1d6+18446744073709551615",
            "1d6+1000001",
        ] {
            assert_eq!(big.parse::<DiceFormula>(), Err(DiceError::ModifierOutOfRange), "{big}");
        }
        // Digits beyond u64 fail to parse at all.
        assert!(matches!(
            "1d6+99999999999999999999".parse::<DiceFormula>(),
            Err(DiceError::Malformed(_))
        ));

        let mut roller = Forced(VecDeque::from([u32::MAX; 1000]));
        let result = roll_formula("1000d4294967295-1000000", &mut roller).unwrap();
        assert_eq!(result.total, 1000 * u32::MAX as i64 - 1_000_000);
        assert_eq!("1d6-1000000".parse::<DiceFormula>().unwrap().modifier, -MAX_MODIFIER);
    }

    #[test]
    fn test_forced_roll() {
        let mut roller = Forced(VecDeque::from([4, 5]));
        let result = roll_formula("2d6+3", &mut roller).unwrap();
        assert_eq!(result.total, 12);
        assert_eq!(result.rolls, vec![4, 5]);
        assert_eq!(result.detail(), "[4+5]+3");
    }

    #[test]
    fn test_negative_modifier_detail() {
        let mut roller = Forced(VecDeque::from([2]));
        let result = roll_formula("1d4-1", &mut roller).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.detail(), "[2]-1");
    }

    #[test]
    fn test_thread_roller_in_range() {
        let mut roller = ThreadRoller;
        for _ in 0..200 {
            let r = roller.roll(6);
            assert!((1..=6).contains(&r));
        }
    }

    #[test]
    fn test_floating_number_lifecycle() {
        let anchor = ImageEntity::new(1, "t", "r", Size::new(100.0, 80.0), Point::new(10.0, 200.0), 0.5);
        let mut floats = FloatingNumbers::default();
        floats.spawn(
            &anchor,
            RollResult { total: 7, rolls: vec![7], modifier: 0 },
        );
        let first = &floats.items()[0];
        assert_eq!(first.position, Point::new(10.0, 130.0));

        assert!(floats.tick());
        let n = &floats.items()[0];
        assert!((n.lifetime - 16.0).abs() < f64::EPSILON);
        assert!((n.position.y - 129.5).abs() < f64::EPSILON);
        assert!((n.opacity - (1.0 - 16.0 / 3000.0)).abs() < 1e-12);

        let mut ticks = 1;
        while floats.tick() {
            ticks += 1;
        }
        // 3000 / 16 = 187.5, removed on the 188th tick.
        assert_eq!(ticks, 187);
        assert!(!floats.is_active());
    }
}
