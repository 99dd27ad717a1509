//! # Game Mathematics
//!
//! Damage formulas truncate after every multiplication, so the helpers here
//! floor each step instead of simplifying a chain algebraically.

/// Multiplies and floors: `floor(value * factor)`.
///
/// # Examples
///
/// ```
/// use wizard_duel::floor_mul;
///
/// assert_eq!(floor_mul(10, 1.5), 15);
/// assert_eq!(floor_mul(7, 0.5), 3);
/// assert_eq!(floor_mul(3, 0.08), 0);
/// ```
pub fn floor_mul(value: i64, factor: f64) -> i64 {
    (value as f64 * factor).floor() as i64
}

/// Floors a fractional value into an integer amount.
pub fn floor_f(value: f64) -> i64 {
    value.floor() as i64
}

/// Adds `amount` to `current` without exceeding `max`.
///
/// Returns the new value and how much was actually gained.
pub fn heal_clamped(current: i64, amount: i64, max: i64) -> (i64, i64) {
    if amount <= 0 || current >= max {
        return (current.min(max), 0);
    }
    let next = (current + amount).min(max);
    (next, next - current)
}

/// True when `hp` is strictly below `fraction` of `max_hp`.
pub fn below_fraction(hp: i64, max_hp: i64, fraction: f64) -> bool {
    (hp as f64) < max_hp as f64 * fraction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_mul_truncates_each_step() {
        // floor(floor(7 * 1.5) * 1.5) = floor(10 * 1.5) = 15, not floor(15.75)
        let stepped = floor_mul(floor_mul(7, 1.5), 1.5);
        assert_eq!(stepped, 15);
        assert_eq!(floor_f(7.0 * 1.5 * 1.5), 15);
        assert_eq!(floor_mul(9, 1.5 * 1.5), 20);
        assert_eq!(floor_mul(floor_mul(9, 1.5), 1.5), 19);
    }

    #[test]
    fn test_heal_clamped() {
        assert_eq!(heal_clamped(90, 20, 100), (100, 10));
        assert_eq!(heal_clamped(50, 0, 100), (50, 0));
        assert_eq!(heal_clamped(100, 5, 100), (100, 0));
        assert_eq!(heal_clamped(120, 5, 100), (100, 0));
    }

    #[test]
    fn test_below_fraction() {
        assert!(below_fraction(29, 100, 0.3));
        assert!(!below_fraction(30, 100, 0.3));
    }
}
