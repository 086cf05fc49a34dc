//! Damage calculation
//!
//! Handles all combat math: weapon dice, AOE falloff, armour and shield
//! reductions, and projectile ray hits.

use rand::Rng;
use thiserror::Error;

use crate::ecs::Vec2;

/// Damage used when weapon dice notation cannot be parsed
pub const FALLBACK_DAMAGE: i32 = 5;
/// Most dice a single notation may roll
pub const MAX_DICE_COUNT: u32 = 1000;

/// Errors surfaced by the external-facing combat mutators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombatError {
    #[error("negative amount rejected: {0}")]
    NegativeAmount(i32),

    #[error("entity {0:?} does not exist")]
    UnknownEntity(hecs::Entity),

    #[error("entity {0:?} has no combat stats")]
    NotCombatant(hecs::Entity),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),
}

/// Parse "NdM" dice notation (case-insensitive).
///
/// Both numbers must be at least 1. Counts above `MAX_DICE_COUNT` and sizes
/// that do not fit an `i32` are rejected.
pub fn parse_dice(notation: &str) -> Option<(u32, u32)> {
    let lower = notation.trim().to_ascii_lowercase();
    let (count, size) = lower.split_once('d')?;
    let count: u32 = count.trim().parse().ok()?;
    let size: u32 = size.trim().parse().ok()?;
    if count == 0 || size == 0 || count > MAX_DICE_COUNT || size > i32::MAX as u32 {
        return None;
    }
    Some((count, size))
}

/// Roll weapon damage from dice notation, falling back to `FALLBACK_DAMAGE`
pub fn roll_damage(notation: &str, rng: &mut (impl Rng + ?Sized)) -> i32 {
    match parse_dice(notation) {
        Some((count, size)) => (0..count).fold(0i32, |total, _| {
            let roll = i32::try_from(rng.gen_range(1..=size)).unwrap_or(i32::MAX);
            total.saturating_add(roll)
        }),
        None => {
            log::debug!("Malformed dice notation {:?}, using fallback damage", notation);
            FALLBACK_DAMAGE
        }
    }
}

/// Linear AOE falloff: full damage at the centre, half at the edge.
///
/// Returns `None` for targets at or beyond `radius`.
pub fn falloff_damage(base: i32, distance: f32, radius: f32) -> Option<i32> {
    if radius <= 0.0 || distance >= radius {
        return None;
    }
    let multiplier = 1.0 - (distance / radius) * 0.5;
    Some((base as f32 * multiplier) as i32)
}

/// Apply a whole-percent reduction with integer arithmetic
pub fn reduce_by_percent(amount: i32, percent: i32) -> i32 {
    let percent = i64::from(percent.clamp(0, 100));
    let reduced = i64::from(amount) * (100 - percent) / 100;
    // Fits: never larger in magnitude than `amount`
    reduced as i32
}

/// Necromancer minion shield: 5% per minion, capped at 30%
pub fn minion_shield_percent(minion_count: usize) -> i32 {
    (minion_count as i32).saturating_mul(5).min(30)
}

/// Tank armour: base reduction plus 5% per stack, as whole percent
pub fn armor_percent(base_reduction: f32, stacks: u32) -> i32 {
    ((base_reduction + stacks as f32 * 0.05) * 100.0).round() as i32
}

/// Armour reduction floored at 1 for any non-zero hit
pub fn armored_damage(amount: i32, percent: i32) -> i32 {
    if amount <= 0 {
        return 0;
    }
    reduce_by_percent(amount, percent).max(1)
}

/// Does a ray from `origin` along `direction` pass within `radius` of `target`
/// before travelling `range`?
pub fn ray_hits(origin: Vec2, direction: Vec2, range: f32, target: Vec2, radius: f32) -> bool {
    let dir = direction.normalized();
    if dir == Vec2::ZERO {
        return origin.distance(target) <= radius;
    }
    let to_target = target - origin;
    let along = to_target.dot(dir).clamp(0.0, range);
    let closest = origin + dir * along;
    closest.distance(target) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roll_damage_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let roll = roll_damage("2d6", &mut rng);
            assert!((2..=12).contains(&roll), "roll out of range: {}", roll);
        }
    }

    #[test]
    fn test_roll_damage_malformed() {
        let mut rng = StdRng::seed_from_u64(1);
        for notation in ["garbage", "", "d6", "2d", "0d6", "2d0", "-1d6", "2x6"] {
            assert_eq!(roll_damage(notation, &mut rng), FALLBACK_DAMAGE, "{}", notation);
        }
    }

    #[test]
    fn test_parse_dice_case_insensitive() {
        assert_eq!(parse_dice("3D8"), Some((3, 8)));
        assert_eq!(parse_dice(" 1d4 "), Some((1, 4)));
    }

    #[test]
    fn test_oversized_dice_fall_back() {
        let mut rng = StdRng::seed_from_u64(3);
        for notation in ["1d4000000000", "4000000000d6", "1001d6", "1d2147483648"] {
            assert_eq!(parse_dice(notation), None, "{}", notation);
            assert_eq!(roll_damage(notation, &mut rng), FALLBACK_DAMAGE, "{}", notation);
        }
    }

    #[test]
    fn test_huge_dice_stay_positive() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let roll = roll_damage("1d2147483647", &mut rng);
            assert!(roll >= 1, "roll wrapped: {}", roll);
        }
        for _ in 0..20 {
            let roll = roll_damage("1000d2147483647", &mut rng);
            assert!(roll >= 1000, "sum wrapped: {}", roll);
        }
        let roll = roll_damage("1000d6", &mut rng);
        assert!((1000..=6000).contains(&roll));
    }

    #[test]
    fn test_ground_pound_falloff() {
        assert_eq!(falloff_damage(25, 0.0, 150.0), Some(25));
        assert_eq!(falloff_damage(25, 75.0, 150.0), Some(18));
        assert_eq!(falloff_damage(25, 150.0, 150.0), None);
        assert_eq!(falloff_damage(25, 400.0, 150.0), None);
    }

    #[test]
    fn test_minion_shield() {
        let effective: Vec<i32> = [0, 1, 6, 10]
            .iter()
            .map(|&n| reduce_by_percent(100, minion_shield_percent(n)))
            .collect();
        assert_eq!(effective, vec![100, 95, 70, 70]);
    }

    #[test]
    fn test_reduction_handles_extreme_hits() {
        assert_eq!(reduce_by_percent(i32::MAX, 0), i32::MAX);
        assert_eq!(reduce_by_percent(i32::MAX, 10), 1_932_735_282);
        assert_eq!(reduce_by_percent(100_000_000, 45), 55_000_000);
        assert_eq!(armored_damage(i32::MAX, armor_percent(0.2, 5)), 1_181_116_005);
    }

    #[test]
    fn test_armor_reduction() {
        assert_eq!(armor_percent(0.2, 0), 20);
        assert_eq!(armor_percent(0.2, 5), 45);
        assert_eq!(armored_damage(188, armor_percent(0.2, 0)), 150);
        assert_eq!(armored_damage(1, armor_percent(0.2, 5)), 1);
        assert_eq!(armored_damage(0, 20), 0);
    }

    #[test]
    fn test_ray_hits() {
        let origin = Vec2::new(0.0, 0.0);
        let east = Vec2::new(1.0, 0.0);
        assert!(ray_hits(origin, east, 500.0, Vec2::new(200.0, 10.0), 16.0));
        assert!(!ray_hits(origin, east, 500.0, Vec2::new(200.0, 40.0), 16.0));
        assert!(!ray_hits(origin, east, 100.0, Vec2::new(200.0, 0.0), 16.0));
        assert!(!ray_hits(origin, east, 500.0, Vec2::new(-200.0, 0.0), 16.0));
    }
}
