use crate::models::{Macro, MacroTarget, MacroTotals};

/// Weight applied to a macro that overshoots its target.
pub const OVERSHOOT_WEIGHT: f64 = 5.0;

/// Asymmetric weighted squared relative error between achieved and target
/// macros. Lower is better; 0 is a perfect match.
///
/// Macros with a zero target are excluded from the sum entirely — the
/// relative error is undefined there and the achievement flags handle them
/// separately.
pub fn penalty(actual: &MacroTotals, target: &MacroTarget) -> f64 {
    Macro::ALL
        .iter()
        .filter_map(|&m| {
            let t = target.get(m);
            if t <= 0.0 {
                return None;
            }
            let a = actual.get(m);
            let weight = if a <= t { 1.0 } else { OVERSHOOT_WEIGHT };
            let rel = (a - t) / t;
            Some(weight * rel * rel)
        })
        .sum()
}
