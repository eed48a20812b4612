use serde::{Deserialize, Serialize};

/// One of the four tracked macro dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Calories, Macro::Protein, Macro::Carbs, Macro::Fat];

    /// Lowercase label for logging and field-level error messages.
    pub fn label(self) -> &'static str {
        match self {
            Macro::Calories => "calories",
            Macro::Protein => "protein",
            Macro::Carbs => "carbs",
            Macro::Fat => "fat",
        }
    }
}

/// Target macro amounts for a single meal. Immutable for the duration of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTarget {
    pub calories: f64,
    pub protein: f64,
    #[serde(alias = "carbohydrates", alias = "carbohydrate")]
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTarget {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    #[inline]
    pub fn get(&self, m: Macro) -> f64 {
        match m {
            Macro::Calories => self.calories,
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// All components finite and non-negative.
    pub fn is_valid(&self) -> bool {
        Macro::ALL
            .iter()
            .all(|&m| self.get(m).is_finite() && self.get(m) >= 0.0)
    }
}

/// Aggregate macro content of a portioned ingredient set.
///
/// Always derived from quantities, never stored on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    #[inline]
    pub fn get(&self, m: Macro) -> f64 {
        match m {
            Macro::Calories => self.calories,
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    pub fn add(&mut self, other: MacroTotals) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
    }
}
