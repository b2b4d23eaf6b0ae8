//! Percentage and letter-grade calculation for exam results.
//!
//! The scale is fixed: each band is inclusive at its lower bound, so a
//! percentage of exactly 91 is an `A1` and anything below 33 is an `E`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Letter grade assigned to an exam result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeLetter {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    D,
    E,
}

/// Lower bound (inclusive) of every band, best grade first.
const BANDS: [(f64, GradeLetter); 7] = [
    (91.0, GradeLetter::A1),
    (81.0, GradeLetter::A2),
    (71.0, GradeLetter::B1),
    (61.0, GradeLetter::B2),
    (51.0, GradeLetter::C1),
    (41.0, GradeLetter::C2),
    (33.0, GradeLetter::D),
];

impl GradeLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLetter::A1 => "A1",
            GradeLetter::A2 => "A2",
            GradeLetter::B1 => "B1",
            GradeLetter::B2 => "B2",
            GradeLetter::C1 => "C1",
            GradeLetter::C2 => "C2",
            GradeLetter::D => "D",
            GradeLetter::E => "E",
        }
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A1" => Ok(GradeLetter::A1),
            "A2" => Ok(GradeLetter::A2),
            "B1" => Ok(GradeLetter::B1),
            "B2" => Ok(GradeLetter::B2),
            "C1" => Ok(GradeLetter::C1),
            "C2" => Ok(GradeLetter::C2),
            "D" => Ok(GradeLetter::D),
            "E" => Ok(GradeLetter::E),
            other => Err(format!("unknown grade letter '{}'", other)),
        }
    }
}

/// Maps a percentage onto the grading scale. NaN falls through to `E`.
pub fn calculate_grade(percentage: f64) -> GradeLetter {
    BANDS
        .iter()
        .find(|(floor, _)| percentage >= *floor)
        .map(|(_, letter)| *letter)
        .unwrap_or(GradeLetter::E)
}

/// Unrounded share of `total` obtained, in percent. Zero when `total` is zero.
pub fn raw_percentage(obtained: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    obtained / total * 100.0
}

/// Percentage rounded to one decimal place, as displayed and serialized.
pub fn percentage(obtained: f64, total: f64) -> f64 {
    (raw_percentage(obtained, total) * 10.0).round() / 10.0
}

/// Grade for a pair of marks. The letter is taken from the unrounded value.
pub fn grade_for_marks(obtained: f64, total: f64) -> GradeLetter {
    calculate_grade(raw_percentage(obtained, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_higher_band() {
        assert_eq!(calculate_grade(91.0), GradeLetter::A1);
        assert_eq!(calculate_grade(81.0), GradeLetter::A2);
        assert_eq!(calculate_grade(71.0), GradeLetter::B1);
        assert_eq!(calculate_grade(61.0), GradeLetter::B2);
        assert_eq!(calculate_grade(51.0), GradeLetter::C1);
        assert_eq!(calculate_grade(41.0), GradeLetter::C2);
        assert_eq!(calculate_grade(33.0), GradeLetter::D);
    }

    #[test]
    fn just_below_a_boundary_falls_to_the_lower_band() {
        assert_eq!(calculate_grade(90.99), GradeLetter::A2);
        assert_eq!(calculate_grade(80.9), GradeLetter::B1);
        assert_eq!(calculate_grade(32.99), GradeLetter::E);
        assert_eq!(calculate_grade(0.0), GradeLetter::E);
        assert_eq!(calculate_grade(100.0), GradeLetter::A1);
    }

    #[test]
    fn grades_never_improve_as_percentage_drops() {
        let rank = |g: GradeLetter| {
            [
                GradeLetter::A1,
                GradeLetter::A2,
                GradeLetter::B1,
                GradeLetter::B2,
                GradeLetter::C1,
                GradeLetter::C2,
                GradeLetter::D,
                GradeLetter::E,
            ]
            .iter()
            .position(|l| *l == g)
            .unwrap()
        };

        let mut seen = Vec::new();
        let mut previous = rank(calculate_grade(100.0));
        for tenth in (0..=1000).rev() {
            let grade = calculate_grade(tenth as f64 / 10.0);
            assert!(rank(grade) >= previous);
            previous = rank(grade);
            if !seen.contains(&grade) {
                seen.push(grade);
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn percentage_rounds_to_one_decimal_and_guards_zero_total() {
        assert_eq!(percentage(72.0, 100.0), 72.0);
        assert_eq!(percentage(2.0, 3.0), 66.7);
        assert_eq!(percentage(10.0, 0.0), 0.0);
    }

    #[test]
    fn letter_comes_from_unrounded_percentage() {
        // 90.96% displays as 91.0 but is still an A2.
        assert_eq!(percentage(90.96, 100.0), 91.0);
        assert_eq!(grade_for_marks(90.96, 100.0), GradeLetter::A2);
    }

    #[test]
    fn letters_parse_back() {
        assert_eq!("B1".parse::<GradeLetter>().unwrap(), GradeLetter::B1);
        assert!("Z".parse::<GradeLetter>().is_err());
    }
}
