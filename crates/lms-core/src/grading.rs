//! Final grade derivation.
//!
//! A course result combines the continuous-assessment (CA) score and the
//! final exam score with fixed weights:
//!
//! ```text
//! percentage = round(ca * 0.4 + final * 0.6)
//! ```
//!
//! The percentage maps to a letter grade through fixed breakpoints, and a
//! result is a pass at 60 or above.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight of the continuous-assessment score.
pub const CA_WEIGHT: f64 = 0.4;

/// Weight of the final exam score.
pub const FINAL_EXAM_WEIGHT: f64 = 0.6;

/// Minimum percentage for a passing result.
pub const PASS_MARK: u8 = 60;

/// Letter grade scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    /// 90 and above.
    #[serde(rename = "A+")]
    APlus,
    /// 85 to 89.
    #[serde(rename = "A")]
    A,
    /// 80 to 84.
    #[serde(rename = "A-")]
    AMinus,
    /// 75 to 79.
    #[serde(rename = "B+")]
    BPlus,
    /// 70 to 74.
    #[serde(rename = "B")]
    B,
    /// 65 to 69.
    #[serde(rename = "B-")]
    BMinus,
    /// 60 to 64.
    #[serde(rename = "C+")]
    CPlus,
    /// 55 to 59.
    #[serde(rename = "C")]
    C,
    /// 50 to 54.
    #[serde(rename = "C-")]
    CMinus,
    /// 45 to 49.
    #[serde(rename = "D+")]
    DPlus,
    /// 40 to 44.
    #[serde(rename = "D")]
    D,
    /// Below 40.
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Breakpoints, highest first.
    const SCALE: [(u8, Self); 11] = [
        (90, Self::APlus),
        (85, Self::A),
        (80, Self::AMinus),
        (75, Self::BPlus),
        (70, Self::B),
        (65, Self::BMinus),
        (60, Self::CPlus),
        (55, Self::C),
        (50, Self::CMinus),
        (45, Self::DPlus),
        (40, Self::D),
    ];

    /// Map a percentage to its letter grade.
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        Self::SCALE
            .iter()
            .find(|(min, _)| percentage >= *min)
            .map_or(Self::F, |(_, grade)| *grade)
    }

    /// The grade as displayed, e.g. `"A-"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived fields of a course result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOutcome {
    /// Weighted percentage, rounded to the nearest integer.
    pub percentage: u8,
    /// Letter grade for `percentage`.
    pub grade: LetterGrade,
    /// Whether `percentage` reaches [`PASS_MARK`].
    pub passed: bool,
}

/// Errors produced by [`compute_result`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    /// A score was outside `[0, 100]` or not a finite number.
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange {
        /// Name of the offending input.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

fn check_score(field: &'static str, value: f64) -> Result<f64, GradeError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(GradeError::OutOfRange { field, value })
    }
}

/// Compute percentage, letter grade and pass/fail from the two scores.
///
/// # Errors
///
/// Returns [`GradeError::OutOfRange`] if either score is outside `[0, 100]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn compute_result(ca_score: f64, final_exam_score: f64) -> Result<GradeOutcome, GradeError> {
    let ca = check_score("caScore", ca_score)?;
    let exam = check_score("finalExamScore", final_exam_score)?;

    // Both inputs are in [0, 100], so the rounded value fits in a u8. Each
    // weighted term is rounded before the sum, with no fused multiply-add.
    let percentage = (ca * CA_WEIGHT + exam * FINAL_EXAM_WEIGHT).round() as u8;

    Ok(GradeOutcome {
        percentage,
        grade: LetterGrade::from_percentage(percentage),
        passed: percentage >= PASS_MARK,
    })
}
