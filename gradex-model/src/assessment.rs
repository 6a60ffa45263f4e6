use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Outcome of one automatic assessment: a grade in `[0, 100]` and free-form
/// feedback text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    grade: i32,
    feedback: String,
}

impl Assessment {
    /// Construct an assessment, rejecting out-of-range grades. Grades are
    /// never clamped.
    pub fn new(grade: i32, feedback: impl Into<String>) -> Result<Self> {
        if !(0..=100).contains(&grade) {
            return Err(ModelError::GradeOutOfRange(grade));
        }
        Ok(Self {
            grade,
            feedback: feedback.into(),
        })
    }

    pub fn grade(&self) -> i32 {
        self.grade
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}
