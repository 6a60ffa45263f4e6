use serde::{Deserialize, Serialize};

/// Strongly typed ID for grading executors.
///
/// Ordering matters: selection tie-breaks and registry listings are defined
/// by ascending executor id.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct ExecutorId(pub i64);

impl ExecutorId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ExecutorId {
    fn from(id: i64) -> Self {
        ExecutorId(id)
    }
}

impl std::fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed ID for exercises.
///
/// Rendered in decimal wherever it crosses a wire boundary (request paths
/// and signature inputs).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Serialize, Deserialize,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct ExerciseId(pub i64);

impl ExerciseId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ExerciseId {
    fn from(id: i64) -> Self {
        ExerciseId(id)
    }
}

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
