use serde::{Deserialize, Serialize};

use crate::ids::ExecutorId;

/// A registered grading executor as seen by the registry.
///
/// `current_load` counts in-flight dispatches and is only ever mutated
/// through the load accounting operations, never by plain row writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Executor {
    pub id: ExecutorId,
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
    pub current_load: i32,
}

impl Executor {
    /// Whether this executor has no spare capacity left.
    pub fn at_capacity(&self) -> bool {
        self.current_load >= self.max_load
    }
}

/// Input for registering a new executor. Load starts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExecutor {
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
}

/// Input for updating an existing executor's declared properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorUpdate {
    pub name: String,
    pub base_url: String,
    pub max_load: i32,
}
