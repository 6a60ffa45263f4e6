use gradex_model::Executor;

use crate::error::{CoreError, Result};

/// Pick the executor with the lowest relative load (`current_load /
/// max_load`).
///
/// Ratios are compared by cross-multiplication, so two distinct loads never
/// collapse into the same bucket the way integer division would, and no
/// floating point is involved. Ties fall back to the lower absolute load,
/// then the lower id, which keeps selection deterministic.
///
/// An executor at or above capacity can still be returned when nothing
/// better exists; refusing to dispatch in that case is admission-control
/// policy and belongs to the caller.
pub fn select_executor(candidates: &[Executor]) -> Result<&Executor> {
    candidates
        .iter()
        .reduce(|best, current| {
            if prefer(current, best) {
                current
            } else {
                best
            }
        })
        .ok_or(CoreError::NoExecutorAvailable)
}

/// Whether `a` should win over `b`. Strict preference only; on a full tie
/// `b` (the earlier candidate) is kept.
fn prefer(a: &Executor, b: &Executor) -> bool {
    // a.load / a.max < b.load / b.max, with max_load > 0 guaranteed by the
    // registry.
    let lhs = i64::from(a.current_load) * i64::from(b.max_load);
    let rhs = i64::from(b.current_load) * i64::from(a.max_load);
    if lhs != rhs {
        return lhs < rhs;
    }
    if a.current_load != b.current_load {
        return a.current_load < b.current_load;
    }
    a.id < b.id
}
