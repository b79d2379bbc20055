//! Parent links between participations.
//!
//! Organizational seat memberships point at the organization's own
//! participation. Links must form a forest: no participation may reach
//! itself by following parents.

use std::collections::HashSet;

use crate::domain::foundation::{ParticipationId, ValidationError};

/// Upper bound on ancestor chain length before the walk gives up.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Checks that linking `child` under `parent` keeps the hierarchy acyclic.
///
/// `parent_of` returns the current parent of a participation. The walk is
/// iterative and starts at the proposed parent; reaching `child` means the
/// new link would close a cycle.
pub fn ensure_acyclic_link<F>(
    child: ParticipationId,
    parent: ParticipationId,
    mut parent_of: F,
) -> Result<(), ValidationError>
where
    F: FnMut(ParticipationId) -> Option<ParticipationId>,
{
    if child == parent {
        return Err(ValidationError::invalid_format(
            "parent",
            "a participation cannot be its own parent",
        ));
    }

    let mut seen = HashSet::new();
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == child {
            return Err(ValidationError::invalid_format(
                "parent",
                format!("linking {} under {} creates a cycle", child, parent),
            ));
        }
        if !seen.insert(current) {
            return Err(ValidationError::invalid_format(
                "parent",
                format!("existing hierarchy above {} already contains a cycle", parent),
            ));
        }
        if seen.len() > MAX_HIERARCHY_DEPTH {
            return Err(ValidationError::out_of_range(
                "parent",
                0,
                MAX_HIERARCHY_DEPTH as i64,
                seen.len() as i64,
            ));
        }
        cursor = parent_of(current);
    }
    Ok(())
}
