//! Category-based target resolution.

use crate::types::{CategorySet, Destination, DestinationId};

/// Select the destinations a dispatch run should address.
///
/// An absent or empty filter selects every destination. A non-empty filter
/// selects destinations sharing at least one category with it. Input order
/// (registration order) is preserved.
pub fn resolve_targets(
    destinations: &[Destination],
    filter: Option<&CategorySet>,
) -> Vec<DestinationId> {
    let filter = filter.filter(|f| !f.is_empty());
    destinations
        .iter()
        .filter(|dest| match filter {
            None => true,
            Some(wanted) => !dest.categories.is_disjoint(wanted),
        })
        .map(|dest| dest.id.clone())
        .collect()
}
