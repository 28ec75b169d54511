//! Display-name ordering for user listings.

use std::cmp::Ordering;

/// Compares two optional display names: absent names sort first, present
/// names sort case-insensitively. Callers use a stable sort, so entries
/// with equal keys keep their original provider order.
pub fn compare_display_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}
