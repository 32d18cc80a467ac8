//! Availability + skill filter.

use crate::roster::Consultant;

/// Consultants with `availability >= min_availability` that list `skill`
/// (case-insensitive), in input order.
pub fn filter_consultants<'a>(
    consultants: &'a [Consultant],
    min_availability: f64,
    skill: &str,
) -> Vec<&'a Consultant> {
    consultants
        .iter()
        .filter(|c| c.availability() >= min_availability && c.has_skill(skill))
        .collect()
}
