//! Deterministic template summary. Used when no model is configured, when the
//! model call fails, and for every empty result.

use crate::roster::Consultant;

/// Render the template summary for `matches`.
///
/// `min_availability` is printed in its shortest exact form (`50`, `50.5`)
/// and `skill` exactly as given.
pub fn render(matches: &[&Consultant], min_availability: f64, skill: &str) -> String {
    if matches.is_empty() {
        return format!(
            "Fant ingen konsulenter med minst {min_availability}% tilgjengelighet og ferdigheten '{skill}'."
        );
    }

    let count = matches.len();
    let plural = if count > 1 { "er" } else { "" };
    let details = matches
        .iter()
        .map(|c| format!("{} har {:.0}% tilgjengelighet", c.navn, c.availability()))
        .collect::<Vec<_>>()
        .join(". ");

    format!(
        "Fant {count} konsulent{plural} med minst {min_availability}% tilgjengelighet og ferdigheten '{skill}'. {details}."
    )
}
