//! Consultant roster — the record type and the immutable set served by
//! `konsulent-api`.
//!
//! A [`Roster`] is built once at startup and shared read-only behind an
//! `Arc`; nothing mutates it afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Record ────────────────────────────────────────────────────────────────────

/// One consultant as exchanged on the wire (`/konsulenter`).
///
/// Decoding is strict: every field is required and must have the declared
/// JSON type, so a malformed upstream payload is rejected rather than coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultant {
    pub id: i64,
    pub navn: String,
    pub ferdigheter: Vec<String>,
    pub belastning_prosent: f64,
}

impl Consultant {
    pub fn new(id: i64, navn: &str, ferdigheter: &[&str], belastning_prosent: f64) -> Self {
        Self {
            id,
            navn: navn.to_string(),
            ferdigheter: ferdigheter.iter().map(|s| s.to_string()).collect(),
            belastning_prosent,
        }
    }

    /// Availability in percent: `100 - load`.
    pub fn availability(&self) -> f64 {
        100.0 - self.belastning_prosent
    }

    /// Case-insensitive exact match against the skill list.
    pub fn has_skill(&self, skill: &str) -> bool {
        let wanted = skill.to_lowercase();
        self.ferdigheter.iter().any(|s| s.to_lowercase() == wanted)
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("duplicate consultant id {0}")]
    DuplicateId(i64),
}

/// Ordered, immutable set of consultants with unique ids.
#[derive(Debug, Clone)]
pub struct Roster {
    consultants: Vec<Consultant>,
}

impl Roster {
    pub fn new(consultants: Vec<Consultant>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(consultants.len());
        for c in &consultants {
            if !seen.insert(c.id) {
                return Err(RosterError::DuplicateId(c.id));
            }
        }
        Ok(Self { consultants })
    }

    /// The fixed roster the service starts with.
    pub fn seed() -> Self {
        Self {
            consultants: vec![
                Consultant::new(1, "Anna K.", &["python", "fastapi", "docker"], 40.0),
                Consultant::new(2, "Leo T.", &["python", "javascript", "react"], 20.0),
                Consultant::new(3, "Mia S.", &["java", "spring", "kubernetes"], 90.0),
                Consultant::new(4, "Erik L.", &["python", "django", "postgresql"], 60.0),
                Consultant::new(5, "Sara M.", &["javascript", "node.js", "mongodb"], 30.0),
            ],
        }
    }

    /// All consultants in insertion order.
    pub fn all(&self) -> &[Consultant] {
        &self.consultants
    }
}
