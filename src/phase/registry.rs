//! Phase registry
//!
//! The single construction point for phases. Every call hands back a new
//! value; nothing is cached or shared between calls.

use crate::error::PhaseError;

use super::state::Phase;

/// Maximum Damerau-Levenshtein distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Stateless factory mapping phase identifiers to phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseRegistry;

impl PhaseRegistry {
    /// Creates the phase named by `identifier`.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError::UnknownPhase` for an unrecognized identifier,
    /// with a suggestion when a known identifier is close enough.
    pub fn create(identifier: &str) -> Result<Phase, PhaseError> {
        match identifier {
            "orbit" => Ok(Phase::Orbit),
            "descending" => Ok(Phase::Descending),
            "engine-cutoff" => Ok(Phase::EngineCutoff),
            "landed" => Ok(Phase::Landed),
            _ => Err(PhaseError::UnknownPhase {
                name: identifier.to_string(),
                suggestion: suggest_phase(identifier),
            }),
        }
    }

    /// Creates the phase every mission starts in.
    #[must_use]
    pub const fn initial() -> Phase {
        Phase::INITIAL
    }

    /// Returns every known identifier in mission order.
    #[must_use]
    pub fn identifiers() -> Vec<&'static str> {
        Phase::ALL.iter().map(|p| p.id()).collect()
    }

    /// Returns every phase in mission order.
    #[must_use]
    pub const fn all() -> [Phase; 4] {
        Phase::ALL
    }
}

/// Suggests a known phase identifier for typo correction.
///
/// Returns the closest identifier if its Damerau-Levenshtein distance
/// is at most 3.
#[must_use]
pub fn suggest_phase(input: &str) -> Option<String> {
    Phase::ALL
        .iter()
        .map(|p| (p.id(), strsim::damerau_levenshtein(input, p.id())))
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}
