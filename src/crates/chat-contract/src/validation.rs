//! Shared id-pattern validation.
//!
//! Thread ids and actor instance ids share the same pattern:
//! `^[a-zA-Z0-9_.\-~]+$`. Centralized here so `actor-runtime` and
//! `chat-contract` agree on one regex instead of drifting.

use regex::Regex;
use std::sync::OnceLock;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.\-~]+$").expect("static pattern"))
}

/// Error returned when an id does not match `^[a-zA-Z0-9_.\-~]+$`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid id {0:?}: must match ^[a-zA-Z0-9_.\\-~]+$")]
pub struct InvalidId(pub String);

/// Validate an id against the shared thread/actor-instance id pattern.
pub fn validate_id(id: &str) -> Result<(), InvalidId> {
    if id.is_empty() || !id_pattern().is_match(id) {
        return Err(InvalidId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_without_hyphens() {
        assert!(validate_id("3fa85f6457174562b3fc2c963f66afa6").is_ok());
    }

    #[test]
    fn accepts_hyphens_dots_tildes_underscores() {
        assert!(validate_id("conv-1.0_alpha~beta").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_id("").is_err());
    }

    #[test]
    fn rejects_slash_and_space() {
        assert!(validate_id("bad/id").is_err());
        assert!(validate_id("bad id").is_err());
    }
}
