//! Owner identity from environment variables.
//!
//! Every record is scoped to an owner id. The id comes from `PAISA_OWNER_ID`
//! (usually set in `.env`) and is trimmed before use.

use crate::errors::{Error, Result};

/// Environment variable holding the signed-in owner's id.
pub const OWNER_ID_VAR: &str = "PAISA_OWNER_ID";

/// Validates a raw owner id.
///
/// # Returns
///
/// The trimmed id, or `MissingField` when nothing is left.
pub fn parse_owner_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::MissingField { field: "owner_id" });
    }
    Ok(trimmed.to_string())
}

/// Reads the owner id from `PAISA_OWNER_ID`.
pub fn owner_id_from_env() -> Result<String> {
    let raw = std::env::var(OWNER_ID_VAR)?;
    parse_owner_id(&raw)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_owner_id_trims() {
        assert_eq!(parse_owner_id("  uid-42\n").unwrap(), "uid-42");
    }

    #[test]
    fn test_parse_owner_id_rejects_blank() {
        assert!(matches!(
            parse_owner_id("   ").unwrap_err(),
            Error::MissingField { field: "owner_id" }
        ));
    }
}
