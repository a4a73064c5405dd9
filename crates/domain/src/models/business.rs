//! Business domain model and invite codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A business: the tenant that owns profiles, jobs and timesheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

lazy_static::lazy_static! {
    pub static ref INVITE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]{3}-[A-Z0-9]{3}-[A-Z0-9]{3}$").unwrap();
}

const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a business invite code in XXX-XXX-XXX format.
///
/// The alphabet leaves out 0, O, I and 1.
pub fn generate_invite_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let mut segment = || -> String {
        (0..3)
            .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
            .collect()
    };

    format!("{}-{}-{}", segment(), segment(), segment())
}

/// Normalizes user-typed invite codes (case, surrounding whitespace).
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_format() {
        let code = generate_invite_code();
        assert_eq!(code.len(), 11);
        assert!(INVITE_CODE_REGEX.is_match(&code));
        assert!(!code.contains(['0', 'O', 'I', '1']));
    }

    #[test]
    fn test_invite_codes_differ() {
        let codes: std::collections::HashSet<String> =
            (0..100).map(|_| generate_invite_code()).collect();
        assert!(codes.len() >= 99);
    }

    #[test]
    fn test_normalize_invite_code() {
        assert_eq!(normalize_invite_code("  abc-def-ghj "), "ABC-DEF-GHJ");
        assert!(INVITE_CODE_REGEX.is_match(&normalize_invite_code("k7p-q2r-zz9")));
    }
}
