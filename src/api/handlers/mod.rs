pub mod auth;

pub mod health;
pub use self::health::health;

// common functions for the handlers
use regex::Regex;
use uuid::Uuid;

/// Base58 syntax check for a wallet or receiver address (32-byte key).
#[must_use]
pub fn valid_wallet_address(address: &str) -> bool {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").map_or(false, |re| re.is_match(address))
}

/// Base58 syntax check for a transaction signature (64 bytes).
#[must_use]
pub fn valid_signature(signature: &str) -> bool {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{64,88}$").map_or(false, |re| re.is_match(signature))
}

/// Session ids are opaque to clients; anything that does not parse is simply
/// an unknown session, not a validation error.
pub(crate) fn parse_session_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_wallet_address() {
        assert!(valid_wallet_address(
            "Ge3jkza5KRfXvaq3GELNLh6V1pjjdEKNpEdGXJgjjKUR"
        ));
        assert!(valid_wallet_address(
            "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin"
        ));
        // 0, O, I and l are not base58
        assert!(!valid_wallet_address(
            "0e3jkza5KRfXvaq3GELNLh6V1pjjdEKNpEdGXJgjjKUR"
        ));
        assert!(!valid_wallet_address("tooShort"));
        assert!(!valid_wallet_address(""));
    }

    #[test]
    fn test_valid_signature() {
        assert!(valid_signature(&"2".repeat(88)));
        assert!(valid_signature(&"3".repeat(64)));
        assert!(!valid_signature(&"2".repeat(63)));
        assert!(!valid_signature(&"2".repeat(89)));
        assert!(!valid_signature("not base58!"));
    }

    #[test]
    fn test_parse_session_id() {
        assert!(parse_session_id("00000000-0000-0000-0000-000000000000").is_some());
        assert!(parse_session_id(" 00000000-0000-0000-0000-000000000000 ").is_some());
        assert!(parse_session_id("definitely-not-a-uuid").is_none());
        assert!(parse_session_id("").is_none());
    }
}
