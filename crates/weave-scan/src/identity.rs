//! Generated identity tokens.
//!
//! A token names an anonymous contribution stably: once a `_` placeholder is
//! replaced with a token, renames of the surrounding folder no longer change
//! the item's registry key.

use uuid::Uuid;

/// Tokens are `u` followed by 12 lowercase hex digits.
pub const TOKEN_LEN: usize = 13;

/// Generate a fresh random identity token.
pub fn fresh_token() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("u{}", &hex[..TOKEN_LEN - 1])
}

/// Whether `name` has the shape of a generated identity token.
pub fn is_identity_token(name: &str) -> bool {
    let mut chars = name.chars();
    name.len() == TOKEN_LEN
        && chars.next() == Some('u')
        && chars.all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tokens_are_valid_and_distinct() {
        let a = fresh_token();
        let b = fresh_token();
        assert!(is_identity_token(&a), "{a} should be a token");
        assert!(is_identity_token(&b), "{b} should be a token");
        assert_ne!(a, b);
    }

    #[test]
    fn human_names_are_not_tokens() {
        for name in ["dashboard", "user-settings", "u12345", "x123456789abc", "uABCDEF123456"] {
            assert!(!is_identity_token(name), "{name} should not be a token");
        }
    }
}
