use std::sync::OnceLock;

use regex::Regex;

pub const RESERVED_NAMESPACE: &str = "You cannot use this reserved namespace.";
pub const NAMESPACE_HELP: &str = "Enter a value consisting of lower-case letters, numbers or hyphens. \
     Hyphens can not occur at the start or end of the chosen value.";

fn namespace_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+[a-z0-9-]*[a-z0-9]+$").expect("namespace pattern is valid")
    })
}

/// Checks a public namespace: not reserved, lower-case letters, digits and
/// inner hyphens only, at least two characters.
pub fn validate_namespace(value: &str, reserved: &[String]) -> Result<(), &'static str> {
    if reserved.iter().any(|r| r == value) {
        return Err(RESERVED_NAMESPACE);
    }
    if !namespace_regex().is_match(value) {
        return Err(NAMESPACE_HELP);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserved() -> Vec<String> {
        vec!["memodir-test-namespace".to_string()]
    }

    #[test]
    fn test_valid_namespaces() {
        for ns in ["alice", "alice-smith", "a1", "2024-cv"] {
            assert!(validate_namespace(ns, &reserved()).is_ok(), "{ns}");
        }
    }

    #[test]
    fn test_reserved_namespace_rejected() {
        assert_eq!(
            validate_namespace("memodir-test-namespace", &reserved()),
            Err(RESERVED_NAMESPACE)
        );
    }

    #[test]
    fn test_reserved_check_is_exact() {
        assert!(validate_namespace("memodir", &reserved()).is_ok());
    }

    #[test]
    fn test_invalid_namespaces() {
        for ns in ["-alice", "alice-", "Alice", "a", "al ice", "al.ice", ""] {
            assert_eq!(validate_namespace(ns, &reserved()), Err(NAMESPACE_HELP), "{ns}");
        }
    }
}
