//! Denylist and write-intent classification of raw command strings.
//!
//! Matching is lexical over the whole string, never tokenized parsing. Both
//! functions are pure and safe to call concurrently.

use crate::patterns::{DENIAL_RULES, DenialRule, WRITE_SIGNATURES, WriteSignature};

/// Return the first denial rule that matches `command`, in table order.
///
/// ```
/// use shellgate_security::match_denied_pattern;
///
/// assert!(match_denied_pattern("rm -rf /").is_some());
/// assert!(match_denied_pattern("ls -la").is_none());
/// ```
pub fn match_denied_pattern(command: &str) -> Option<&'static DenialRule> {
    DENIAL_RULES.iter().find(|rule| rule.is_match(command))
}

/// Return the first write-intent signature that matches `command`.
pub fn match_write_signature(command: &str) -> Option<&'static WriteSignature> {
    WRITE_SIGNATURES.iter().find(|sig| sig.is_match(command))
}

/// Heuristically decide whether `command` mutates files or package state.
///
/// Over-inclusive: `echo "mkdir"` is flagged. A false positive only routes
/// a safe read to the write-capable entry point; a false negative would let
/// a mutation through the read-only one.
pub fn is_likely_write_command(command: &str) -> bool {
    match_write_signature(command).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
