use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a rule violation.
///
/// Identity fields:
/// - check_id
/// - code
/// - policy name
/// - rule name
/// - full name of the offending type
pub fn fingerprint_for_violation(
    check_id: &str,
    code: &str,
    policy: &str,
    rule: &str,
    type_full_name: &str,
) -> String {
    let canonical = [check_id, code, policy, rule, type_full_name].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
