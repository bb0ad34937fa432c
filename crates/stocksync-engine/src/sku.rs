//! SKU format check.

/// A SKU is valid iff it is non-empty and made only of ASCII letters,
/// digits, `-` and `_`.
#[must_use]
pub fn is_valid_sku(sku: &str) -> bool {
    !sku.is_empty()
        && sku
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
