//! Field length limits for payment files
//!
//! The pain.001 schema caps most text fields at 35 characters and banks
//! reject anything longer, so fields are clipped before they reach the
//! writer. References are clipped with a visible marker so an operator can
//! see that a value was shortened.

/// Maximum length of a name or address line
pub const MAX_NAME: usize = 35;
/// Maximum length of a postal code
pub const MAX_PINCODE: usize = 16;
/// Maximum length of a city name
pub const MAX_CITY: usize = 35;
/// Maximum length of a street name
pub const MAX_STREET: usize = 35;
/// Maximum length of a building number
pub const MAX_BUILDING: usize = 5;
/// Maximum length of an end-to-end reference
pub const MAX_END_TO_END: usize = 35;
/// Maximum length of the proposal-level reference
pub const MAX_PROPOSAL_REF: usize = 140;

/// Clips a field to `max` characters
///
/// Operates on characters, not bytes, so a clipped umlaut never produces
/// invalid UTF-8.
pub fn clip(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Clips an end-to-end reference to 35 characters
///
/// Overlong references keep their first 33 characters plus a `..` marker,
/// so the clipped value is still unique enough to match bank statements.
pub fn clip_end_to_end(reference: &str) -> String {
    if reference.chars().count() > MAX_END_TO_END {
        let head: String = reference.chars().take(MAX_END_TO_END - 2).collect();
        format!("{head}..")
    } else {
        reference.to_string()
    }
}

/// Clips the proposal reference to 140 characters with a `...` marker
pub fn clip_proposal_reference(reference: &str) -> String {
    if reference.chars().count() > MAX_PROPOSAL_REF {
        let head: String = reference.chars().take(MAX_PROPOSAL_REF - 4).collect();
        format!("{head}...")
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_values_pass_through() {
        assert_eq!(clip("Wien", MAX_CITY), "Wien");
        assert_eq!(clip_end_to_end("RE-2025-0042"), "RE-2025-0042");
    }

    #[test]
    fn test_clip_is_char_safe() {
        let name = "Bäckerei Müller-Großhandels GmbH & Co KG";
        let clipped = clip(name, MAX_NAME);
        assert_eq!(clipped.chars().count(), MAX_NAME);
        assert!(name.starts_with(&clipped));
    }

    #[test]
    fn test_end_to_end_marker() {
        let long = "RE-2025-0042/Lizenzabrechnung-Jahresvertrag";
        let clipped = clip_end_to_end(long);
        assert_eq!(clipped.chars().count(), 35);
        assert!(clipped.ends_with(".."));
        assert!(long.starts_with(&clipped[..33]));
    }

    #[test]
    fn test_exactly_35_chars_is_untouched() {
        let exact: String = "x".repeat(35);
        assert_eq!(clip_end_to_end(&exact), exact);
    }

    #[test]
    fn test_proposal_reference_marker() {
        let long: String = "R".repeat(200);
        let clipped = clip_proposal_reference(&long);
        assert_eq!(clipped.chars().count(), 139);
        assert!(clipped.ends_with("..."));
    }
}
