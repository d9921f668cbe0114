//! The one comparison rule every join in the registry goes through.

/// Trim surrounding whitespace and lower-case.
pub fn normalize(s: &str) -> String { s.trim().to_lowercase() }

/// Case-insensitive equality after trimming both sides.
pub fn same(a: &str, b: &str) -> bool { normalize(a) == normalize(b) }

/// Whether `needle`, already normalised, occurs inside the normalised
/// `haystack`.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
  normalize(haystack).contains(needle)
}
