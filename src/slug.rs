use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Longest slug derived from a blog title.
pub const MAX_DERIVED_SLUG: usize = 250;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("static regex compiles"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("static regex compiles"));
static VALID_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("static regex compiles"));

/// Converts free text into an ASCII slug.
///
/// The text is NFKD-decomposed first, so accented letters keep their base
/// letter ("Crème" becomes "creme"); whatever is still non-ASCII is dropped.
/// Anything that is not a word character, whitespace or a hyphen is removed,
/// and the text is lowercased. Runs of whitespace and hyphens become a single
/// "-". Leading and trailing "-" and "_" are trimmed.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = UNSAFE_CHARS.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&cleaned, "-");
    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Slug derived from a blog title, cut to the stored length limit.
pub fn derive_blog_slug(title: &str) -> String {
    slugify(title).chars().take(MAX_DERIVED_SLUG).collect()
}

/// True when `value` only holds letters, digits, underscores or hyphens.
pub fn is_valid_slug(value: &str) -> bool {
    VALID_SLUG.is_match(value)
}
