//! The slugify transform
//!
//! Lowercase, strip everything except letters, digits and parentheses,
//! collapse stripped runs to single dashes, trim leading/trailing dashes.
//! The transform is idempotent: `slugify(slugify(x)) == slugify(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of characters outside the kept class (Unicode letters, Unicode
/// digits, parentheses) collapse to a single dash.
static STRIPPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}()]+").expect("slug pattern is valid"));

/// Derive a URL-safe slug from arbitrary text
#[must_use]
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let dashed = STRIPPED.replace_all(&lowered, "-");
    dashed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn collapses_runs_of_stripped_characters() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("a!@#$b"), "a-b");
    }

    #[test]
    fn trims_leading_and_trailing_dashes() {
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("!!bang!!"), "bang");
    }

    #[test]
    fn keeps_parentheses_and_unicode_letters() {
        assert_eq!(slugify("Size (large)"), "size-(large)");
        assert_eq!(slugify("Déjà Vu"), "déjà-vu");
    }

    #[test]
    fn symbol_only_input_is_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn is_idempotent() {
        for input in ["Hello World", "  padded  ", "a!@#$b", "Déjà Vu", "!!!"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {input:?}");
        }
    }
}
