use lazy_static::lazy_static;
use regex::Regex;

/// Slug derivation: lowercase, non-alphanumeric runs collapse to a single
/// hyphen, leading/trailing hyphens trimmed. Deterministic, so renames
/// re-derive the same way.
pub fn slugify(name: &str) -> String {
    lazy_static! {
        static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    }
    NON_ALNUM
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_collapses_to_single_hyphens() {
        assert_eq!(slugify("IIM Ahmedabad!!"), "iim-ahmedabad");
        assert_eq!(slugify("FMS -- Delhi"), "fms-delhi");
    }

    #[test]
    fn edges_are_trimmed() {
        assert_eq!(slugify("  XLRI Jamshedpur  "), "xlri-jamshedpur");
        assert_eq!(slugify("--x--"), "x");
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(slugify("IIM Ahmedabad!!"), slugify("IIM Ahmedabad!!"));
        // distinct names can still collide on slug; the unique index catches it
        assert_eq!(slugify("IIM... Ahmedabad"), slugify("IIM Ahmedabad!!"));
    }

    #[test]
    fn already_clean_names_pass_through() {
        assert_eq!(slugify("spjimr"), "spjimr");
        assert_eq!(slugify("iim-bangalore"), "iim-bangalore");
    }
}
