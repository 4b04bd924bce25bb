//! Path classification. Pure: no randomness is involved in deciding what a path means.

pub const ROOT: &str = "/";
pub const EXIST_DIR: &str = "/exist";

const ENTRY_PREFIX: &str = "/exist/";

/// Semantic category of a path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCategory {
    Root,
    ExistDirectory,
    /// An entry inside `/exist` whose name is its per-query existence probability.
    ProbabilityEntry(f64),
    Invalid,
}

impl PathCategory {
    /// Returns true for the two directories that always exist.
    pub fn is_fixed(&self) -> bool {
        matches!(self, PathCategory::Root | PathCategory::ExistDirectory)
    }
}

/// Parses `path` into its category.
pub fn classify(path: &str) -> PathCategory {
    match path {
        ROOT => return PathCategory::Root,
        EXIST_DIR => return PathCategory::ExistDirectory,
        _ => {}
    }
    let Some(name) = path.strip_prefix(ENTRY_PREFIX) else {
        return PathCategory::Invalid;
    };
    match name.parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => PathCategory::ProbabilityEntry(p),
        _ => PathCategory::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_directories() {
        assert_eq!(classify("/"), PathCategory::Root);
        assert_eq!(classify("/exist"), PathCategory::ExistDirectory);
        assert!(classify("/").is_fixed());
        assert!(classify("/exist").is_fixed());
        assert!(!classify("/exist/1").is_fixed());
    }

    #[test]
    fn test_probability_entries() {
        assert_eq!(classify("/exist/0.5"), PathCategory::ProbabilityEntry(0.5));
        assert_eq!(classify("/exist/1"), PathCategory::ProbabilityEntry(1.0));
        assert_eq!(classify("/exist/1.0"), PathCategory::ProbabilityEntry(1.0));
        assert_eq!(classify("/exist/0"), PathCategory::ProbabilityEntry(0.0));
        assert_eq!(classify("/exist/0.0"), PathCategory::ProbabilityEntry(0.0));
        assert_eq!(
            classify("/exist/0.0001234"),
            PathCategory::ProbabilityEntry(0.0001234)
        );
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        assert_eq!(classify("/exist/2"), PathCategory::Invalid);
        assert_eq!(classify("/exist/-0.1"), PathCategory::Invalid);
        assert_eq!(classify("/exist/1.0000001"), PathCategory::Invalid);
        assert_eq!(classify("/exist/NaN"), PathCategory::Invalid);
        assert_eq!(classify("/exist/inf"), PathCategory::Invalid);
    }

    #[test]
    fn test_malformed_is_invalid() {
        assert_eq!(classify("/exist/abc"), PathCategory::Invalid);
        assert_eq!(classify("/exist/"), PathCategory::Invalid);
        assert_eq!(classify("/exist/0.5/"), PathCategory::Invalid);
        assert_eq!(classify("/exist/0.5/0.5"), PathCategory::Invalid);
        assert_eq!(classify("/other/0.5"), PathCategory::Invalid);
        assert_eq!(classify("/existing"), PathCategory::Invalid);
        assert_eq!(classify("exist/0.5"), PathCategory::Invalid);
        assert_eq!(classify(""), PathCategory::Invalid);
    }

    #[test]
    fn test_number_grammar() {
        // Names follow Rust's float grammar: signs, exponents and `inf`/`nan` spellings parse,
        // surrounding whitespace and digit separators do not.
        assert_eq!(classify("/exist/+0.5"), PathCategory::ProbabilityEntry(0.5));
        assert_eq!(classify("/exist/1e-3"), PathCategory::ProbabilityEntry(0.001));
        assert_eq!(classify("/exist/.5"), PathCategory::ProbabilityEntry(0.5));
        assert_eq!(classify("/exist/-0"), PathCategory::ProbabilityEntry(0.0));
        for name in [" 0.5", "0.5 ", "0.2_5", "0x0.8", "nan", "inf", "0,5"] {
            assert_eq!(classify(&format!("/exist/{name}")), PathCategory::Invalid, "{name:?}");
        }
    }
}
