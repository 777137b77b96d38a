//! Locale tag to DeepL language tag mapping.
//!
//! The table is the single source of truth for which locales DeepL can serve
//! directly. A few locales have no DeepL support and are deliberately mapped
//! onto the closest available language instead:
//!
//! - `ku` (Kurdish) and `hy` (Armenian) fall back to English
//! - `mr`, `te`, `gu`, `ml`, `kn`, `or` fall back to Hindi
//!
//! Unknown locales are upper-cased verbatim.

/// Internal locale tag and the DeepL tag it is sent as.
const LANGUAGE_MAP: &[(&str, &str)] = &[
    ("tr", "TR"),
    ("en", "EN"),
    ("ar", "AR"),
    ("de", "DE"),
    ("fr", "FR"),
    ("es", "ES"),
    ("it", "IT"),
    ("ru", "RU"),
    ("zh", "ZH"),
    ("ja", "JA"),
    ("ko", "KO"),
    ("pt", "PT"),
    ("nl", "NL"),
    ("pl", "PL"),
    ("sv", "SV"),
    ("da", "DA"),
    ("fi", "FI"),
    ("el", "EL"),
    ("he", "HE"),
    ("hi", "HI"),
    ("bn", "BN"),
    ("ta", "TA"),
    ("th", "TH"),
    ("vi", "VI"),
    ("id", "ID"),
    ("ms", "MS"),
    ("fa", "FA"),
    ("ur", "UR"),
    ("cs", "CS"),
    ("sk", "SK"),
    ("uk", "UK"),
    ("bg", "BG"),
    ("hr", "HR"),
    ("ro", "RO"),
    ("hu", "HU"),
    ("et", "ET"),
    ("lv", "LV"),
    ("lt", "LT"),
    ("sl", "SL"),
    ("mt", "MT"),
    ("ku", "EN"),
    ("mk", "MK"),
    ("hy", "EN"),
    ("mr", "HI"),
    ("te", "HI"),
    ("gu", "HI"),
    ("ml", "HI"),
    ("kn", "HI"),
    ("or", "HI"),
    ("sr", "SR"),
];

fn lookup(code: &str) -> Option<&'static str> {
    let code = code.to_lowercase();
    LANGUAGE_MAP
        .iter()
        .find(|(locale, _)| *locale == code)
        .map(|(_, deepl)| *deepl)
}

/// Map an internal locale tag (case-insensitive) to the DeepL target tag.
///
/// Never fails: locales missing from the table are returned upper-cased.
pub fn map_language_code(code: &str) -> String {
    lookup(code)
        .map(|deepl| deepl.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

/// Whether the locale is served by another language's translations.
pub fn is_aliased(code: &str) -> bool {
    lookup(code)
        .map(|deepl| !deepl.eq_ignore_ascii_case(code))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_mappings() {
        assert_eq!(map_language_code("de"), "DE");
        assert_eq!(map_language_code("zh"), "ZH");
        assert_eq!(map_language_code("pt"), "PT");
        assert_eq!(map_language_code("sr"), "SR");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(map_language_code("DE"), "DE");
        assert_eq!(map_language_code("Ku"), "EN");
    }

    #[test]
    fn test_closest_language_aliases() {
        assert_eq!(map_language_code("ku"), "EN");
        assert_eq!(map_language_code("hy"), "EN");
        for code in ["mr", "te", "gu", "ml", "kn", "or"] {
            assert_eq!(map_language_code(code), "HI", "{} should map to Hindi", code);
        }
    }

    #[test]
    fn test_unknown_falls_back_to_uppercase() {
        assert_eq!(map_language_code("xx-unknown"), "XX-UNKNOWN");
        assert_eq!(map_language_code("sw"), "SW");
        assert_eq!(map_language_code(""), "");
    }

    #[test]
    fn test_table_has_no_duplicate_locales() {
        let mut codes: Vec<_> = LANGUAGE_MAP.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), LANGUAGE_MAP.len());
        assert_eq!(LANGUAGE_MAP.len(), 50);
    }

    #[test]
    fn test_is_aliased() {
        assert!(is_aliased("ku"));
        assert!(is_aliased("gu"));
        assert!(is_aliased("HY"));
        assert!(!is_aliased("de"));
        assert!(!is_aliased("en"));
        assert!(!is_aliased("xx"));
    }
}
