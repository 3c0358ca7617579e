//! Cache key derivation and per-category expiry
//!
//! Keys have the shape `category:p1:p2:...`. Every parameter keeps its slot even
//! when absent, so `(league=5, season=absent)` and `(league=5, season=2024)`
//! never collide.

use chrono::Duration;
use sha2::{Digest, Sha256};

/// Separator between the category and each parameter
const DELIMITER: char = ':';

/// Marker written for an absent parameter; escaped out of every present value
const ABSENT_MARKER: &str = "~";

/// Keys longer than this are truncated when turned into file names
const MAX_FILE_STEM_LEN: usize = 96;

/// Number of digest hex characters appended to altered file names
const DIGEST_HEX_LEN: usize = 16;

/// Logical groups of cached responses, each with its own lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Leagues,
    Teams,
    Fixtures,
}

impl CacheCategory {
    /// The key prefix for this category
    pub fn as_str(self) -> &'static str {
        match self {
            CacheCategory::Leagues => "leagues",
            CacheCategory::Teams => "teams",
            CacheCategory::Fixtures => "fixtures",
        }
    }

    /// Looks up a category from the first segment of a key
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "leagues" => Some(CacheCategory::Leagues),
            "teams" => Some(CacheCategory::Teams),
            "fixtures" => Some(CacheCategory::Fixtures),
            _ => None,
        }
    }

    /// How long entries of this category stay valid
    pub fn ttl(self) -> Duration {
        match self {
            CacheCategory::Leagues | CacheCategory::Teams => Duration::hours(24),
            CacheCategory::Fixtures => Duration::hours(1),
        }
    }
}

/// Lifetime applied to keys whose category is not recognised
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// A single positional parameter of a cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParam {
    Absent,
    Int(i64),
    Text(String),
}

impl KeyParam {
    fn render(&self, out: &mut String) {
        match self {
            KeyParam::Absent => out.push_str(ABSENT_MARKER),
            KeyParam::Int(n) => out.push_str(&n.to_string()),
            KeyParam::Text(s) => {
                for c in s.chars() {
                    match c {
                        '%' => out.push_str("%25"),
                        ':' => out.push_str("%3A"),
                        '~' => out.push_str("%7E"),
                        _ => out.push(c),
                    }
                }
            }
        }
    }
}

impl From<i32> for KeyParam {
    fn from(value: i32) -> Self {
        KeyParam::Int(i64::from(value))
    }
}

impl From<u32> for KeyParam {
    fn from(value: u32) -> Self {
        KeyParam::Int(i64::from(value))
    }
}

impl From<i64> for KeyParam {
    fn from(value: i64) -> Self {
        KeyParam::Int(value)
    }
}

impl From<&str> for KeyParam {
    fn from(value: &str) -> Self {
        KeyParam::Text(value.to_string())
    }
}

impl From<String> for KeyParam {
    fn from(value: String) -> Self {
        KeyParam::Text(value)
    }
}

impl<T: Into<KeyParam>> From<Option<T>> for KeyParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyParam::Absent, Into::into)
    }
}

/// Builds a cache key from a category and its ordered parameters
///
/// Identical inputs always give identical keys. Changing any parameter,
/// including switching it between absent and present, changes the key.
pub fn derive_key(category: CacheCategory, params: &[KeyParam]) -> String {
    let mut key = String::from(category.as_str());
    for param in params {
        key.push(DELIMITER);
        param.render(&mut key);
    }
    key
}

/// Returns how long an entry stored under `key` stays valid
///
/// The category is the segment before the first delimiter and must match a
/// known category exactly; anything else gets the default lifetime.
pub fn ttl_for(key: &str) -> Duration {
    let prefix = key.split(DELIMITER).next().unwrap_or_default();
    CacheCategory::from_prefix(prefix)
        .map(CacheCategory::ttl)
        .unwrap_or_else(|| Duration::hours(DEFAULT_TTL_HOURS))
}

/// Turns a cache key into a safe file stem
///
/// Keys made only of `[A-Za-z0-9._-]` are used as-is. Anything else is replaced
/// with `_` and a digest of the original key is appended, so `a:b` and `a_b`
/// still map to different files.
pub fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    let mut altered = false;

    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            stem.push(c);
        } else {
            stem.push('_');
            altered = true;
        }
    }

    if !altered && stem.len() <= MAX_FILE_STEM_LEN {
        return stem;
    }

    // Only ASCII survives above, so byte truncation is on a char boundary
    stem.truncate(MAX_FILE_STEM_LEN);
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    format!("{}-{}", stem, &digest[..DIGEST_HEX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_key(
        league: Option<i32>,
        season: Option<i32>,
        team: Option<i32>,
        date: Option<&str>,
    ) -> String {
        derive_key(
            CacheCategory::Fixtures,
            &[league.into(), season.into(), team.into(), date.into()],
        )
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let first = fixtures_key(Some(39), Some(2024), None, None);
        let second = fixtures_key(Some(39), Some(2024), None, None);
        assert_eq!(first, second);
        assert_eq!(first, "fixtures:39:2024:~:~");
    }

    #[test]
    fn test_derive_key_changes_when_any_parameter_changes() {
        let base = fixtures_key(Some(39), Some(2024), None, None);

        assert_ne!(base, fixtures_key(Some(40), Some(2024), None, None));
        assert_ne!(base, fixtures_key(Some(39), Some(2023), None, None));
        assert_ne!(base, fixtures_key(Some(39), Some(2024), Some(33), None));
        assert_ne!(base, fixtures_key(Some(39), Some(2024), None, Some("2024-08-17")));
    }

    #[test]
    fn test_absent_parameter_differs_from_present_value() {
        let absent = derive_key(CacheCategory::Teams, &[5.into(), KeyParam::Absent]);
        let present = derive_key(CacheCategory::Teams, &[5.into(), 2024.into()]);
        assert_ne!(absent, present);
    }

    #[test]
    fn test_absent_marker_cannot_be_forged_by_text() {
        let absent = derive_key(CacheCategory::Leagues, &[KeyParam::Absent]);
        let tilde = derive_key(CacheCategory::Leagues, &["~".into()]);
        let empty = derive_key(CacheCategory::Leagues, &["".into()]);

        assert_ne!(absent, tilde);
        assert_ne!(absent, empty);
        assert_ne!(tilde, empty);
    }

    #[test]
    fn test_delimiter_inside_text_does_not_shift_positions() {
        let joined = derive_key(CacheCategory::Leagues, &["a:b".into()]);
        let split = derive_key(CacheCategory::Leagues, &["a".into(), "b".into()]);
        assert_ne!(joined, split);
    }

    #[test]
    fn test_parameter_order_matters() {
        let forward = derive_key(CacheCategory::Teams, &[1.into(), 2.into()]);
        let reverse = derive_key(CacheCategory::Teams, &[2.into(), 1.into()]);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_ttl_for_known_categories() {
        assert_eq!(ttl_for("leagues:all"), Duration::hours(24));
        assert_eq!(ttl_for("teams:league:39:2024"), Duration::hours(24));
        assert_eq!(ttl_for("fixtures:39:2024:~:~"), Duration::hours(1));
    }

    #[test]
    fn test_ttl_for_unknown_category_uses_default() {
        assert_eq!(ttl_for("standings:39"), Duration::hours(24));
        assert_eq!(ttl_for(""), Duration::hours(24));
    }

    #[test]
    fn test_ttl_for_matches_category_segment_exactly() {
        // A key that merely starts with "fixtures" is not a fixtures key
        assert_eq!(ttl_for("fixturesarchive:1"), Duration::hours(24));
        assert_eq!(ttl_for("fixtures"), Duration::hours(1));
    }

    #[test]
    fn test_file_stem_keeps_safe_keys() {
        assert_eq!(file_stem("leagues_all"), "leagues_all");
    }

    #[test]
    fn test_file_stem_separates_altered_keys() {
        let colon = file_stem("leagues:all");
        let underscore = file_stem("leagues_all");

        assert_ne!(colon, underscore);
        assert!(colon.starts_with("leagues_all-"));
        assert_eq!(colon.len(), "leagues_all-".len() + DIGEST_HEX_LEN);
    }

    #[test]
    fn test_file_stem_suffix_is_sha256_prefix() {
        let stem = file_stem("teams:search:Arsenal");
        let expected = hex::encode(Sha256::digest(b"teams:search:Arsenal"));
        assert_eq!(stem, format!("teams_search_Arsenal-{}", &expected[..DIGEST_HEX_LEN]));
    }

    #[test]
    fn test_file_stem_truncates_long_keys() {
        let long_key = "a".repeat(500);
        let stem = file_stem(&long_key);
        assert_eq!(stem.len(), MAX_FILE_STEM_LEN + 1 + DIGEST_HEX_LEN);
    }
}
