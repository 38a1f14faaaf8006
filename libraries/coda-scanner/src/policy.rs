//! Multi-value tag resolution
//!
//! Purely a function of raw tag output; database state never plays into
//! it. Each of genre / artist / album-artist is configured independently.

use coda_core::config::MultiValueSetting;

/// Placeholder used when an artist role resolves to nothing.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Resolve one logical tag into its value list.
///
/// `values` are the repeated values the tag format already carries,
/// `single` the single (first) value. `Multi` uses the list, `Delim`
/// splits the single value on the configured separator, `None` keeps the
/// single value alone. Results are trimmed and empties dropped.
pub fn resolve_multi(
    setting: &MultiValueSetting,
    values: &[String],
    single: Option<&str>,
) -> Vec<String> {
    let parts: Vec<String> = match setting {
        MultiValueSetting::Multi => values.to_vec(),
        MultiValueSetting::Delim(sep) => single
            .map(|v| v.split(sep.as_str()).map(str::to_string).collect())
            .unwrap_or_default(),
        MultiValueSetting::None => single.map(|v| vec![v.to_string()]).unwrap_or_default(),
    };

    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_none_takes_single_value() {
        let got = resolve_multi(
            &MultiValueSetting::None,
            &values(&["a", "b"]),
            Some("a; b"),
        );
        assert_eq!(got, values(&["a; b"]));
    }

    #[test]
    fn test_none_empty_input() {
        let got = resolve_multi(&MultiValueSetting::None, &[], None);
        assert!(got.is_empty());
    }

    #[test]
    fn test_multi_uses_value_list() {
        let got = resolve_multi(
            &MultiValueSetting::Multi,
            &values(&["rock", " metal "]),
            Some("rock"),
        );
        assert_eq!(got, values(&["rock", "metal"]));
    }

    #[test]
    fn test_delim_splits_single_value() {
        let got = resolve_multi(
            &MultiValueSetting::Delim(";".to_string()),
            &values(&["genre-a;genre-b"]),
            Some("genre-a;genre-b"),
        );
        assert_eq!(got, values(&["genre-a", "genre-b"]));
    }

    #[test]
    fn test_delim_drops_empty_parts() {
        let got = resolve_multi(
            &MultiValueSetting::Delim(";".to_string()),
            &[],
            Some("a;;b; "),
        );
        assert_eq!(got, values(&["a", "b"]));
    }
}
