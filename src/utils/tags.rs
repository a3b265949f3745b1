//! Helpers for the comma-joined tag string stored on each image.

use std::collections::BTreeSet;

/// Trims every comma-separated entry and drops empty ones.
///
/// The result is what gets stored, so `normalize_tags(normalize_tags(x)) == normalize_tags(x)`.
pub fn normalize_tags(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a stored tag string into its entries, in stored order.
pub fn split_tags(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sorted, duplicate-free union of the tags found in `tag_strings`.
pub fn unique_sorted_tags<I, S>(tag_strings: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut all = BTreeSet::new();
    for stored in tag_strings {
        all.extend(split_tags(stored.as_ref()));
    }
    all.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags(" a, b ,,c "), "a,b,c");
        assert_eq!(normalize_tags("a,b,c"), "a,b,c");
        assert_eq!(normalize_tags(""), "");
        assert_eq!(normalize_tags(" , ,"), "");
        // Duplicates survive normalization
        assert_eq!(normalize_tags("cat, cat"), "cat,cat");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [" a, b ,,c ", "sunset ,  beach", ",,", "one", "x , y , x"] {
            let once = normalize_tags(raw);
            assert_eq!(normalize_tags(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("a,b,c"), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
        assert_eq!(split_tags(" a ,, b"), vec!["a", "b"]);
    }

    #[test]
    fn test_unique_sorted_tags() {
        let tags = unique_sorted_tags(["nature,sunset", "sunset,beach", "", "nature"]);
        assert_eq!(tags, vec!["beach", "nature", "sunset"]);
    }
}
