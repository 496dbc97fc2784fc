//! Pattern based discovery of asset references in HTML and CSS text.

use std::sync::OnceLock;

use regex::Regex;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)(?:<img[^>]+?src=["']([^"']+?)["'][^>]*?>)|(?:url\(["']?([^"')]+)["']?\))"#,
        )
        .expect("invalid asset reference regex")
    })
}

fn is_data_uri(value: &str) -> bool {
    value
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// Collect asset references from `content` in order of appearance.
///
/// Two shapes are recognised in a single scan: the `src` attribute of an `<img>` tag and the
/// argument of a CSS `url(...)` call, quoted or not. Duplicates are kept. Values that are already
/// data URIs are skipped so that inlined output yields no further references.
pub fn extract_references(content: &str) -> Vec<String> {
    reference_pattern()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|value| value.as_str())
        .filter(|value| !is_data_uri(value))
        .map(str::to_string)
        .collect()
}
