//! Accept-Language parsing
//!
//! Turns a raw `Accept-Language` header value into an ordered list of
//! language ranges and picks the best match against an allowed set.

/// A single `tag;q=weight` entry from an `Accept-Language` header
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRange {
    pub tag: String,
    pub quality: f32,
}

impl LanguageRange {
    pub fn is_wildcard(&self) -> bool {
        self.tag == "*"
    }

    fn matches(&self, allowed: &str) -> bool {
        normalize_tag(&self.tag) == normalize_tag(allowed)
    }
}

/// Parse an `Accept-Language` header value.
///
/// Entries are returned by descending quality. The sort is stable, so
/// entries with equal weight keep the order the client sent them in.
/// Entries with `q=0` or an unparsable weight are dropped.
pub fn parse_accept_language(header: &str) -> Vec<LanguageRange> {
    let mut ranges: Vec<LanguageRange> = header.split(',').filter_map(parse_range).collect();

    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

fn parse_range(raw: &str) -> Option<LanguageRange> {
    let mut parts = raw.split(';');
    let tag = parts.next()?.trim();
    if tag.is_empty() {
        return None;
    }

    let mut quality = 1.0_f32;
    for param in parts {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("q") {
            quality = value.trim().parse::<f32>().ok().filter(|q| q.is_finite())?;
        }
    }

    let quality = quality.clamp(0.0, 1.0);
    if quality == 0.0 {
        return None;
    }

    Some(LanguageRange { tag: tag.to_string(), quality })
}

/// Pick the client's most preferred range that is present in `allowed`.
///
/// `ranges` must be sorted by descending quality, as returned by
/// [`parse_accept_language`]. Returns the allowed tag's own spelling. `*`
/// matches the first allowed tag, but only when no specific tag of the same
/// quality matches.
pub fn best_match(ranges: &[LanguageRange], allowed: &[String]) -> Option<String> {
    for group in ranges.chunk_by(|a, b| a.quality == b.quality) {
        let specific = group
            .iter()
            .filter(|range| !range.is_wildcard())
            .find_map(|range| allowed.iter().find(|candidate| range.matches(candidate)));
        if let Some(language) = specific {
            return Some(language.clone());
        }

        if group.iter().any(LanguageRange::is_wildcard)
            && let Some(first) = allowed.first()
        {
            return Some(first.clone());
        }
    }
    None
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}
