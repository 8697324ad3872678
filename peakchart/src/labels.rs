//! Shortens a set of axis labels by stripping tokens that every label shares.
//!
//! Labels are tokenized on `_ - . ,`, spaces and the ellipsis marker. Each pass
//! removes one shared token: a common leading token, otherwise a common
//! trailing token, otherwise the first interior token present in every label
//! (replaced by `…`). Passes repeat until nothing is shared.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

pub const ELLIPSIS: char = '…';
const SEPARATOR: char = '_';

/// Original label to display label.
pub type LabelMap = BTreeMap<String, String>;

fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | ' ' | '.' | ',' | ELLIPSIS)
}

/// One char per input char, so offsets line up with the original label.
fn normalize(label: &str) -> Vec<char> {
    label
        .chars()
        .map(|c| if is_separator(c) { SEPARATOR } else { c })
        .collect()
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Removes `chars[start..end]`. Interior removals leave a single ellipsis
/// behind; removals touching either end of the label, or bordering an
/// existing ellipsis, do not.
fn remove_span(chars: &[char], start: usize, end: usize) -> String {
    let before = &chars[..start];
    let after = &chars[end..];

    let touches_boundary = start == 0 || end == chars.len();
    let borders_ellipsis =
        before.last() == Some(&ELLIPSIS) || after.first() == Some(&ELLIPSIS);

    let mut result: String = before.iter().collect();
    if !touches_boundary && !borders_ellipsis {
        result.push(ELLIPSIS);
    }
    result.extend(after);
    result
}

fn strip_prefix(
    originals: &[Vec<char>],
    normalized: &[Vec<char>],
    token: &str,
) -> Option<Vec<String>> {
    let pattern: Vec<char> = token.chars().chain([SEPARATOR]).collect();
    if !normalized.iter().all(|label| label.starts_with(&pattern)) {
        return None;
    }
    Some(
        originals
            .iter()
            .map(|label| remove_span(label, 0, pattern.len()))
            .collect(),
    )
}

fn strip_suffix(
    originals: &[Vec<char>],
    normalized: &[Vec<char>],
    token: &str,
) -> Option<Vec<String>> {
    let pattern: Vec<char> = [SEPARATOR].into_iter().chain(token.chars()).collect();
    if !normalized.iter().all(|label| label.ends_with(&pattern)) {
        return None;
    }
    Some(
        originals
            .iter()
            .map(|label| remove_span(label, label.len() - pattern.len(), label.len()))
            .collect(),
    )
}

fn strip_interior(
    originals: &[Vec<char>],
    normalized: &[Vec<char>],
    token: &str,
) -> Option<Vec<String>> {
    let pattern: Vec<char> = [SEPARATOR]
        .into_iter()
        .chain(token.chars())
        .chain([SEPARATOR])
        .collect();

    let positions: Vec<usize> = normalized
        .iter()
        .map(|label| find(label, &pattern))
        .collect::<Option<_>>()?;

    Some(
        originals
            .iter()
            .zip(positions)
            .map(|(label, start)| remove_span(label, start, start + pattern.len()))
            .collect(),
    )
}

/// Runs a single pass. Returns `None` when no token could be removed.
///
/// A pass that would empty a label or merge two distinct labels is rejected.
pub fn minimize_once(labels: &[String]) -> Option<Vec<String>> {
    let first = labels.first()?;

    let originals: Vec<Vec<char>> = labels
        .iter()
        .map(|label| label.chars().collect())
        .collect();
    let normalized: Vec<Vec<char>> = labels.iter().map(|label| normalize(label)).collect();

    let first_normalized: String = normalize(first).into_iter().collect();
    let tokens: Vec<&str> = first_normalized.split(SEPARATOR).collect();
    if tokens.len() < 2 {
        return None;
    }

    let first_token = tokens[0];
    let last_token = tokens[tokens.len() - 1];

    let stripped = (!first_token.is_empty())
        .then(|| strip_prefix(&originals, &normalized, first_token))
        .flatten()
        .or_else(|| {
            (!last_token.is_empty())
                .then(|| strip_suffix(&originals, &normalized, last_token))
                .flatten()
        })
        .or_else(|| {
            tokens[1..tokens.len() - 1]
                .iter()
                .filter(|token| !token.trim().is_empty())
                .find_map(|token| strip_interior(&originals, &normalized, token))
        })?;

    let distinct_before = labels.iter().collect::<HashSet<_>>().len();
    let distinct_after = stripped.iter().collect::<HashSet<_>>().len();
    if stripped.iter().any(String::is_empty) || distinct_after < distinct_before {
        debug!(
            labels = labels.len(),
            "rejected label minimization that would lose distinguishability"
        );
        return None;
    }

    Some(stripped)
}

/// Repeats [`minimize_once`] until no further change and returns the mapping
/// from each distinct input label to its display label.
pub fn minimize(labels: &[String]) -> LabelMap {
    let mut originals: Vec<String> = Vec::with_capacity(labels.len());
    let mut seen = HashSet::new();
    for label in labels {
        if seen.insert(label.as_str()) {
            originals.push(label.clone());
        }
    }

    let max_passes = originals
        .iter()
        .map(|label| normalize(label).split(|c| *c == SEPARATOR).count())
        .max()
        .unwrap_or(0);

    let mut current = originals.clone();
    for _ in 0..max_passes {
        match minimize_once(&current) {
            Some(next) => current = next,
            None => break,
        }
    }

    originals.into_iter().zip(current).collect()
}
