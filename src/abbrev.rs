//! Abbreviation post-pass: rewrites repeated leading path segments into
//! short `@alias` tokens, prepending one `@alias=segment` definition line
//! per alias so the rewrite stays invertible.

use crate::flatten::FlattenLine;
use std::collections::{HashMap, HashSet};

/// Rewrites repeated leading path segments across the rendered rows.
///
/// A segment qualifies when it appears at the start of at least
/// `threshold` keyed lines (scalar lines and block headers; tabular value
/// rows carry no path and are never touched). Aliases are the shortest
/// unused leading prefix of the segment, extended on collision and
/// suffixed numerically as a last resort, so the assignment is
/// deterministic. Definition lines are emitted first, ordered by the
/// segment's first appearance.
#[must_use]
pub fn abbreviate(lines: Vec<FlattenLine>, threshold: usize) -> Vec<FlattenLine> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for line in &lines {
        if let Some(segment) = leading_segment(keyed_text(line)) {
            let count = counts.entry(segment).or_insert(0);
            if *count == 0 {
                order.push(segment);
            }
            *count += 1;
        }
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut aliases: Vec<(String, String)> = Vec::new();
    for segment in order {
        if counts[segment] >= threshold {
            let alias = make_alias(segment, &used);
            used.insert(alias.clone());
            aliases.push((segment.to_string(), alias));
        }
    }

    if aliases.is_empty() {
        return lines;
    }

    let by_segment: HashMap<&str, &str> = aliases
        .iter()
        .map(|(segment, alias)| (segment.as_str(), alias.as_str()))
        .collect();

    let mut out = Vec::with_capacity(lines.len() + aliases.len());
    for (segment, alias) in &aliases {
        out.push(FlattenLine::Scalar(format!("@{alias}={segment}")));
    }
    for line in lines {
        out.push(rewrite(line, &by_segment));
    }
    out
}

/// The rewritable key text of a row: the full scalar line or the block
/// header. Tabular value rows are value content and must never change.
fn keyed_text(line: &FlattenLine) -> &str {
    match line {
        FlattenLine::Scalar(text) => text,
        FlattenLine::Block { header, .. } => header,
    }
}

/// Extracts the leading path segment of a keyed line: the text before the
/// first `.` or `[` in the key part. Lines whose key has neither (bare
/// keys, definition lines) yield nothing since no rewrite could apply;
/// the same goes for keys that start at an index, as with a root-level
/// array, where there is no segment to alias.
fn leading_segment(line: &str) -> Option<&str> {
    let key = &line[..line.find(':').unwrap_or(line.len())];
    let cut = key.find(['.', '['])?;
    if cut == 0 {
        return None;
    }
    Some(&key[..cut])
}

fn rewrite(line: FlattenLine, by_segment: &HashMap<&str, &str>) -> FlattenLine {
    match line {
        FlattenLine::Scalar(text) => FlattenLine::Scalar(rewrite_text(text, by_segment)),
        FlattenLine::Block { header, rows } => FlattenLine::Block {
            header: rewrite_text(header, by_segment),
            rows,
        },
    }
}

fn rewrite_text(text: String, by_segment: &HashMap<&str, &str>) -> String {
    let Some(segment) = leading_segment(&text) else {
        return text;
    };
    match by_segment.get(segment) {
        Some(alias) => format!("@{alias}{}", &text[segment.len()..]),
        None => text,
    }
}

/// Derives a deterministic, unused alias for a segment: the shortest
/// leading prefix not yet taken, then numeric suffixes.
fn make_alias(segment: &str, used: &HashSet<String>) -> String {
    let chars: Vec<char> = segment.chars().collect();
    for len in 1..=chars.len() {
        let candidate: String = chars[..len].iter().collect();
        if !used.contains(&candidate) {
            return candidate;
        }
    }

    let mut suffix = 2usize;
    loop {
        let candidate = format!("{segment}{suffix}");
        if !used.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{flatten_lines, render};
    use crate::value::ValueNode;
    use serde_json::json;

    fn abbreviated(value: serde_json::Value, threshold: usize) -> String {
        let lines = flatten_lines(&ValueNode::from_json(value));
        render(&abbreviate(lines, threshold))
    }

    /// Expands `@alias` tokens back using the definition lines, checking
    /// invertibility.
    fn expand(text: &str) -> String {
        let mut defs: Vec<(String, String)> = Vec::new();
        let mut body: Vec<String> = Vec::new();
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix('@') {
                if let Some((alias, segment)) = rest.split_once('=') {
                    defs.push((format!("@{alias}"), segment.to_string()));
                    continue;
                }
            }
            body.push(line.to_string());
        }
        // Longest alias first so @us does not match inside @user.
        defs.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));
        body.into_iter()
            .map(|line| {
                for (alias, segment) in &defs {
                    if let Some(rest) = line.strip_prefix(alias.as_str()) {
                        if rest.starts_with(['.', '[']) {
                            return format!("{segment}{rest}");
                        }
                    }
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_repeated_segment_is_abbreviated() {
        assert_eq!(
            abbreviated(json!({"user": {"name": "Javian", "email": "x@y.com"}}), 2),
            "@u=user\n@u.name:Javian\n@u.email:x@y.com"
        );
    }

    #[test]
    fn test_below_threshold_is_untouched() {
        assert_eq!(
            abbreviated(json!({"user": {"name": "Javian"}}), 2),
            "user.name:Javian"
        );
    }

    #[test]
    fn test_collision_extends_prefix() {
        let output = abbreviated(
            json!({
                "user": {"name": "a", "email": "b"},
                "usage": {"cpu": 1, "mem": 2}
            }),
            2,
        );
        assert!(output.starts_with("@u=user\n@us=usage\n"));
        assert!(output.contains("@u.name:a"));
        assert!(output.contains("@us.cpu:1"));
    }

    #[test]
    fn test_numeric_suffix_when_prefixes_exhausted() {
        let output = abbreviated(
            json!({
                "ab": {"x": 1, "y": 2},
                "a": {"x": 1, "y": 2}
            }),
            2,
        );
        // "ab" takes "a"; the one-letter segment "a" has no free prefix
        // left and falls back to a numeric suffix.
        assert!(output.starts_with("@a=ab\n@a2=a\n"));
    }

    #[test]
    fn test_block_header_counts_toward_segment() {
        let output = abbreviated(
            json!({
                "order": {"id": "o-1"},
                "order_items": [{"sku": "a.b", "qty": 1}, {"sku": "c", "qty": 2}]
            }),
            2,
        );
        // "order" and "order_items" are distinct segments appearing once
        // each; nothing qualifies and value rows stay untouched.
        assert!(!output.contains('@'));
        assert!(output.contains("\na.b,1"));
    }

    #[test]
    fn test_definitions_ordered_by_first_appearance() {
        let output = abbreviated(
            json!({
                "zone": {"a": 1, "b": 2},
                "area": {"a": 1, "b": 2}
            }),
            2,
        );
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("@z=zone"));
        assert_eq!(lines.next(), Some("@a=area"));
    }

    #[test]
    fn test_rewrite_is_invertible() {
        let plain = render(&flatten_lines(&ValueNode::from_json(json!({
            "user": {"name": "Javian", "email": "x@y.com"},
            "usage": {"cpu": [1, 2, 3], "mem": 2},
            "single": 1
        }))));
        let output = abbreviated(
            json!({
                "user": {"name": "Javian", "email": "x@y.com"},
                "usage": {"cpu": [1, 2, 3], "mem": 2},
                "single": 1
            }),
            2,
        );
        assert_ne!(plain, output);
        assert_eq!(expand(&output), plain);
    }

    #[test]
    fn test_bare_keys_never_qualify() {
        assert_eq!(abbreviated(json!({"a": 1, "b": 2}), 1), "a:1\nb:2");
    }

    #[test]
    fn test_root_array_indices_never_qualify() {
        // A mixed root array renders per index with an empty prefix; the
        // empty "segment" before `[` must not earn an alias.
        assert_eq!(abbreviated(json!([{"a": 1}, "x"]), 2), "[0].a:1\n[1]:x");
    }
}
