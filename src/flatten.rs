//! The flatten encoder: renders a value tree into ordered `path:value`
//! lines, collapsing uniform arrays into tabular blocks and primitive
//! arrays into single comma-joined lines.

use crate::value::{array_shape, ArrayShape, ValueNode};
use memchr::{memchr, memchr3};

/// Literal key used for a bare scalar at the tree root.
const ROOT_KEY: &str = "value";

/// One rendered output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenLine {
    /// A single `path:value` line (scalar leaves, primitive arrays, and
    /// abbreviation definitions).
    Scalar(String),
    /// A collapsed uniform-array block: a header plus one value row per
    /// element. Rows carry no path of their own.
    Block {
        /// Header of the form `prefix[count]{k1,k2,...}:`
        header: String,
        /// One comma-joined row per element
        rows: Vec<String>,
    },
}

impl FlattenLine {
    /// Number of physical output lines this row renders to.
    #[must_use]
    pub fn line_count(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Block { rows, .. } => 1 + rows.len(),
        }
    }
}

/// Flattens a tree into its final textual form.
///
/// Lines are joined with a single `\n`. The encoder is total over any
/// well-formed tree; it never fails.
///
/// # Examples
///
/// ```
/// use prompt_flatten::{flatten, ValueNode};
///
/// let node = ValueNode::from_json(serde_json::json!(
///     {"user": {"name": "Javian", "email": "x@y.com"}}
/// ));
/// assert_eq!(flatten(&node), "user.name:Javian\nuser.email:x@y.com");
/// ```
#[must_use]
pub fn flatten(root: &ValueNode) -> String {
    render(&flatten_lines(root))
}

/// Flattens a tree into structured output rows.
///
/// Object properties render in insertion order and array elements in
/// index order; only uniform and primitive arrays collapse.
#[must_use]
pub fn flatten_lines(root: &ValueNode) -> Vec<FlattenLine> {
    let mut out = Vec::new();
    flatten_into(root, "", &mut out);
    out
}

/// Joins rendered rows into the final output string.
#[must_use]
pub fn render(lines: &[FlattenLine]) -> String {
    let mut rendered = Vec::with_capacity(lines.iter().map(FlattenLine::line_count).sum());
    for line in lines {
        match line {
            FlattenLine::Scalar(text) => rendered.push(text.as_str()),
            FlattenLine::Block { header, rows } => {
                rendered.push(header.as_str());
                rendered.extend(rows.iter().map(String::as_str));
            }
        }
    }
    rendered.join("\n")
}

fn flatten_into(node: &ValueNode, prefix: &str, out: &mut Vec<FlattenLine>) {
    match node {
        ValueNode::Object(entries) => {
            for (key, value) in entries {
                let child = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(value, &child, out);
            }
        }
        ValueNode::Array(items) => flatten_array(items, prefix, out),
        scalar => {
            let key = if prefix.is_empty() { ROOT_KEY } else { prefix };
            out.push(FlattenLine::Scalar(format!("{key}:{}", cell_text(scalar))));
        }
    }
}

fn flatten_array(items: &[ValueNode], prefix: &str, out: &mut Vec<FlattenLine>) {
    // Shape is re-derived here so the encoder is usable standalone,
    // independent of any prior analysis pass.
    match array_shape(items) {
        ArrayShape::Uniform { keys } => {
            let header = format!("{prefix}[{}]{{{}}}:", items.len(), keys.join(","));
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                let ValueNode::Object(entries) = item else {
                    continue;
                };
                let row: Vec<String> = keys
                    .iter()
                    .map(|key| {
                        let cell = entries
                            .iter()
                            .find(|(name, _)| name == key)
                            .map_or_else(|| "null".to_string(), |(_, value)| cell_text(value));
                        escape_cell(&cell)
                    })
                    .collect();
                rows.push(row.join(","));
            }
            out.push(FlattenLine::Block { header, rows });
        }
        ArrayShape::Primitive => {
            let joined: Vec<String> = items
                .iter()
                .map(|item| escape_cell(&cell_text(item)))
                .collect();
            out.push(FlattenLine::Scalar(format!(
                "{prefix}[{}]:{}",
                items.len(),
                joined.join(",")
            )));
        }
        ArrayShape::Mixed | ArrayShape::Empty => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(item, &format!("{prefix}[{index}]"), out);
            }
        }
    }
}

/// Renders any node as a single cell: scalars in their canonical text,
/// containers as compact JSON.
fn cell_text(node: &ValueNode) -> String {
    node.render_scalar()
        .unwrap_or_else(|| node.to_compact_json())
}

/// Quotes a value destined for a comma-joined row.
///
/// A value containing a comma, a line break, or a double quote is wrapped
/// in double quotes with internal quotes doubled; anything else passes
/// through unchanged. Stand-alone scalar lines are never escaped.
fn escape_cell(value: &str) -> String {
    let bytes = value.as_bytes();
    let needs_quoting =
        memchr3(b',', b'"', b'\n', bytes).is_some() || memchr(b'\r', bytes).is_some();
    if !needs_quoting {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: serde_json::Value) -> String {
        flatten(&ValueNode::from_json(value))
    }

    /// Inverse of `escape_cell`, used to check round-tripping.
    fn unescape_cell(cell: &str) -> String {
        if !(cell.len() >= 2 && cell.starts_with('"') && cell.ends_with('"')) {
            return cell.to_string();
        }
        cell[1..cell.len() - 1].replace("\"\"", "\"")
    }

    #[test]
    fn test_flatten_nested_object() {
        assert_eq!(
            flat(json!({"user": {"name": "Javian", "email": "x@y.com"}})),
            "user.name:Javian\nuser.email:x@y.com"
        );
    }

    #[test]
    fn test_flatten_order_record() {
        assert_eq!(
            flat(json!({"order": {"orderId": "o-456", "status": "SHIPPED"}})),
            "order.orderId:o-456\norder.status:SHIPPED"
        );
    }

    #[test]
    fn test_uniform_array_collapses_to_tabular_block() {
        assert_eq!(
            flat(json!({"items": [
                {"id": 1, "name": "Alice"},
                {"id": 2, "name": "Bob"}
            ]})),
            "items[2]{id,name}:\n1,Alice\n2,Bob"
        );
    }

    #[test]
    fn test_uniform_rows_follow_first_element_key_order() {
        assert_eq!(
            flat(json!({"items": [
                {"id": 1, "name": "Alice"},
                {"name": "Bob", "id": 2}
            ]})),
            "items[2]{id,name}:\n1,Alice\n2,Bob"
        );
    }

    #[test]
    fn test_primitive_array_collapses_to_single_line() {
        assert_eq!(flat(json!({"tags": ["a", "b", "c"]})), "tags[3]:a,b,c");
        assert_eq!(flat(json!({"nums": [1, 2.5, true, null]})), "nums[4]:1,2.5,true,null");
    }

    #[test]
    fn test_mixed_array_falls_back_to_per_index() {
        assert_eq!(
            flat(json!({"arr": [{"a": 1}, "x", {"a": 2}]})),
            "arr[0].a:1\narr[1]:x\narr[2].a:2"
        );
    }

    #[test]
    fn test_empty_array_emits_nothing() {
        assert_eq!(flat(json!({"items": [], "after": 1})), "after:1");
    }

    #[test]
    fn test_null_property_still_renders() {
        assert_eq!(flat(json!({"a": null, "b": 1})), "a:null\nb:1");
    }

    #[test]
    fn test_bare_scalar_root_uses_value_key() {
        assert_eq!(flat(json!("hello")), "value:hello");
        assert_eq!(flat(json!(42)), "value:42");
    }

    #[test]
    fn test_escaping_in_rows_only() {
        // The comma inside a row cell is quoted; the same text on a
        // stand-alone scalar line is not.
        assert_eq!(
            flat(json!({"items": [{"name": "Doe, Jane"}, {"name": "Roe"}]})),
            "items[2]{name}:\n\"Doe, Jane\"\nRoe"
        );
        assert_eq!(flat(json!({"name": "Doe, Jane"})), "name:Doe, Jane");
    }

    #[test]
    fn test_quote_doubling() {
        assert_eq!(
            flat(json!({"tags": ["say \"hi\"", "ok"]})),
            "tags[2]:\"say \"\"hi\"\"\",ok"
        );
    }

    #[test]
    fn test_escape_round_trip() {
        for original in ["a,b", "say \"hi\"", "line\nbreak", "plain", "\"", ",\",\n"] {
            let escaped = escape_cell(original);
            assert_eq!(unescape_cell(&escaped), original, "failed for {original:?}");
        }
    }

    #[test]
    fn test_nested_container_cell_renders_compact_json() {
        // Uniformity only requires matching key sets; values may be
        // containers and then render as compact JSON cells.
        assert_eq!(
            flat(json!({"items": [
                {"id": 1, "meta": {"x": 1}},
                {"id": 2, "meta": {"x": 2}}
            ]})),
            "items[2]{id,meta}:\n1,\"{\"\"x\"\":1}\"\n2,\"{\"\"x\"\":2}\""
        );
    }

    #[test]
    fn test_deep_mixed_nesting() {
        assert_eq!(
            flat(json!({"a": {"b": [{"c": 1}, [1, 2]]}})),
            "a.b[0].c:1\na.b[1][2]:1,2"
        );
    }

    #[test]
    fn test_determinism() {
        let value = json!({"z": [{"a": 1}, {"a": 2}], "y": {"x": [3, 1, 2]}});
        assert_eq!(flat(value.clone()), flat(value));
    }

    #[test]
    fn test_line_count() {
        let lines = flatten_lines(&ValueNode::from_json(json!({
            "items": [{"id": 1}, {"id": 2}],
            "name": "x"
        })));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_count(), 3);
        assert_eq!(lines[1].line_count(), 1);
    }
}
