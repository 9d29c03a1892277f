use crate::value::{array_shape, ArrayShape, Classified, ValueNode};

const COMPLEX_DEPTH: usize = 3;
const COMPLEX_ARRAYS: usize = 5;
const COMPLEX_OBJECTS: usize = 10;
const MODERATE_DEPTH: usize = 1;
const MODERATE_OBJECTS: usize = 3;

/// Coarse complexity class of an input, derived from exact thresholds so
/// repeated runs classify identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    /// Flat and small
    Simple,
    /// Some nesting or any array
    Moderate,
    /// Deep nesting or many containers
    Complex,
}

/// What kind of input the analysis decided it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    /// Plain text at or below the long-text threshold
    Text,
    /// Plain text above the long-text threshold
    LongText,
    /// An opaque binary blob
    Image,
    /// A tree with an array root
    Array,
    /// A tree with an object root (also the default)
    Object,
}

/// Aggregate shape metrics over one value tree.
///
/// Computed fresh per call by a single depth-first traversal; never cached
/// or shared across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAnalysis {
    /// Maximum nesting depth reached (root = 0)
    pub depth: usize,

    /// Number of object nodes
    pub object_count: usize,

    /// Number of array nodes
    pub array_count: usize,

    /// Sum of rendered scalar lengths in characters
    pub text_length: usize,

    /// Whether any array collapses to a tabular block
    pub has_uniform_arrays: bool,

    /// Whether any array collapses to a single comma line
    pub has_primitive_arrays: bool,

    /// Whether any object sits below the root
    pub has_nested_objects: bool,

    /// Coarse complexity class
    pub complexity: Complexity,

    /// What kind of input this is
    pub inferred_type: InferredType,
}

/// Analyzes a value tree, inferring the root type from its shape.
#[must_use]
pub fn analyze_tree(root: &ValueNode) -> DataAnalysis {
    let mut walk = Walk::default();
    walk.visit(root, 0);

    let inferred_type = match root {
        ValueNode::Array(_) => InferredType::Array,
        _ => InferredType::Object,
    };

    walk.finish(inferred_type)
}

/// Analyzes a classified input.
///
/// Non-tree inputs get a flat analysis whose `inferred_type` and
/// `text_length` reflect the original input.
pub(crate) fn analyze_input(input: &Classified) -> DataAnalysis {
    match input {
        Classified::Tree(node) => analyze_tree(node),
        Classified::Text(text) => flat_analysis(InferredType::Text, text.chars().count()),
        Classified::LongText(text) => flat_analysis(InferredType::LongText, text.chars().count()),
        Classified::Binary(_) => flat_analysis(InferredType::Image, 0),
        // Malformed input is recovered before analysis; classify it as
        // plain text if it ever gets here.
        Classified::Malformed(_) => flat_analysis(InferredType::Text, 0),
    }
}

fn flat_analysis(inferred_type: InferredType, text_length: usize) -> DataAnalysis {
    DataAnalysis {
        depth: 0,
        object_count: 0,
        array_count: 0,
        text_length,
        has_uniform_arrays: false,
        has_primitive_arrays: false,
        has_nested_objects: false,
        complexity: Complexity::Simple,
        inferred_type,
    }
}

/// Accumulator for the single depth-first traversal.
#[derive(Debug, Default)]
struct Walk {
    depth: usize,
    object_count: usize,
    array_count: usize,
    text_length: usize,
    has_uniform_arrays: bool,
    has_primitive_arrays: bool,
    has_nested_objects: bool,
}

impl Walk {
    fn visit(&mut self, node: &ValueNode, depth: usize) {
        self.depth = self.depth.max(depth);

        match node {
            ValueNode::Object(entries) => {
                self.object_count += 1;
                if depth > 0 {
                    self.has_nested_objects = true;
                }
                for (_, value) in entries {
                    self.visit(value, depth + 1);
                }
            }
            ValueNode::Array(items) => {
                self.array_count += 1;
                match array_shape(items) {
                    ArrayShape::Uniform { .. } => self.has_uniform_arrays = true,
                    ArrayShape::Primitive => self.has_primitive_arrays = true,
                    ArrayShape::Mixed | ArrayShape::Empty => {}
                }
                for item in items {
                    self.visit(item, depth + 1);
                }
            }
            scalar => {
                if let Some(text) = scalar.render_scalar() {
                    self.text_length += text.chars().count();
                }
            }
        }
    }

    fn finish(self, inferred_type: InferredType) -> DataAnalysis {
        let complexity = if self.depth > COMPLEX_DEPTH
            || self.array_count > COMPLEX_ARRAYS
            || self.object_count > COMPLEX_OBJECTS
        {
            Complexity::Complex
        } else if self.depth > MODERATE_DEPTH
            || self.array_count > 0
            || self.object_count > MODERATE_OBJECTS
        {
            Complexity::Moderate
        } else {
            Complexity::Simple
        };

        DataAnalysis {
            depth: self.depth,
            object_count: self.object_count,
            array_count: self.array_count,
            text_length: self.text_length,
            has_uniform_arrays: self.has_uniform_arrays,
            has_primitive_arrays: self.has_primitive_arrays,
            has_nested_objects: self.has_nested_objects,
            complexity,
            inferred_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> ValueNode {
        ValueNode::from_json(value)
    }

    #[test]
    fn test_flat_object_is_simple() {
        let analysis = analyze_tree(&tree(json!({"a": 1, "b": "x"})));
        assert_eq!(analysis.depth, 1);
        assert_eq!(analysis.object_count, 1);
        assert_eq!(analysis.array_count, 0);
        assert_eq!(analysis.complexity, Complexity::Simple);
        assert_eq!(analysis.inferred_type, InferredType::Object);
        assert!(!analysis.has_nested_objects);
    }

    #[test]
    fn test_nested_object_is_moderate() {
        let analysis = analyze_tree(&tree(json!({"user": {"name": "Javian"}})));
        assert_eq!(analysis.depth, 2);
        assert!(analysis.has_nested_objects);
        assert_eq!(analysis.complexity, Complexity::Moderate);
    }

    #[test]
    fn test_any_array_is_moderate() {
        let analysis = analyze_tree(&tree(json!({"tags": [1, 2, 3]})));
        assert_eq!(analysis.array_count, 1);
        assert!(analysis.has_primitive_arrays);
        assert_eq!(analysis.complexity, Complexity::Moderate);
    }

    #[test]
    fn test_deep_tree_is_complex() {
        let analysis = analyze_tree(&tree(json!({"a": {"b": {"c": {"d": {"e": 1}}}}})));
        assert_eq!(analysis.depth, 5);
        assert_eq!(analysis.complexity, Complexity::Complex);
    }

    #[test]
    fn test_many_objects_is_complex() {
        // 11 objects within depth 3 trips the object-count threshold alone.
        let analysis = analyze_tree(&tree(json!({
            "a": {}, "b": {}, "c": {}, "d": {}, "e": {},
            "f": {}, "g": {}, "h": {}, "i": {}, "j": {}
        })));
        assert_eq!(analysis.object_count, 11);
        assert_eq!(analysis.complexity, Complexity::Complex);
    }

    #[test]
    fn test_uniform_array_detected() {
        let analysis = analyze_tree(&tree(json!({
            "items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]
        })));
        assert!(analysis.has_uniform_arrays);
        assert!(!analysis.has_primitive_arrays);
    }

    #[test]
    fn test_empty_array_is_neither() {
        let analysis = analyze_tree(&tree(json!({"items": []})));
        assert!(!analysis.has_uniform_arrays);
        assert!(!analysis.has_primitive_arrays);
        assert_eq!(analysis.array_count, 1);
    }

    #[test]
    fn test_root_array_inferred_type() {
        let analysis = analyze_tree(&tree(json!([1, 2, 3])));
        assert_eq!(analysis.inferred_type, InferredType::Array);
    }

    #[test]
    fn test_text_length_sums_rendered_scalars() {
        // "Javian" (6) + 42 (2) + true (4) + null (4)
        let analysis = analyze_tree(&tree(json!({
            "name": "Javian", "n": 42, "ok": true, "missing": null
        })));
        assert_eq!(analysis.text_length, 16);
    }

    #[test]
    fn test_analyze_input_text_kinds() {
        let analysis = analyze_input(&Classified::Text("Hello".to_string()));
        assert_eq!(analysis.inferred_type, InferredType::Text);
        assert_eq!(analysis.text_length, 5);

        let analysis = analyze_input(&Classified::LongText("x".repeat(600)));
        assert_eq!(analysis.inferred_type, InferredType::LongText);

        let analysis = analyze_input(&Classified::Binary(vec![1, 2, 3]));
        assert_eq!(analysis.inferred_type, InferredType::Image);
        assert_eq!(analysis.complexity, Complexity::Simple);
    }
}
