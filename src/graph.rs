use crate::model::{Graph, Size, WorkflowEdge, WorkflowNode};
use std::collections::HashSet;
use std::fmt;

/// Axis-aligned rectangle in flow coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Counts reported by [`Graph::remove_nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Removal {
    pub nodes: usize,
    pub edges: usize,
}

impl Removal {
    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.edges == 0
    }
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&WorkflowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Whether an edge with the same endpoints and anchors is already present.
    pub fn duplicate_edge_exists(&self, candidate: &WorkflowEdge) -> bool {
        self.edges.iter().any(|e| {
            e.source == candidate.source
                && e.target == candidate.target
                && e.source_handle == candidate.source_handle
                && e.target_handle == candidate.target_handle
        })
    }

    /// Remove the given nodes together with every edge touching them.
    pub fn remove_nodes(&mut self, ids: &HashSet<String>) -> Removal {
        let nodes_before = self.nodes.len();
        let edges_before = self.edges.len();
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
        Removal {
            nodes: nodes_before - self.nodes.len(),
            edges: edges_before - self.edges.len(),
        }
    }

    pub fn remove_edges(&mut self, ids: &HashSet<String>) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !ids.contains(&e.id));
        before - self.edges.len()
    }

    /// Apply a drag translation to the given nodes. Returns how many moved.
    pub fn translate_nodes(&mut self, ids: &HashSet<String>, dx: f64, dy: f64) -> usize {
        let mut moved = 0;
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            node.position.x += dx;
            node.position.y += dy;
            moved += 1;
        }
        moved
    }

    /// Nodes in drawing order: groups first, otherwise insertion order.
    pub fn render_order(&self) -> Vec<&WorkflowNode> {
        let mut ordered: Vec<&WorkflowNode> = self.nodes.iter().collect();
        ordered.sort_by_key(|n| n.z_index());
        ordered
    }

    /// Bounding box of all nodes, or `None` for an empty graph.
    pub fn bounds(&self, default_size: Size) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(|n| node_rect(n, default_size))
            .reduce(|acc, r| acc.union(&r))
    }

    /// Clear every connect-source marker. Returns whether any was set.
    pub fn clear_connect_markers(&mut self) -> bool {
        let mut changed = false;
        for node in self.nodes.iter_mut().filter(|n| n.connect_source) {
            node.connect_source = false;
            changed = true;
        }
        changed
    }

    /// Mark exactly one node as the pending connect source.
    pub fn mark_connect_source(&mut self, id: &str) {
        for node in self.nodes.iter_mut() {
            node.connect_source = node.id == id;
        }
    }
}

pub(crate) fn node_rect(node: &WorkflowNode, default_size: Size) -> Bounds {
    let size = node.size_or(default_size);
    Bounds::new(node.position.x, node.position.y, size.width, size.height)
}

// ============================================================================
// Edge Validation Framework
// ============================================================================

/// Result of edge validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Edge is valid
    Valid,
    /// Edge is invalid with a reason
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }
}

/// Reasons why an edge validation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Endpoint does not exist in the graph
    NodeNotFound(String),
    /// Source and target are the same node
    SameNode,
    /// An edge with these endpoints and anchors already exists
    DuplicateEdge,
    /// Custom validation failure
    Custom(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "Node {} not found", id),
            Self::SameNode => write!(f, "Cannot connect a node to itself"),
            Self::DuplicateEdge => write!(f, "Edge already exists"),
            Self::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

/// Rule deciding whether a candidate edge may be added to a graph.
///
/// Compose several with [`CompositeValidator`].
pub trait EdgeValidator {
    fn validate(&self, candidate: &WorkflowEdge, graph: &Graph) -> ValidationResult;
}

/// Both endpoints must exist and differ.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicEdgeValidator;

impl EdgeValidator for BasicEdgeValidator {
    fn validate(&self, candidate: &WorkflowEdge, graph: &Graph) -> ValidationResult {
        if candidate.source == candidate.target {
            return ValidationResult::Invalid(ValidationError::SameNode);
        }
        for id in [&candidate.source, &candidate.target] {
            if !graph.contains_node(id) {
                return ValidationResult::Invalid(ValidationError::NodeNotFound(id.clone()));
            }
        }
        ValidationResult::Valid
    }
}

/// Validator that prevents duplicate edges
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDuplicatesValidator;

impl EdgeValidator for NoDuplicatesValidator {
    fn validate(&self, candidate: &WorkflowEdge, graph: &Graph) -> ValidationResult {
        if graph.duplicate_edge_exists(candidate) {
            ValidationResult::Invalid(ValidationError::DuplicateEdge)
        } else {
            ValidationResult::Valid
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must return Valid for the edge to be valid (AND logic).
/// Returns the first error encountered.
///
/// ```ignore
/// let validator = CompositeValidator::new()
///     .add(BasicEdgeValidator)
///     .add(NoDuplicatesValidator);
/// ```
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn EdgeValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self { validators: Vec::new() }
    }

    /// Validators are checked in the order they were added.
    pub fn add<V: EdgeValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Existing endpoints, no self loops, no duplicates.
    pub fn standard() -> Self {
        Self::new().add(BasicEdgeValidator).add(NoDuplicatesValidator)
    }
}

impl EdgeValidator for CompositeValidator {
    fn validate(&self, candidate: &WorkflowEdge, graph: &Graph) -> ValidationResult {
        self.validators
            .iter()
            .fold(ValidationResult::Valid, |acc, v| acc.and(v.validate(candidate, graph)))
    }
}

/// Convenience function to validate an edge with any validator
pub fn validate_edge<V>(candidate: &WorkflowEdge, graph: &Graph, validator: &V) -> ValidationResult
where
    V: EdgeValidator + ?Sized,
{
    validator.validate(candidate, graph)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, NodeKind, NodePayload, Position};

    fn node(id: &str, kind: NodeKind, x: f64, y: f64) -> WorkflowNode {
        WorkflowNode::new(id, Position::new(x, y), NodePayload::new(kind, id))
    }

    fn setup_graph() -> Graph {
        Graph::new(
            vec![
                node("a", NodeKind::Api, 0.0, 0.0),
                node("g", NodeKind::Group, -50.0, -50.0).with_size(Size::new(400.0, 300.0)),
                node("b", NodeKind::Logic, 300.0, 0.0),
                node("c", NodeKind::Mysql, 600.0, 200.0),
            ],
            vec![
                WorkflowEdge::new("e1", "a", "b").with_anchors(Anchor::SourceRight, Anchor::TargetLeft),
                WorkflowEdge::new("e2", "b", "c"),
            ],
        )
    }

    const DEFAULT: Size = Size { width: 240.0, height: 140.0 };

    // ========================================================================
    // Lookup and topology
    // ========================================================================

    #[test]
    fn test_duplicate_edge_requires_matching_anchors() {
        let graph = setup_graph();
        let same = WorkflowEdge::new("x", "a", "b").with_anchors(Anchor::SourceRight, Anchor::TargetLeft);
        let other_anchor =
            WorkflowEdge::new("y", "a", "b").with_anchors(Anchor::SourceBottom, Anchor::TargetTop);
        assert!(graph.duplicate_edge_exists(&same));
        assert!(!graph.duplicate_edge_exists(&other_anchor));
    }

    #[test]
    fn test_node_rect_falls_back_to_default_size() {
        let graph = setup_graph();
        let rect = |id: &str| graph.node(id).map(|n| node_rect(n, DEFAULT));
        assert_eq!(rect("a"), Some(Bounds::new(0.0, 0.0, 240.0, 140.0)));
        assert_eq!(rect("g"), Some(Bounds::new(-50.0, -50.0, 400.0, 300.0)));
    }

    // ========================================================================
    // Mutation helpers
    // ========================================================================

    #[test]
    fn test_remove_nodes_cascades_to_edges() {
        let mut graph = setup_graph();
        let ids: HashSet<String> = ["b".to_string()].into_iter().collect();
        let removal = graph.remove_nodes(&ids);
        assert_eq!(removal, Removal { nodes: 1, edges: 2 });
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 3);
    }

    #[test]
    fn test_remove_unknown_nodes_is_empty_removal() {
        let mut graph = setup_graph();
        let ids: HashSet<String> = ["zzz".to_string()].into_iter().collect();
        assert!(graph.remove_nodes(&ids).is_empty());
        assert_eq!(graph, setup_graph());
    }

    #[test]
    fn test_remove_edges_by_id() {
        let mut graph = setup_graph();
        let ids: HashSet<String> = ["e2".to_string()].into_iter().collect();
        assert_eq!(graph.remove_edges(&ids), 1);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].id, "e1");
    }

    #[test]
    fn test_translate_only_listed_nodes() {
        let mut graph = setup_graph();
        let ids: HashSet<String> = ["a".to_string(), "c".to_string()].into_iter().collect();
        assert_eq!(graph.translate_nodes(&ids, 10.0, -5.0), 2);
        assert_eq!(graph.node("a").unwrap().position, Position::new(10.0, -5.0));
        assert_eq!(graph.node("b").unwrap().position, Position::new(300.0, 0.0));
        assert_eq!(graph.node("c").unwrap().position, Position::new(610.0, 195.0));
    }

    #[test]
    fn test_render_order_puts_groups_first_and_is_stable() {
        let graph = setup_graph();
        let ids: Vec<&str> = graph.render_order().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["g", "a", "b", "c"]);
    }

    #[test]
    fn test_bounds_cover_all_nodes() {
        let graph = setup_graph();
        let b = graph.bounds(DEFAULT).unwrap();
        assert_eq!(b.x, -50.0);
        assert_eq!(b.y, -50.0);
        assert_eq!(b.right(), 840.0);
        assert_eq!(b.bottom(), 340.0);
        assert!(Graph::default().bounds(DEFAULT).is_none());
    }

    #[test]
    fn test_connect_markers() {
        let mut graph = setup_graph();
        assert!(!graph.clear_connect_markers());
        graph.mark_connect_source("b");
        assert!(graph.node("b").unwrap().connect_source);
        assert_eq!(graph.nodes.iter().filter(|n| n.connect_source).count(), 1);
        assert!(graph.clear_connect_markers());
        assert!(graph.nodes.iter().all(|n| !n.connect_source));
    }

    // ========================================================================
    // Validators
    // ========================================================================

    #[test]
    fn test_basic_validator_accepts_valid_edge() {
        let graph = setup_graph();
        let result = BasicEdgeValidator.validate(&WorkflowEdge::new("n", "a", "c"), &graph);
        assert!(result.is_valid());
    }

    #[test]
    fn test_basic_validator_rejects_same_node() {
        let graph = setup_graph();
        let result = BasicEdgeValidator.validate(&WorkflowEdge::new("n", "a", "a"), &graph);
        assert_eq!(result, ValidationResult::Invalid(ValidationError::SameNode));
    }

    #[test]
    fn test_basic_validator_rejects_missing_node() {
        let graph = setup_graph();
        let result = BasicEdgeValidator.validate(&WorkflowEdge::new("n", "a", "nope"), &graph);
        assert_eq!(
            result,
            ValidationResult::Invalid(ValidationError::NodeNotFound("nope".into()))
        );
    }

    #[test]
    fn test_composite_validator_reports_duplicates() {
        let graph = setup_graph();
        let validator = CompositeValidator::standard();
        let dup = WorkflowEdge::new("n", "b", "c");
        assert_eq!(
            validate_edge(&dup, &graph, &validator),
            ValidationResult::Invalid(ValidationError::DuplicateEdge)
        );
        assert!(validate_edge(&WorkflowEdge::new("n", "c", "b"), &graph, &validator).is_valid());
    }

    #[test]
    fn test_validation_result_and_combinator() {
        assert!(ValidationResult::Valid.and(ValidationResult::Valid).is_valid());
        // First error wins
        let first = ValidationResult::Invalid(ValidationError::SameNode);
        let second = ValidationResult::Invalid(ValidationError::DuplicateEdge);
        assert_eq!(first.and(second), ValidationResult::Invalid(ValidationError::SameNode));
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(format!("{}", ValidationError::NodeNotFound("x".into())), "Node x not found");
        assert_eq!(format!("{}", ValidationError::DuplicateEdge), "Edge already exists");
        assert_eq!(format!("{}", ValidationError::Custom("Test error".into())), "Test error");
    }

    #[test]
    fn test_custom_validator() {
        struct FanOutValidator {
            max: usize,
        }

        impl EdgeValidator for FanOutValidator {
            fn validate(&self, candidate: &WorkflowEdge, graph: &Graph) -> ValidationResult {
                let count = graph.edges.iter().filter(|e| e.source == candidate.source).count();
                if count >= self.max {
                    ValidationResult::Invalid(ValidationError::Custom(format!(
                        "{} already has {} outgoing edges",
                        candidate.source, count
                    )))
                } else {
                    ValidationResult::Valid
                }
            }
        }

        let graph = setup_graph();
        let validator = CompositeValidator::standard().add(FanOutValidator { max: 1 });
        let result = validator.validate(&WorkflowEdge::new("n", "a", "c"), &graph);
        assert!(!result.is_valid());
    }
}
