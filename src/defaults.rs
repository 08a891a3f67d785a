//! Built-in constants and the sample graph shown on first start.

use crate::model::{
    Anchor, ApiData, DetailData, Graph, HttpMethod, NodeKind, NodePayload, Position, Size,
    TextData, WorkflowEdge, WorkflowNode,
};

pub const STORAGE_KEY: &str = "logic-flow-canvas-data";

pub const DEFAULT_NODE_SIZE: Size = Size { width: 240.0, height: 140.0 };
pub const DEFAULT_GROUP_SIZE: Size = Size { width: 400.0, height: 300.0 };
pub const MIN_GROUP_SIZE: Size = Size { width: 200.0, height: 150.0 };

pub const DEFAULT_API_PATH: &str = "/auth/login";

/// Stroke of edges drawn by the connect tool and by generation.
pub const CONNECT_EDGE_COLOR: &str = "#6366f1";
/// Stroke of the sample graph's edges.
pub const SAMPLE_EDGE_COLOR: &str = "#3b82f6";
pub const EDGE_STROKE_WIDTH: f32 = 2.5;

pub const HISTORY_LIMIT: usize = 50;

fn detail(title: &str, description: Option<&str>) -> DetailData {
    DetailData {
        title: title.to_string(),
        description: description.map(str::to_string),
    }
}

fn sample_edge(id: &str, source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge::styled(id, source, target, SAMPLE_EDGE_COLOR, EDGE_STROKE_WIDTH)
        .with_anchors(Anchor::SourceRight, Anchor::TargetLeft)
}

/// The order-service sample used when nothing is stored yet.
pub fn sample_graph() -> Graph {
    Graph::new(sample_nodes(), sample_edges())
}

pub fn sample_nodes() -> Vec<WorkflowNode> {
    vec![
        WorkflowNode::new(
            "node-app",
            Position::new(50.0, 150.0),
            NodePayload::App(detail("OrderService", None)),
        ),
        WorkflowNode::new(
            "node-trigger",
            Position::new(300.0, 150.0),
            NodePayload::Trigger(detail(
                "OnOrderCreated",
                Some("System event triggered when a new order is finalized."),
            )),
        ),
        WorkflowNode::new(
            "node-api-create",
            Position::new(600.0, 50.0),
            NodePayload::Api(ApiData {
                title: "PostPayment".to_string(),
                description: Some("Initiates a payment request via the payment gateway.".to_string()),
                method: HttpMethod::Post,
                path: "/v1/payments".to_string(),
            }),
        ),
        WorkflowNode::new(
            "node-logic",
            Position::new(600.0, 250.0),
            NodePayload::Logic(detail(
                "InventoryValidation",
                Some("Check if all ordered items are available in stock."),
            )),
        ),
        WorkflowNode::new(
            "node-mysql",
            Position::new(900.0, 250.0),
            NodePayload::new(NodeKind::Mysql, "InventoryDB"),
        ),
        WorkflowNode::new(
            "text-1",
            Position::new(50.0, 400.0),
            NodePayload::Text(TextData {
                title: "Project Setup 2025\nService Mesh Integration".to_string(),
            }),
        ),
    ]
}

pub fn sample_edges() -> Vec<WorkflowEdge> {
    vec![
        sample_edge("e1", "node-app", "node-trigger"),
        sample_edge("e2", "node-trigger", "node-api-create"),
        sample_edge("e3", "node-trigger", "node-logic"),
        sample_edge("e4", "node-logic", "node-mysql"),
    ]
}
