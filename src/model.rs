//! Node, edge and graph data types.
//!
//! The serialized layout follows the JSON documents the canvas has always
//! written: nodes carry `position`, optional `width`/`height` and a `data`
//! object whose `type` field selects the payload variant; edges carry
//! `sourceHandle`/`targetHandle` anchors and a presentation `style`.

use serde::{Deserialize, Serialize};
use slint::Color;
use std::fmt;
use std::str::FromStr;

/// Closed set of node types shown in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Text,
    Info,
    Method,
    App,
    Api,
    Trigger,
    Job,
    Interceptor,
    Logic,
    Value,
    Impl,
    Redis,
    Mysql,
    Mq,
    Group,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Text,
        NodeKind::Info,
        NodeKind::Method,
        NodeKind::App,
        NodeKind::Api,
        NodeKind::Trigger,
        NodeKind::Job,
        NodeKind::Interceptor,
        NodeKind::Logic,
        NodeKind::Value,
        NodeKind::Impl,
        NodeKind::Redis,
        NodeKind::Mysql,
        NodeKind::Mq,
        NodeKind::Group,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Text => "TEXT",
            NodeKind::Info => "INFO",
            NodeKind::Method => "METHOD",
            NodeKind::App => "APP",
            NodeKind::Api => "API",
            NodeKind::Trigger => "TRIGGER",
            NodeKind::Job => "JOB",
            NodeKind::Interceptor => "INTERCEPTOR",
            NodeKind::Logic => "LOGIC",
            NodeKind::Value => "VALUE",
            NodeKind::Impl => "IMPL",
            NodeKind::Redis => "REDIS",
            NodeKind::Mysql => "MYSQL",
            NodeKind::Mq => "MQ",
            NodeKind::Group => "GROUP",
        }
    }

    pub fn is_group(self) -> bool {
        self == NodeKind::Group
    }

    /// Palette section this kind is listed under.
    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::Text | NodeKind::Info | NodeKind::Method => NodeCategory::General,
            NodeKind::App
            | NodeKind::Api
            | NodeKind::Trigger
            | NodeKind::Job
            | NodeKind::Interceptor
            | NodeKind::Logic
            | NodeKind::Value
            | NodeKind::Impl => NodeCategory::Development,
            NodeKind::Redis | NodeKind::Mysql | NodeKind::Mq => NodeCategory::Infrastructure,
            NodeKind::Group => NodeCategory::Container,
        }
    }

    /// Kinds drawn as a compact icon tile instead of a detail card.
    pub fn is_icon(self) -> bool {
        matches!(
            self,
            NodeKind::Redis | NodeKind::Mysql | NodeKind::Mq | NodeKind::App | NodeKind::Value
        )
    }

    /// Title given to a node freshly added from the palette.
    pub fn default_title(self) -> String {
        match self {
            NodeKind::Redis => "Redis".to_string(),
            NodeKind::Mysql => "MySQL".to_string(),
            NodeKind::Mq => "MQ".to_string(),
            NodeKind::App => "Application".to_string(),
            NodeKind::Value => "Value".to_string(),
            NodeKind::Group => "New Group".to_string(),
            other => format!("New {}", other.as_str()),
        }
    }
}

/// Palette sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    General,
    Development,
    Infrastructure,
    Container,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 4] = [
        NodeCategory::General,
        NodeCategory::Development,
        NodeCategory::Infrastructure,
        NodeCategory::Container,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeCategory::General => "General",
            NodeCategory::Development => "Development",
            NodeCategory::Infrastructure => "Infrastructure",
            NodeCategory::Container => "Container",
        }
    }

    /// Kinds in this section, in palette order.
    pub fn kinds(self) -> Vec<NodeKind> {
        NodeKind::ALL.into_iter().filter(|k| k.category() == self).collect()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeKind(pub String);

impl fmt::Display for UnknownNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node type '{}'", self.0)
    }
}

impl std::error::Error for UnknownNodeKind {}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// HTTP verbs an API node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Case-insensitive parse; `None` for anything that is not a supported verb.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

/// Scalar carried by VALUE nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

fn default_api_path() -> String {
    crate::defaults::DEFAULT_API_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub title: String,
}

/// Title plus optional free-text description; shared by most kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_api_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ScalarValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub title: String,
}

/// Per-kind node payload, tagged by the `type` field of the `data` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodePayload {
    Text(TextData),
    Info(DetailData),
    Method(DetailData),
    App(DetailData),
    Api(ApiData),
    Trigger(DetailData),
    Job(JobData),
    Interceptor(DetailData),
    Logic(DetailData),
    Value(ValueData),
    Impl(DetailData),
    Redis(DetailData),
    Mysql(DetailData),
    Mq(DetailData),
    Group(GroupData),
}

/// A committed edit of one payload field.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    Title(String),
    Description(String),
    Method(HttpMethod),
    Path(String),
    Cron(Option<String>),
    Value(Option<ScalarValue>),
}

impl NodeEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            NodeEdit::Title(_) => "title",
            NodeEdit::Description(_) => "description",
            NodeEdit::Method(_) => "method",
            NodeEdit::Path(_) => "path",
            NodeEdit::Cron(_) => "cron",
            NodeEdit::Value(_) => "value",
        }
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl NodePayload {
    /// Build a payload for `kind` with the given title and empty optional fields.
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        let title = title.into();
        let detail = |title: String| DetailData { title, description: None };
        match kind {
            NodeKind::Text => NodePayload::Text(TextData { title }),
            NodeKind::Info => NodePayload::Info(detail(title)),
            NodeKind::Method => NodePayload::Method(detail(title)),
            NodeKind::App => NodePayload::App(detail(title)),
            NodeKind::Api => NodePayload::Api(ApiData {
                title,
                description: None,
                method: HttpMethod::default(),
                path: default_api_path(),
            }),
            NodeKind::Trigger => NodePayload::Trigger(detail(title)),
            NodeKind::Job => NodePayload::Job(JobData { title, description: None, cron: None }),
            NodeKind::Interceptor => NodePayload::Interceptor(detail(title)),
            NodeKind::Logic => NodePayload::Logic(detail(title)),
            NodeKind::Value => NodePayload::Value(ValueData { title, value: None }),
            NodeKind::Impl => NodePayload::Impl(detail(title)),
            NodeKind::Redis => NodePayload::Redis(detail(title)),
            NodeKind::Mysql => NodePayload::Mysql(detail(title)),
            NodeKind::Mq => NodePayload::Mq(detail(title)),
            NodeKind::Group => NodePayload::Group(GroupData { title }),
        }
    }

    /// Payload a palette click produces: default title, empty description,
    /// and `POST /auth/login` for API nodes.
    pub fn palette_default(kind: NodeKind) -> Self {
        let mut payload = Self::new(kind, kind.default_title());
        payload.apply_edit(&NodeEdit::Description(String::new()));
        payload
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Text(_) => NodeKind::Text,
            NodePayload::Info(_) => NodeKind::Info,
            NodePayload::Method(_) => NodeKind::Method,
            NodePayload::App(_) => NodeKind::App,
            NodePayload::Api(_) => NodeKind::Api,
            NodePayload::Trigger(_) => NodeKind::Trigger,
            NodePayload::Job(_) => NodeKind::Job,
            NodePayload::Interceptor(_) => NodeKind::Interceptor,
            NodePayload::Logic(_) => NodeKind::Logic,
            NodePayload::Value(_) => NodeKind::Value,
            NodePayload::Impl(_) => NodeKind::Impl,
            NodePayload::Redis(_) => NodeKind::Redis,
            NodePayload::Mysql(_) => NodeKind::Mysql,
            NodePayload::Mq(_) => NodeKind::Mq,
            NodePayload::Group(_) => NodeKind::Group,
        }
    }

    fn detail(&self) -> Option<&DetailData> {
        match self {
            NodePayload::Info(d)
            | NodePayload::Method(d)
            | NodePayload::App(d)
            | NodePayload::Trigger(d)
            | NodePayload::Interceptor(d)
            | NodePayload::Logic(d)
            | NodePayload::Impl(d)
            | NodePayload::Redis(d)
            | NodePayload::Mysql(d)
            | NodePayload::Mq(d) => Some(d),
            _ => None,
        }
    }

    fn detail_mut(&mut self) -> Option<&mut DetailData> {
        match self {
            NodePayload::Info(d)
            | NodePayload::Method(d)
            | NodePayload::App(d)
            | NodePayload::Trigger(d)
            | NodePayload::Interceptor(d)
            | NodePayload::Logic(d)
            | NodePayload::Impl(d)
            | NodePayload::Redis(d)
            | NodePayload::Mysql(d)
            | NodePayload::Mq(d) => Some(d),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            NodePayload::Text(d) => &d.title,
            NodePayload::Api(d) => &d.title,
            NodePayload::Job(d) => &d.title,
            NodePayload::Value(d) => &d.title,
            NodePayload::Group(d) => &d.title,
            other => other.detail().map(|d| d.title.as_str()).unwrap_or_default(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            NodePayload::Api(d) => d.description.as_deref(),
            NodePayload::Job(d) => d.description.as_deref(),
            other => other.detail().and_then(|d| d.description.as_deref()),
        }
    }

    fn title_mut(&mut self) -> &mut String {
        match self {
            NodePayload::Text(d) => &mut d.title,
            NodePayload::Api(d) => &mut d.title,
            NodePayload::Job(d) => &mut d.title,
            NodePayload::Value(d) => &mut d.title,
            NodePayload::Group(d) => &mut d.title,
            NodePayload::Info(d)
            | NodePayload::Method(d)
            | NodePayload::App(d)
            | NodePayload::Trigger(d)
            | NodePayload::Interceptor(d)
            | NodePayload::Logic(d)
            | NodePayload::Impl(d)
            | NodePayload::Redis(d)
            | NodePayload::Mysql(d)
            | NodePayload::Mq(d) => &mut d.title,
        }
    }

    fn description_mut(&mut self) -> Option<&mut Option<String>> {
        match self {
            NodePayload::Api(d) => Some(&mut d.description),
            NodePayload::Job(d) => Some(&mut d.description),
            other => other.detail_mut().map(|d| &mut d.description),
        }
    }

    /// Whether this payload has a slot for the field `edit` targets.
    pub fn supports(&self, edit: &NodeEdit) -> bool {
        match edit {
            NodeEdit::Title(_) => true,
            NodeEdit::Description(_) => !matches!(
                self,
                NodePayload::Text(_) | NodePayload::Value(_) | NodePayload::Group(_)
            ),
            NodeEdit::Method(_) | NodeEdit::Path(_) => matches!(self, NodePayload::Api(_)),
            NodeEdit::Cron(_) => matches!(self, NodePayload::Job(_)),
            NodeEdit::Value(_) => matches!(self, NodePayload::Value(_)),
        }
    }

    /// Apply a field edit. Returns `true` if the payload changed; edits of
    /// fields this kind does not carry change nothing.
    pub fn apply_edit(&mut self, edit: &NodeEdit) -> bool {
        match (edit, self) {
            (NodeEdit::Title(title), payload) => set_if_changed(payload.title_mut(), title.clone()),
            (NodeEdit::Description(text), payload) => match payload.description_mut() {
                Some(slot) => set_if_changed(slot, Some(text.clone())),
                None => false,
            },
            (NodeEdit::Method(method), NodePayload::Api(d)) => set_if_changed(&mut d.method, *method),
            (NodeEdit::Path(path), NodePayload::Api(d)) => set_if_changed(&mut d.path, path.clone()),
            (NodeEdit::Cron(cron), NodePayload::Job(d)) => set_if_changed(&mut d.cron, cron.clone()),
            (NodeEdit::Value(value), NodePayload::Value(d)) => {
                set_if_changed(&mut d.value, value.clone())
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A positioned, typed element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "data")]
    pub payload: NodePayload,
    /// Marks the pending source of the connect tool. Never persisted.
    #[serde(skip)]
    pub connect_source: bool,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, position: Position, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            position,
            width: None,
            height: None,
            payload,
            connect_source: false,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.set_size(size);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn title(&self) -> &str {
        self.payload.title()
    }

    /// Explicit size, if both dimensions are known.
    pub fn size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Size { width, height }),
            _ => None,
        }
    }

    /// Size with each missing dimension replaced from `fallback`.
    pub fn size_or(&self, fallback: Size) -> Size {
        Size {
            width: self.width.unwrap_or(fallback.width),
            height: self.height.unwrap_or(fallback.height),
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = Some(size.width);
        self.height = Some(size.height);
    }

    /// Stacking order; groups sit beneath everything else.
    pub fn z_index(&self) -> i32 {
        if self.kind().is_group() {
            -1
        } else {
            0
        }
    }
}

/// Side of a node an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

/// One of the eight named connection anchors: a source- or target-facing
/// anchor on each side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    #[serde(rename = "s-t")]
    SourceTop,
    #[serde(rename = "s-r")]
    SourceRight,
    #[serde(rename = "s-b")]
    SourceBottom,
    #[serde(rename = "s-l")]
    SourceLeft,
    #[serde(rename = "t-t")]
    TargetTop,
    #[serde(rename = "t-r")]
    TargetRight,
    #[serde(rename = "t-b")]
    TargetBottom,
    #[serde(rename = "t-l")]
    TargetLeft,
}

impl Anchor {
    pub fn source(side: Side) -> Self {
        match side {
            Side::Top => Anchor::SourceTop,
            Side::Right => Anchor::SourceRight,
            Side::Bottom => Anchor::SourceBottom,
            Side::Left => Anchor::SourceLeft,
        }
    }

    pub fn target(side: Side) -> Self {
        match side {
            Side::Top => Anchor::TargetTop,
            Side::Right => Anchor::TargetRight,
            Side::Bottom => Anchor::TargetBottom,
            Side::Left => Anchor::TargetLeft,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Anchor::SourceTop | Anchor::TargetTop => Side::Top,
            Anchor::SourceRight | Anchor::TargetRight => Side::Right,
            Anchor::SourceBottom | Anchor::TargetBottom => Side::Bottom,
            Anchor::SourceLeft | Anchor::TargetLeft => Side::Left,
        }
    }

    pub fn is_source(self) -> bool {
        matches!(
            self,
            Anchor::SourceTop | Anchor::SourceRight | Anchor::SourceBottom | Anchor::SourceLeft
        )
    }

    /// Handle identifier as used in persisted documents, e.g. `"s-r"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::SourceTop => "s-t",
            Anchor::SourceRight => "s-r",
            Anchor::SourceBottom => "s-b",
            Anchor::SourceLeft => "s-l",
            Anchor::TargetTop => "t-t",
            Anchor::TargetRight => "t-r",
            Anchor::TargetBottom => "t-b",
            Anchor::TargetLeft => "t-l",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerKind {
    #[serde(rename = "arrow")]
    Arrow,
    #[default]
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMarker {
    #[serde(rename = "type", default)]
    pub kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStroke {
    pub stroke: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f32,
}

/// A directed connection between two nodes' anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceHandle", default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Anchor>,
    #[serde(rename = "targetHandle", default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Anchor>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStroke>,
    #[serde(rename = "markerEnd", default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<EdgeMarker>,
}

impl WorkflowEdge {
    /// Plain edge without anchors or styling.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            animated: false,
            style: None,
            marker_end: None,
        }
    }

    /// Animated edge stroked in `color` with a matching closed arrow head.
    pub fn styled(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        color: &str,
        stroke_width: f32,
    ) -> Self {
        Self {
            animated: true,
            style: Some(EdgeStroke { stroke: color.to_string(), stroke_width }),
            marker_end: Some(EdgeMarker {
                kind: MarkerKind::ArrowClosed,
                color: Some(color.to_string()),
            }),
            ..Self::new(id, source, target)
        }
    }

    pub fn with_anchors(mut self, source_handle: Anchor, target_handle: Anchor) -> Self {
        self.source_handle = Some(source_handle);
        self.target_handle = Some(target_handle);
        self
    }

    /// Stroke colour for rendering; white when unstyled or unparsable.
    pub fn stroke_color(&self) -> Color {
        self.style
            .as_ref()
            .and_then(|s| parse_hex_color(&s.stroke))
            .unwrap_or_else(|| Color::from_rgb_u8(255, 255, 255))
    }
}

/// Parse `#rgb` or `#rrggbb` into a Slint colour.
pub fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    let expand = |c: u8| c * 17;
    match hex.len() {
        3 => {
            let v = u16::from_str_radix(hex, 16).ok()?;
            Some(Color::from_rgb_u8(
                expand(((v >> 8) & 0xf) as u8),
                expand(((v >> 4) & 0xf) as u8),
                expand((v & 0xf) as u8),
            ))
        }
        6 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            Some(Color::from_rgb_u8((v >> 16) as u8, (v >> 8) as u8, v as u8))
        }
        _ => None,
    }
}

/// The `(nodes, edges)` pair; also the persisted and exported document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

impl Graph {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
