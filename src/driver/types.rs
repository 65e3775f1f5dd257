//! Driver Types
//!
//! 드라이버에서 사용하는 값 모델 정의. 와이어 구조체(PackStream)를
//! 그래프 값(Node, Relationship, Path)과 스칼라 값으로 변환합니다.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::error::{DriverError, DriverResult};
use crate::bolt::packstream::marker::{NODE_TAG, PATH_TAG, RELATIONSHIP_TAG};
use crate::bolt::packstream::{
    PackStreamNode, PackStreamPath, PackStreamRelationship, PackStreamUnboundRelationship,
    PackStreamValue,
};

// ============================================================================
// ValueType - 값 타입 태그
// ============================================================================

/// 값 종류마다 고정된 타입 태그
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// NULL
    Null,
    /// BOOLEAN
    Boolean,
    /// INTEGER
    Integer,
    /// FLOAT
    Float,
    /// STRING
    String,
    /// LIST
    List,
    /// MAP
    Map,
    /// NODE
    Node,
    /// RELATIONSHIP
    Relationship,
    /// PATH
    Path,
}

impl ValueType {
    /// 타입 이름
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "NULL",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Integer => "INTEGER",
            ValueType::Float => "FLOAT",
            ValueType::String => "STRING",
            ValueType::List => "LIST",
            ValueType::Map => "MAP",
            ValueType::Node => "NODE",
            ValueType::Relationship => "RELATIONSHIP",
            ValueType::Path => "PATH",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Value - 그래프 값
// ============================================================================

/// 그래프 값 타입
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer (i64)
    Integer(i64),
    /// Float (f64)
    Float(f64),
    /// String
    String(String),
    /// List
    List(Vec<Value>),
    /// Map
    Map(HashMap<String, Value>),
    /// Node
    Node(Node),
    /// Relationship
    Relationship(Relationship),
    /// Path
    Path(Path),
}

impl Value {
    /// Null 여부
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean으로 변환
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer로 변환
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float로 변환
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String으로 변환
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// List로 변환
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Map으로 변환
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Node로 변환
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Relationship으로 변환
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Path로 변환
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    /// 타입 태그
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
            Value::Node(_) => ValueType::Node,
            Value::Relationship(_) => ValueType::Relationship,
            Value::Path(_) => ValueType::Path,
        }
    }

    /// 타입 이름
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// 크기. 경로는 관계 수, 노드와 관계는 속성 수, 스칼라는 `None`.
    pub fn size(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(l) => Some(l.len()),
            Value::Map(m) => Some(m.len()),
            Value::Node(n) => Some(n.properties.len()),
            Value::Relationship(r) => Some(r.properties.len()),
            Value::Path(p) => Some(p.len()),
            Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Float(_) => None,
        }
    }
}

fn write_properties(f: &mut fmt::Formatter<'_>, map: &HashMap<String, Value>) -> fmt::Result {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    f.write_str("{")?;
    for (i, (k, v)) in entries.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", k, v)?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:?}", fl),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(l) => {
                f.write_str("[")?;
                for (i, item) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => write_properties(f, m),
            Value::Node(n) => write!(f, "{}", n),
            Value::Relationship(r) => write!(f, "{}", r),
            Value::Path(p) => write!(f, "{}", p),
        }
    }
}

// ============================================================================
// Structural hashing
// ============================================================================

fn hash_float<H: Hasher>(value: f64, state: &mut H) {
    // 0.0 == -0.0
    let value = if value == 0.0 { 0.0 } else { value };
    value.to_bits().hash(state);
}

fn hash_properties<H: Hasher>(map: &HashMap<String, Value>, state: &mut H) {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.len().hash(state);
    for (k, v) in entries {
        k.hash(state);
        v.hash(state);
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(fl) => hash_float(*fl, state),
            Value::String(s) => s.hash(state),
            Value::List(l) => l.hash(state),
            Value::Map(m) => hash_properties(m, state),
            Value::Node(n) => n.hash(state),
            Value::Relationship(r) => r.hash(state),
            Value::Path(p) => p.hash(state),
        }
    }
}

// From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(v: HashMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(v)
    }
}

impl From<Relationship> for Value {
    fn from(v: Relationship) -> Self {
        Value::Relationship(v)
    }
}

impl From<Path> for Value {
    fn from(v: Path) -> Self {
        Value::Path(v)
    }
}

// ============================================================================
// Node - 그래프 노드
// ============================================================================

/// 그래프 노드
///
/// 두 노드는 ID와 속성이 같으면 같습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 노드 ID
    pub id: i64,
    /// 레이블
    pub labels: Vec<String>,
    /// 속성
    pub properties: HashMap<String, Value>,
}

impl Node {
    /// 새 노드 생성
    pub fn new(id: i64, labels: Vec<String>, properties: HashMap<String, Value>) -> Self {
        Self {
            id,
            labels,
            properties,
        }
    }

    /// 레이블 포함 여부
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// 속성 가져오기
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// 속성 가져오기 (타입 변환)
    pub fn get_as<T: TryFrom<Value, Error = DriverError>>(&self, key: &str) -> DriverResult<T> {
        self.properties
            .get(key)
            .cloned()
            .ok_or_else(|| DriverError::type_conversion(format!("Property '{}' not found", key)))
            .and_then(|v| T::try_from(v))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.properties == other.properties
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        hash_properties(&self.properties, state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = if self.labels.is_empty() {
            String::new()
        } else {
            format!(":{}", self.labels.join(":"))
        };
        write!(f, "({}{})", self.id, labels)
    }
}

// ============================================================================
// Relationship - 그래프 관계
// ============================================================================

/// 그래프 관계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// 관계 ID
    pub id: i64,
    /// 시작 노드 ID
    pub start_node_id: i64,
    /// 끝 노드 ID
    pub end_node_id: i64,
    /// 타입
    #[serde(rename = "type")]
    pub rel_type: String,
    /// 속성
    pub properties: HashMap<String, Value>,
}

impl Relationship {
    /// 새 관계 생성
    pub fn new(
        id: i64,
        start_node_id: i64,
        end_node_id: i64,
        rel_type: impl Into<String>,
        properties: HashMap<String, Value>,
    ) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// 속성 가져오기
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl Hash for Relationship {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.start_node_id.hash(state);
        self.end_node_id.hash(state);
        self.rel_type.hash(state);
        hash_properties(&self.properties, state);
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({})-[{}:{}]->({})",
            self.start_node_id, self.id, self.rel_type, self.end_node_id
        )
    }
}

// ============================================================================
// Path - 그래프 경로
// ============================================================================

/// 그래프 경로
///
/// `nodes` 는 방문 순서대로 `relationships.len() + 1` 개입니다.
/// `relationships[i]` 는 `nodes[i]` 와 `nodes[i + 1]` 을 (어느 방향으로든) 잇습니다.
/// [`Path::new`] 가 이 조건을 검사하므로 만들어진 경로는 항상 일관됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathParts")]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
struct PathParts {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
}

impl TryFrom<PathParts> for Path {
    type Error = DriverError;

    fn try_from(parts: PathParts) -> DriverResult<Self> {
        Path::new(parts.nodes, parts.relationships)
    }
}

/// 경로의 한 구간
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    /// 구간 시작 노드
    pub start: &'a Node,
    /// 구간 관계
    pub relationship: &'a Relationship,
    /// 구간 끝 노드
    pub end: &'a Node,
}

impl Path {
    /// 새 경로 생성
    ///
    /// 노드 수가 관계 수 + 1 이 아니거나 관계가 이웃한 두 노드를 잇지 않으면
    /// `DriverError::Client` 를 돌려줍니다.
    pub fn new(nodes: Vec<Node>, relationships: Vec<Relationship>) -> DriverResult<Self> {
        if nodes.len() != relationships.len() + 1 {
            return Err(DriverError::client(format!(
                "A path with {} relationships needs {} nodes, got {}",
                relationships.len(),
                relationships.len() + 1,
                nodes.len()
            )));
        }
        for (i, rel) in relationships.iter().enumerate() {
            let (prev, next) = (nodes[i].id, nodes[i + 1].id);
            let connects = (rel.start_node_id == prev && rel.end_node_id == next)
                || (rel.start_node_id == next && rel.end_node_id == prev);
            if !connects {
                return Err(DriverError::client(format!(
                    "Path relationship {} does not connect nodes {} and {}",
                    rel.id, prev, next
                )));
            }
        }
        Ok(Self { nodes, relationships })
    }

    /// 방문 순서대로의 노드
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// 방문 순서대로의 관계
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// 경로 길이 (관계 수)
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// 빈 경로 여부
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// 시작 노드
    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// 끝 노드
    pub fn end(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// 구간들
    pub fn segments(&self) -> Vec<Segment<'_>> {
        self.relationships
            .iter()
            .enumerate()
            .filter_map(|(i, relationship)| {
                Some(Segment {
                    start: self.nodes.get(i)?,
                    relationship,
                    end: self.nodes.get(i + 1)?,
                })
            })
            .collect()
    }

    /// 노드 포함 여부
    pub fn contains_node(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// 관계 포함 여부
    pub fn contains_relationship(&self, relationship: &Relationship) -> bool {
        self.relationships.contains(relationship)
    }
}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
        self.relationships.hash(state);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path[{}]", self.len())
    }
}

// ============================================================================
// PackStreamValue conversions
// ============================================================================

fn properties_to_wire(properties: HashMap<String, Value>) -> HashMap<String, PackStreamValue> {
    properties.into_iter().map(|(k, v)| (k, v.into())).collect()
}

fn properties_from_wire(
    properties: HashMap<String, PackStreamValue>,
) -> DriverResult<HashMap<String, Value>> {
    properties
        .into_iter()
        .map(|(k, v)| Ok((k, Value::try_from(v)?)))
        .collect()
}

impl From<Node> for PackStreamNode {
    fn from(node: Node) -> Self {
        PackStreamNode::new(node.id, node.labels, properties_to_wire(node.properties))
    }
}

impl TryFrom<PackStreamNode> for Node {
    type Error = DriverError;

    fn try_from(node: PackStreamNode) -> DriverResult<Self> {
        Ok(Node::new(node.id, node.labels, properties_from_wire(node.properties)?))
    }
}

impl From<Relationship> for PackStreamRelationship {
    fn from(rel: Relationship) -> Self {
        PackStreamRelationship::new(
            rel.id,
            rel.start_node_id,
            rel.end_node_id,
            rel.rel_type,
            properties_to_wire(rel.properties),
        )
    }
}

impl TryFrom<PackStreamRelationship> for Relationship {
    type Error = DriverError;

    fn try_from(rel: PackStreamRelationship) -> DriverResult<Self> {
        Ok(Relationship::new(
            rel.id,
            rel.start_node_id,
            rel.end_node_id,
            rel.rel_type,
            properties_from_wire(rel.properties)?,
        ))
    }
}

impl From<Path> for PackStreamPath {
    /// 노드와 관계를 중복 없이 모으고 (관계, 노드) 인덱스 쌍을 만듭니다.
    fn from(path: Path) -> Self {
        let mut nodes = Vec::new();
        let mut node_index: HashMap<i64, usize> = HashMap::new();
        // positions[k] 는 path.nodes[k] 의 중복 제거된 인덱스
        let positions: Vec<usize> = path
            .nodes
            .iter()
            .map(|node| {
                *node_index.entry(node.id).or_insert_with(|| {
                    nodes.push(PackStreamNode::from(node.clone()));
                    nodes.len() - 1
                })
            })
            .collect();

        let mut relationships = Vec::new();
        let mut rel_index: HashMap<i64, usize> = HashMap::new();
        let mut indices = Vec::with_capacity(path.relationships.len() * 2);
        for (i, rel) in path.relationships.iter().enumerate() {
            let position = *rel_index.entry(rel.id).or_insert_with(|| {
                relationships.push(PackStreamUnboundRelationship::new(
                    rel.id,
                    rel.rel_type.clone(),
                    properties_to_wire(rel.properties.clone()),
                ));
                relationships.len()
            }) as i64;

            // Path::new 가 nodes.len() == relationships.len() + 1 을 보장
            let forward = path.nodes[i].id == rel.start_node_id;
            indices.push(if forward { position } else { -position });
            indices.push(positions[i + 1] as i64);
        }

        PackStreamPath::new(nodes, relationships, indices)
    }
}

impl TryFrom<PackStreamPath> for Path {
    type Error = DriverError;

    /// 압축된 와이어 표현에서 방문 순서대로 경로를 복원합니다.
    fn try_from(wire: PackStreamPath) -> DriverResult<Self> {
        let PackStreamPath {
            nodes,
            relationships,
            indices,
        } = wire;

        if indices.len() % 2 != 0 {
            return Err(DriverError::protocol(format!(
                "Path indices must come in pairs, got {}",
                indices.len()
            )));
        }

        let nodes = nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<DriverResult<Vec<_>>>()?;
        let first = nodes
            .first()
            .cloned()
            .ok_or_else(|| DriverError::protocol("Path must contain at least one node"))?;

        let mut prev_id = first.id;
        let mut path_nodes = Vec::with_capacity(indices.len() / 2 + 1);
        let mut path_rels = Vec::with_capacity(indices.len() / 2);
        path_nodes.push(first);

        for pair in indices.chunks(2) {
            let (rel_idx, node_idx) = (pair[0], pair[1]);

            let rel = usize::try_from(rel_idx.unsigned_abs())
                .ok()
                .filter(|&i| i >= 1)
                .and_then(|i| relationships.get(i - 1))
                .ok_or_else(|| {
                    DriverError::protocol(format!(
                        "Path relationship index {} out of range (1..={})",
                        rel_idx,
                        relationships.len()
                    ))
                })?;
            let next = usize::try_from(node_idx)
                .ok()
                .and_then(|i| nodes.get(i))
                .ok_or_else(|| {
                    DriverError::protocol(format!(
                        "Path node index {} out of range (0..{})",
                        node_idx,
                        nodes.len()
                    ))
                })?;

            let bound = if rel_idx > 0 {
                rel.bind(prev_id, next.id)
            } else {
                rel.bind(next.id, prev_id)
            };
            path_rels.push(Relationship::try_from(bound)?);
            path_nodes.push(next.clone());
            prev_id = next.id;
        }

        // 인덱스에서 직접 묶었으므로 항상 이웃한 노드를 잇습니다.
        Ok(Path {
            nodes: path_nodes,
            relationships: path_rels,
        })
    }
}

impl From<Value> for PackStreamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PackStreamValue::Null,
            Value::Boolean(b) => PackStreamValue::Boolean(b),
            Value::Integer(i) => PackStreamValue::Integer(i),
            Value::Float(f) => PackStreamValue::Float(f),
            Value::String(s) => PackStreamValue::String(s),
            Value::List(l) => PackStreamValue::List(l.into_iter().map(Into::into).collect()),
            Value::Map(m) => PackStreamValue::Map(properties_to_wire(m)),
            Value::Node(n) => PackStreamNode::from(n).to_value(),
            Value::Relationship(r) => PackStreamRelationship::from(r).to_value(),
            Value::Path(p) => PackStreamPath::from(p).to_value(),
        }
    }
}

impl TryFrom<PackStreamValue> for Value {
    type Error = DriverError;

    fn try_from(value: PackStreamValue) -> DriverResult<Self> {
        match value {
            PackStreamValue::Null => Ok(Value::Null),
            PackStreamValue::Boolean(b) => Ok(Value::Boolean(b)),
            PackStreamValue::Integer(i) => Ok(Value::Integer(i)),
            PackStreamValue::Float(f) => Ok(Value::Float(f)),
            PackStreamValue::String(s) => Ok(Value::String(s)),
            PackStreamValue::List(l) => Ok(Value::List(
                l.into_iter().map(Value::try_from).collect::<DriverResult<_>>()?,
            )),
            PackStreamValue::Map(m) => Ok(Value::Map(properties_from_wire(m)?)),
            PackStreamValue::Structure(s) => {
                let tag = s.tag;
                let value = PackStreamValue::Structure(s);
                match tag {
                    NODE_TAG => Ok(Value::Node(PackStreamNode::from_value(&value)?.try_into()?)),
                    RELATIONSHIP_TAG => Ok(Value::Relationship(
                        PackStreamRelationship::from_value(&value)?.try_into()?,
                    )),
                    PATH_TAG => Ok(Value::Path(PackStreamPath::from_value(&value)?.try_into()?)),
                    other => Err(DriverError::protocol(format!(
                        "Unknown structure signature 0x{:02X} in value position",
                        other
                    ))),
                }
            }
        }
    }
}

// ============================================================================
// TryFrom implementations
// ============================================================================

macro_rules! impl_try_from_value {
    ($target:ty, $label:literal, $($pattern:pat => $result:expr),+ $(,)?) => {
        impl TryFrom<Value> for $target {
            type Error = DriverError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    $($pattern => Ok($result),)+
                    other => Err(DriverError::type_conversion(format!(
                        "Cannot convert {} to {}",
                        other.type_name(),
                        $label
                    ))),
                }
            }
        }
    };
}

impl_try_from_value!(bool, "bool", Value::Boolean(b) => b);
impl_try_from_value!(i64, "i64", Value::Integer(i) => i);
impl_try_from_value!(f64, "f64", Value::Float(f) => f, Value::Integer(i) => i as f64);
impl_try_from_value!(String, "String", Value::String(s) => s);
impl_try_from_value!(Vec<Value>, "List", Value::List(l) => l);
impl_try_from_value!(HashMap<String, Value>, "Map", Value::Map(m) => m);
impl_try_from_value!(Node, "Node", Value::Node(n) => n);
impl_try_from_value!(Relationship, "Relationship", Value::Relationship(r) => r);
impl_try_from_value!(Path, "Path", Value::Path(p) => p);

// ============================================================================
// Tests
// ============================================================================
