//! Graph structures carried inside PackStream.
//!
//! Each structure has a fixed signature and field count. Decoding demands
//! the exact count; a missing or surplus field is an error.

use std::collections::HashMap;

use super::marker::*;
use super::types::{PackStreamStructure, PackStreamValue};
use super::PackStreamError;

type Properties = HashMap<String, PackStreamValue>;

fn invalid(msg: impl Into<String>) -> PackStreamError {
    PackStreamError::InvalidStructure(msg.into())
}

/// Check tag and arity, handing back the fields.
fn expect_fields<'v>(
    value: &'v PackStreamValue,
    tag: u8,
    arity: usize,
    name: &str,
) -> Result<&'v [PackStreamValue], PackStreamError> {
    let s = value
        .as_structure()
        .ok_or_else(|| invalid(format!("expected {} structure, got {}", name, value.type_name())))?;
    if s.tag != tag {
        return Err(invalid(format!(
            "expected {} signature 0x{:02X}, got 0x{:02X}",
            name, tag, s.tag
        )));
    }
    if s.fields.len() != arity {
        return Err(invalid(format!(
            "{} requires {} fields, got {}",
            name,
            arity,
            s.fields.len()
        )));
    }
    Ok(&s.fields)
}

fn int_field(v: &PackStreamValue, what: &str) -> Result<i64, PackStreamError> {
    v.as_int()
        .ok_or_else(|| invalid(format!("{} must be an integer, got {}", what, v.type_name())))
}

fn str_field(v: &PackStreamValue, what: &str) -> Result<String, PackStreamError> {
    v.as_str()
        .map(str::to_owned)
        .ok_or_else(|| invalid(format!("{} must be a string, got {}", what, v.type_name())))
}

fn map_field(v: &PackStreamValue, what: &str) -> Result<Properties, PackStreamError> {
    v.as_map()
        .cloned()
        .ok_or_else(|| invalid(format!("{} must be a map, got {}", what, v.type_name())))
}

fn list_field<'v>(
    v: &'v PackStreamValue,
    what: &str,
) -> Result<&'v [PackStreamValue], PackStreamError> {
    v.as_list()
        .ok_or_else(|| invalid(format!("{} must be a list, got {}", what, v.type_name())))
}

fn structure(tag: u8, fields: Vec<PackStreamValue>) -> PackStreamValue {
    PackStreamValue::Structure(PackStreamStructure::new(tag, fields))
}

/// `Node(id, labels, properties)`
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamNode {
    /// Identity.
    pub id: i64,
    /// Labels.
    pub labels: Vec<String>,
    /// Properties.
    pub properties: Properties,
}

impl PackStreamNode {
    /// Create from parts.
    pub fn new(id: i64, labels: Vec<String>, properties: Properties) -> Self {
        Self { id, labels, properties }
    }

    /// Wire structure.
    pub fn to_value(&self) -> PackStreamValue {
        structure(
            NODE_TAG,
            vec![
                PackStreamValue::Integer(self.id),
                PackStreamValue::List(self.labels.iter().map(|l| l.as_str().into()).collect()),
                PackStreamValue::Map(self.properties.clone()),
            ],
        )
    }

    /// Parse from a wire structure, checking signature and field count.
    pub fn from_value(value: &PackStreamValue) -> Result<Self, PackStreamError> {
        let fields = expect_fields(value, NODE_TAG, NODE_FIELDS, "Node")?;
        let labels = list_field(&fields[1], "Node labels")?
            .iter()
            .map(|l| str_field(l, "Node label"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: int_field(&fields[0], "Node id")?,
            labels,
            properties: map_field(&fields[2], "Node properties")?,
        })
    }
}

/// `Relationship(id, start_id, end_id, type, properties)`
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamRelationship {
    /// Identity.
    pub id: i64,
    /// Start node identity.
    pub start_node_id: i64,
    /// End node identity.
    pub end_node_id: i64,
    /// Relationship type.
    pub rel_type: String,
    /// Properties.
    pub properties: Properties,
}

impl PackStreamRelationship {
    /// Create from parts.
    pub fn new(
        id: i64,
        start_node_id: i64,
        end_node_id: i64,
        rel_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// Wire structure.
    pub fn to_value(&self) -> PackStreamValue {
        structure(
            RELATIONSHIP_TAG,
            vec![
                PackStreamValue::Integer(self.id),
                PackStreamValue::Integer(self.start_node_id),
                PackStreamValue::Integer(self.end_node_id),
                PackStreamValue::String(self.rel_type.clone()),
                PackStreamValue::Map(self.properties.clone()),
            ],
        )
    }

    /// Parse from a wire structure, checking signature and field count.
    pub fn from_value(value: &PackStreamValue) -> Result<Self, PackStreamError> {
        let fields = expect_fields(value, RELATIONSHIP_TAG, RELATIONSHIP_FIELDS, "Relationship")?;
        Ok(Self {
            id: int_field(&fields[0], "Relationship id")?,
            start_node_id: int_field(&fields[1], "Relationship start id")?,
            end_node_id: int_field(&fields[2], "Relationship end id")?,
            rel_type: str_field(&fields[3], "Relationship type")?,
            properties: map_field(&fields[4], "Relationship properties")?,
        })
    }
}

/// `UnboundRelationship(id, type, properties)`, only found inside paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamUnboundRelationship {
    /// Identity.
    pub id: i64,
    /// Relationship type.
    pub rel_type: String,
    /// Properties.
    pub properties: Properties,
}

impl PackStreamUnboundRelationship {
    /// Create from parts.
    pub fn new(id: i64, rel_type: impl Into<String>, properties: Properties) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            properties,
        }
    }

    /// Wire structure.
    pub fn to_value(&self) -> PackStreamValue {
        structure(
            UNBOUND_RELATIONSHIP_TAG,
            vec![
                PackStreamValue::Integer(self.id),
                PackStreamValue::String(self.rel_type.clone()),
                PackStreamValue::Map(self.properties.clone()),
            ],
        )
    }

    /// Parse from a wire structure, checking signature and field count.
    pub fn from_value(value: &PackStreamValue) -> Result<Self, PackStreamError> {
        let fields = expect_fields(
            value,
            UNBOUND_RELATIONSHIP_TAG,
            UNBOUND_RELATIONSHIP_FIELDS,
            "UnboundRelationship",
        )?;
        Ok(Self {
            id: int_field(&fields[0], "UnboundRelationship id")?,
            rel_type: str_field(&fields[1], "UnboundRelationship type")?,
            properties: map_field(&fields[2], "UnboundRelationship properties")?,
        })
    }

    /// Attach endpoints.
    pub fn bind(&self, start_node_id: i64, end_node_id: i64) -> PackStreamRelationship {
        PackStreamRelationship::new(
            self.id,
            start_node_id,
            end_node_id,
            self.rel_type.clone(),
            self.properties.clone(),
        )
    }
}

/// `Path(nodes, relationships, indices)` in its compact wire form.
///
/// `indices` alternates a relationship index and a node index per hop.
/// Relationship indices are 1-based into `relationships`; a negative index
/// means the hop walks against the relationship's direction. Node indices
/// are 0-based into `nodes`, which always starts with the path's first node.
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamPath {
    /// Distinct nodes.
    pub nodes: Vec<PackStreamNode>,
    /// Distinct relationships.
    pub relationships: Vec<PackStreamUnboundRelationship>,
    /// Alternating relationship and node indices.
    pub indices: Vec<i64>,
}

impl PackStreamPath {
    /// Create from parts.
    pub fn new(
        nodes: Vec<PackStreamNode>,
        relationships: Vec<PackStreamUnboundRelationship>,
        indices: Vec<i64>,
    ) -> Self {
        Self {
            nodes,
            relationships,
            indices,
        }
    }

    /// Wire structure.
    pub fn to_value(&self) -> PackStreamValue {
        structure(
            PATH_TAG,
            vec![
                PackStreamValue::List(self.nodes.iter().map(PackStreamNode::to_value).collect()),
                PackStreamValue::List(
                    self.relationships
                        .iter()
                        .map(PackStreamUnboundRelationship::to_value)
                        .collect(),
                ),
                PackStreamValue::List(self.indices.iter().map(|&i| i.into()).collect()),
            ],
        )
    }

    /// Parse from a wire structure, checking signature and field count.
    pub fn from_value(value: &PackStreamValue) -> Result<Self, PackStreamError> {
        let fields = expect_fields(value, PATH_TAG, PATH_FIELDS, "Path")?;
        let nodes = list_field(&fields[0], "Path nodes")?
            .iter()
            .map(PackStreamNode::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let relationships = list_field(&fields[1], "Path relationships")?
            .iter()
            .map(PackStreamUnboundRelationship::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        let indices = list_field(&fields[2], "Path indices")?
            .iter()
            .map(|i| int_field(i, "Path index"))
            .collect::<Result<Vec<_>, _>>()?;
        if indices.len() % 2 != 0 {
            return Err(invalid(format!(
                "Path indices must come in pairs, got {}",
                indices.len()
            )));
        }
        Ok(Self::new(nodes, relationships, indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(key: &str, value: i64) -> Properties {
        let mut map = HashMap::new();
        map.insert(key.to_string(), PackStreamValue::Integer(value));
        map
    }

    #[test]
    fn test_node_roundtrip() {
        let node = PackStreamNode::new(1, vec!["Person".into()], props("age", 30));
        let value = node.to_value();
        let s = value.as_structure().unwrap();
        assert_eq!(s.tag, NODE_TAG);
        assert_eq!(s.fields.len(), NODE_FIELDS);
        assert_eq!(PackStreamNode::from_value(&value).unwrap(), node);
    }

    #[test]
    fn test_node_rejects_wrong_arity() {
        let short = structure(NODE_TAG, vec![1.into(), PackStreamValue::List(vec![])]);
        assert!(PackStreamNode::from_value(&short).is_err());

        let mut long = PackStreamNode::new(1, vec![], HashMap::new()).to_value();
        if let PackStreamValue::Structure(s) = &mut long {
            s.fields.push("element-id".into());
        }
        assert!(PackStreamNode::from_value(&long).is_err());
    }

    #[test]
    fn test_node_rejects_bad_label() {
        let value = structure(
            NODE_TAG,
            vec![
                1.into(),
                PackStreamValue::List(vec![5.into()]),
                PackStreamValue::Map(HashMap::new()),
            ],
        );
        let err = PackStreamNode::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("Node label"));
    }

    #[test]
    fn test_relationship_roundtrip() {
        let rel = PackStreamRelationship::new(10, 1, 2, "KNOWS", props("since", 2020));
        let value = rel.to_value();
        assert_eq!(value.as_structure().unwrap().fields.len(), RELATIONSHIP_FIELDS);
        assert_eq!(PackStreamRelationship::from_value(&value).unwrap(), rel);
    }

    #[test]
    fn test_relationship_rejects_node_tag() {
        let node = PackStreamNode::new(1, vec![], HashMap::new()).to_value();
        assert!(PackStreamRelationship::from_value(&node).is_err());
    }

    #[test]
    fn test_unbound_relationship_bind() {
        let unbound = PackStreamUnboundRelationship::new(3, "LIKES", HashMap::new());
        let value = unbound.to_value();
        let parsed = PackStreamUnboundRelationship::from_value(&value).unwrap();
        let bound = parsed.bind(7, 8);
        assert_eq!(bound.id, 3);
        assert_eq!(bound.start_node_id, 7);
        assert_eq!(bound.end_node_id, 8);
        assert_eq!(bound.rel_type, "LIKES");
    }

    #[test]
    fn test_path_roundtrip() {
        let path = PackStreamPath::new(
            vec![
                PackStreamNode::new(1, vec![], HashMap::new()),
                PackStreamNode::new(2, vec![], HashMap::new()),
            ],
            vec![PackStreamUnboundRelationship::new(5, "R", HashMap::new())],
            vec![1, 1],
        );
        let value = path.to_value();
        assert_eq!(PackStreamPath::from_value(&value).unwrap(), path);
    }

    #[test]
    fn test_path_rejects_odd_indices() {
        let value = structure(
            PATH_TAG,
            vec![
                PackStreamValue::List(vec![PackStreamNode::new(1, vec![], HashMap::new()).to_value()]),
                PackStreamValue::List(vec![]),
                PackStreamValue::List(vec![1.into()]),
            ],
        );
        assert!(PackStreamPath::from_value(&value).is_err());
    }
}
