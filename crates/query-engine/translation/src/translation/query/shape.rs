//! The parsed shape of a fetch query: one node per entity and link-entity.

use query_engine_metadata::metadata::AliasedAttribute;

/// How a link-entity relates to the node it is nested in, seen from the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// The parent looks the child up: at most one child row per parent row.
    /// Its attributes are flattened into the parent document.
    ManyToOne,
    /// The child rows point back at the parent: any number per parent row.
    /// Each child becomes a document in an array under the link alias.
    OneToMany,
}

/// A join edge between a node and its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub from: Option<String>,
    pub to: Option<String>,
    /// The alias written in the query text.
    pub fetch_alias: Option<String>,
    pub relationship_to_parent: Relationship,
    /// Prefix for this link's keys inside the nearest enclosing document. Filled in once
    /// the whole tree is built.
    pub full_alias: Option<String>,
}

/// One parsed entity or link-entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    pub table_name: String,
    pub primary_id_attribute: AliasedAttribute,
    /// Projected attributes in document order.
    pub attributes: Vec<AliasedAttribute>,
    pub required_attributes: Vec<AliasedAttribute>,
    /// `None` for the root entity.
    pub link: Option<LinkInfo>,
    pub children: Vec<QueryNode>,
}

impl LinkInfo {
    /// Classify a join from its `to` column and the parent's primary id.
    ///
    /// When `to` is the parent's primary id (or omitted, which defaults to it) the child
    /// rows reference the parent and there can be many of them.
    pub fn classify(to: Option<&str>, parent_primary_id: &str) -> Relationship {
        match to {
            Some(to) if to != parent_primary_id => Relationship::ManyToOne,
            _ => Relationship::OneToMany,
        }
    }
}

impl QueryNode {
    pub fn is_root(&self) -> bool {
        self.link.is_none()
    }

    pub fn fetch_alias(&self) -> Option<&str> {
        self.link.as_ref().and_then(|link| link.fetch_alias.as_deref())
    }

    pub fn full_alias(&self) -> Option<&str> {
        self.link.as_ref().and_then(|link| link.full_alias.as_deref())
    }

    pub fn relationship(&self) -> Option<Relationship> {
        self.link.as_ref().map(|link| link.relationship_to_parent)
    }

    /// This node and all of its descendants, depth first.
    pub fn nodes(&self) -> Vec<&QueryNode> {
        let mut nodes = vec![self];
        for child in &self.children {
            nodes.extend(child.nodes());
        }
        nodes
    }
}
