//! Document-relative aliases for link-entities.
//!
//! A many-to-one link is flattened into the nearest enclosing document, so its keys
//! carry the aliases of every link between that document and itself. A one-to-many link
//! opens a new document, and the chain restarts below it.

use super::shape::{QueryNode, Relationship};

/// Fill in `full_alias` on every link of the tree.
pub fn annotate_full_aliases(root: &mut QueryNode) {
    for child in &mut root.children {
        annotate(child, &[]);
    }
}

fn annotate(node: &mut QueryNode, scope: &[String]) {
    let mut segments = scope.to_vec();
    if let Some(alias) = node.fetch_alias() {
        if !segments.iter().any(|segment| segment == alias) {
            segments.push(alias.to_string());
        }
    }

    let relationship = node.relationship();
    if let Some(link) = node.link.as_mut() {
        link.full_alias = (!segments.is_empty()).then(|| segments.join("."));
    }

    let child_scope = match relationship {
        Some(Relationship::OneToMany) => vec![],
        _ => segments,
    };
    for child in &mut node.children {
        annotate(child, &child_scope);
    }
}
