//! Translate fetch query text into a tree of query nodes.

pub mod alias;
pub mod shape;

use query_engine_fetch::fetch;
use query_engine_fetch::fetch::ast::{Element, FetchDocument, ATTRIBUTE, LINK_ENTITY};
use query_engine_fetch::fetch::helpers::ACTIVITY_ID;
use query_engine_metadata::metadata::AliasedAttribute;

use crate::translation::error::Error;
use shape::{LinkInfo, QueryNode};

/// Parse fetch query text into its query shape.
pub fn parse_query_shape(text: &str) -> Result<QueryNode, Error> {
    let document = fetch::parse::parse_document(text)?;
    query_shape_from_document(&document)
}

/// Build the query shape of an already parsed fetch document.
pub fn query_shape_from_document(document: &FetchDocument) -> Result<QueryNode, Error> {
    let entity = document.entity().ok_or(Error::MissingEntity)?;

    let mut root = translate_node(entity, None)?;
    alias::annotate_full_aliases(&mut root);

    tracing::debug!(
        table = %root.table_name,
        nodes = root.nodes().len(),
        "parsed query shape"
    );
    Ok(root)
}

/// Translate one entity or link-entity element. `parent_primary_id` is `None` for the
/// root entity.
fn translate_node(element: &Element, parent_primary_id: Option<&str>) -> Result<QueryNode, Error> {
    let table_name = element
        .attribute("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::MissingTableName {
            element: element.name.clone(),
        })?
        .to_string();

    let link = parent_primary_id.map(|parent_primary_id| {
        let to = non_blank(element.attribute("to"));
        LinkInfo {
            from: non_blank(element.attribute("from")),
            relationship_to_parent: LinkInfo::classify(to.as_deref(), parent_primary_id),
            to,
            fetch_alias: non_blank(element.attribute("alias")),
            full_alias: None,
        }
    });
    let alias = link.as_ref().and_then(|link| link.fetch_alias.as_deref());

    let mut attributes = vec![];
    let mut required_attributes = vec![];
    let mut link_elements = vec![];
    for child in element.elements() {
        match child.name.as_str() {
            ATTRIBUTE => {
                if let Some(name) = non_blank(child.attribute("name")) {
                    let attribute = match alias {
                        Some(alias) => AliasedAttribute::new(name, Some(alias)),
                        // root attributes may already be written `alias.name`
                        None => AliasedAttribute::parse(&name),
                    };
                    if child.is_required() {
                        required_attributes.push(attribute.clone());
                    }
                    attributes.push(attribute);
                }
            }
            LINK_ENTITY => link_elements.push(child),
            // filters, orders and the like do not shape the response
            _ => {}
        }
    }

    let primary_id_attribute = primary_id_attribute(&table_name, alias, &attributes)?;

    let children = link_elements
        .into_iter()
        .map(|child| translate_node(child, Some(&primary_id_attribute.name)))
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(QueryNode {
        table_name,
        primary_id_attribute,
        attributes,
        required_attributes,
        link,
        children,
    })
}

/// `{table}id` when projected, otherwise `activityid` when projected, otherwise the
/// shape cannot be mapped.
fn primary_id_attribute(
    table_name: &str,
    alias: Option<&str>,
    attributes: &[AliasedAttribute],
) -> Result<AliasedAttribute, Error> {
    let primary_id = format!("{table_name}id");
    let projected = |name: &str| attributes.iter().any(|attribute| attribute.name == name);

    if projected(&primary_id) {
        Ok(AliasedAttribute::new(primary_id, alias))
    } else if projected(ACTIVITY_ID) {
        Ok(AliasedAttribute::new(ACTIVITY_ID, alias))
    } else {
        Err(Error::InvalidQueryShape {
            table: table_name.to_string(),
            alias: alias.map(str::to_string),
            primary_id,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
