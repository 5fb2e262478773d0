//! Rewrites applied to a fetch document before it is executed.

use uuid::Uuid;

use super::ast::{Element, FetchDocument, Node, ATTRIBUTE, LINK_ENTITY};

/// Placeholder in a fetch template that stands for the target record id.
pub const TARGET_ID_PLACEHOLDER: &str = "{0}";

/// Identity column shared by every activity-type table.
pub const ACTIVITY_ID: &str = "activityid";

/// Substitute the target record id into a fetch template.
pub fn substitute_target_id(template: &str, target_id: &Uuid) -> String {
    template.replace(TARGET_ID_PLACEHOLDER, &target_id.to_string())
}

/// Make sure the root entity and every link-entity project their primary id attribute.
///
/// The primary id is named `{table}id`. Elements without a `name` are left alone, and so
/// are elements already projecting `activityid`.
pub fn populate_primary_id_attributes(document: &mut FetchDocument) {
    if let Some(entity) = document.entity_mut() {
        populate_primary_id_attribute(entity);
    }
}

fn populate_primary_id_attribute(element: &mut Element) {
    if let Some(table_name) = element.attribute("name").filter(|name| !name.trim().is_empty()) {
        let primary_id = format!("{table_name}id");
        let projected = element
            .projected_attributes()
            .any(|name| name == primary_id || name == ACTIVITY_ID);
        if !projected {
            tracing::debug!(table = table_name, primary_id = %primary_id, "adding primary id attribute");
            element.push_attribute_element(&primary_id);
        }
    }

    for child in element.elements_mut().filter(|child| child.name == LINK_ENTITY) {
        populate_primary_id_attribute(child);
    }
}

/// Drop every `<attribute>` that is not flagged `required="true"`, then project each of
/// the given attribute names on the root entity unless the root entity already projects it.
pub fn restrict_to_required<'a>(
    document: &mut FetchDocument,
    attribute_names: impl IntoIterator<Item = &'a str>,
) {
    remove_non_required_attributes(&mut document.root);

    let Some(entity) = document.entity_mut() else {
        return;
    };

    for attribute_name in attribute_names {
        let already_projected = entity
            .projected_attributes()
            .any(|name| name == attribute_name);
        if !already_projected {
            entity.push_attribute_element(attribute_name);
        }
    }
}

fn remove_non_required_attributes(element: &mut Element) {
    element.children.retain(|node| match node {
        Node::Element(child) => child.name != ATTRIBUTE || child.is_required(),
        Node::Text(_) => true,
    });
    for child in element.elements_mut() {
        remove_non_required_attributes(child);
    }
}

/// Set the paging attributes on the `<fetch>` element. Documents without one are unchanged.
pub fn set_paging(
    document: &mut FetchDocument,
    page_size: u32,
    page: u32,
    paging_cookie: Option<&str>,
) {
    if let Some(fetch) = document.fetch_mut() {
        fetch.set_attribute("count", page_size.to_string());
        fetch.set_attribute("page", page.to_string());
        if let Some(cookie) = paging_cookie.filter(|cookie| !cookie.trim().is_empty()) {
            fetch.set_attribute("paging-cookie", cookie);
        }
    }
}
