//! Rebuild a nested message document from the flat rows of a fetch response.
//!
//! The root record's attributes come from the first row. Every link-entity is then
//! resolved against the rows of the (single) root record: one-to-many links become
//! arrays of documents under the link alias, and many-to-one links are spliced into the
//! enclosing document with their keys prefixed by the link's full alias.

use std::hash::Hash;

use indexmap::IndexMap;
use nonempty::NonEmpty;
use query_engine_metadata::metadata::{DocumentValue, MessageDocument, Row, RowSet};
use query_engine_translation::translation::query::shape::{QueryNode, Relationship};
use serde_json::Value;

use crate::error::Error;
use crate::values::{formatted_key, normalize};

/// Rows that share an id, in response order.
type Group<'a> = NonEmpty<&'a Row>;

/// A resolved link-entity, waiting to be merged into its parent document.
#[derive(Debug, Clone, PartialEq)]
enum Linked {
    /// Documents nested under a key of the parent.
    Collection {
        key: String,
        documents: Vec<MessageDocument>,
    },
    /// Keys spliced into the parent document.
    Inline(MessageDocument),
}

/// Build the message document for the rows of one root record.
///
/// With a `reference` record only its attribute names are taken from the root entity.
/// An empty row-set gives an empty document.
pub fn flatten(
    shape: &QueryNode,
    rows: &RowSet,
    reference: Option<&Row>,
    include_formatted: bool,
) -> Result<MessageDocument, Error> {
    let Some(first) = rows.rows().first() else {
        tracing::debug!("no rows to flatten");
        return Ok(MessageDocument::new());
    };

    let mut document = root_document(shape, first, reference, include_formatted);
    tracing::debug!(
        restricted = reference.is_some(),
        include_formatted,
        attributes = document.len(),
        "collected root attributes"
    );

    let root_id = shape.primary_id_attribute.key();
    let groups = group_rows(rows.rows(), |row| Some(row.id(&root_id)));
    if groups.len() > 1 {
        tracing::warn!(
            table = %shape.table_name,
            count = groups.len(),
            "multiple root records in response"
        );
        return Err(Error::AmbiguousRoot {
            count: groups.len(),
        });
    }

    if let Some(group) = groups.first() {
        let rows: Vec<&Row> = group.iter().copied().collect();
        merge_linked(&mut document, link_documents(shape, &rows, include_formatted));
    }
    Ok(document)
}

fn root_document(
    shape: &QueryNode,
    first: &Row,
    reference: Option<&Row>,
    include_formatted: bool,
) -> MessageDocument {
    let active: Vec<&str> = match reference {
        Some(reference) => reference.attributes.keys().map(String::as_str).collect(),
        None => shape
            .attributes
            .iter()
            .map(|attribute| attribute.name.as_str())
            .collect(),
    };
    let is_active = |key: &str| active.iter().any(|name| name.eq_ignore_ascii_case(key));

    let mut document = MessageDocument::new();
    for (key, value) in &first.attributes {
        if is_active(key) {
            document.insert_if_absent(key.clone(), normalize(value).into());
        }
    }

    if include_formatted {
        for (key, text) in &first.formatted_values {
            if !key.contains('.') && is_active(key) {
                document.insert_if_absent(
                    formatted_key(key, first.get(key)),
                    Value::String(text.clone()).into(),
                );
            }
        }
    }

    document.attributes.sort_keys();
    document
}

/// Resolve every link-entity of `node` against the rows of one record of `node`.
fn link_documents(node: &QueryNode, rows: &[&Row], include_formatted: bool) -> Vec<Linked> {
    node.children
        .iter()
        .filter_map(|child| link_document(child, rows, include_formatted))
        .collect()
}

fn link_document(child: &QueryNode, rows: &[&Row], include_formatted: bool) -> Option<Linked> {
    // rows without the child's id did not match the join
    let id_key = child.primary_id_attribute.key();
    let groups = group_rows(rows.iter().copied(), |row| row.id(&id_key));

    let mut documents: Vec<MessageDocument> = groups
        .iter()
        .map(|group| child_document(child, group, include_formatted))
        .collect();
    let key = child.fetch_alias().unwrap_or(&child.table_name).to_string();

    match child.relationship() {
        Some(Relationship::ManyToOne) => match documents.len() {
            0 => None,
            1 => documents.pop().map(Linked::Inline),
            count => {
                tracing::warn!(
                    alias = %key,
                    count,
                    "many-to-one link matched several records, nesting them instead"
                );
                Some(Linked::Collection { key, documents })
            }
        },
        _ => Some(Linked::Collection { key, documents }),
    }
}

fn child_document(child: &QueryNode, group: &Group, include_formatted: bool) -> MessageDocument {
    let row = group.head;
    let prefix = match child.relationship() {
        Some(Relationship::ManyToOne) => child.full_alias(),
        _ => None,
    };
    let document_key = |name: &str| match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    };

    let mut document = MessageDocument::new();
    for attribute in &child.attributes {
        if let Some(value) = row.get(&attribute.key()) {
            document.insert_if_absent(document_key(&attribute.name), normalize(value).into());
        }
    }

    if include_formatted {
        for attribute in &child.attributes {
            let row_key = attribute.key();
            if let Some(text) = row.formatted_value(&row_key) {
                document.insert_if_absent(
                    formatted_key(&document_key(&attribute.name), row.get(&row_key)),
                    Value::String(text.to_string()).into(),
                );
            }
        }
    }

    let rows: Vec<&Row> = group.iter().copied().collect();
    merge_linked(&mut document, link_documents(child, &rows, include_formatted));
    document
}

/// Collections go in before inline splices. Keys already in `document` are kept.
fn merge_linked(document: &mut MessageDocument, linked: Vec<Linked>) {
    let (collections, splices): (Vec<_>, Vec<_>) = linked
        .into_iter()
        .partition(|linked| matches!(linked, Linked::Collection { .. }));

    for linked in collections.into_iter().chain(splices) {
        match linked {
            Linked::Collection { key, documents } => {
                document.insert_if_absent(key, DocumentValue::Collection(documents));
            }
            Linked::Inline(spliced) => document.merge(spliced),
        }
    }
}

/// Group rows by `key`, keeping first-seen order. Rows for which `key` gives `None` are
/// skipped.
fn group_rows<'a, K: Hash + Eq>(
    rows: impl IntoIterator<Item = &'a Row>,
    key: impl Fn(&Row) -> Option<K>,
) -> Vec<Group<'a>> {
    let mut groups: IndexMap<K, Group<'a>> = IndexMap::new();
    for row in rows {
        let Some(key) = key(row) else {
            continue;
        };
        match groups.entry(key) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().push(row),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(NonEmpty::new(row));
            }
        }
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use query_engine_metadata::metadata::{AliasedValue, AttributeValue, EntityReference};
    use query_engine_translation::translation::query::parse_query_shape;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    const ORDER_QUERY: &str = r#"
        <fetch>
          <entity name="order">
            <attribute name="orderid" />
            <attribute name="name" />
            <attribute name="customerid" />
            <link-entity name="customer" from="customerid" to="customerid" alias="cust">
              <attribute name="customerid" />
              <attribute name="name" />
            </link-entity>
            <link-entity name="orderline" from="orderid" to="orderid" alias="lines">
              <attribute name="orderlineid" />
              <attribute name="quantity" />
            </link-entity>
          </entity>
        </fetch>"#;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn aliased(attribute: &str, value: AttributeValue) -> AttributeValue {
        AttributeValue::Aliased(AliasedValue {
            entity_logical_name: None,
            attribute_logical_name: attribute.to_string(),
            value: Box::new(value),
        })
    }

    fn row(attributes: Vec<(&str, AttributeValue)>) -> Row {
        Row {
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            ..Row::default()
        }
    }

    fn order_row(line: Option<(u128, i64)>, customer: bool) -> Row {
        let mut attributes = vec![
            ("orderid", AttributeValue::Guid(id(1))),
            ("name", AttributeValue::String("SO-1".to_string())),
            (
                "customerid",
                AttributeValue::EntityReference(EntityReference {
                    logical_name: "customer".to_string(),
                    id: id(2),
                    name: Some("Contoso".to_string()),
                }),
            ),
        ];
        if customer {
            attributes.push(("cust.customerid", aliased("customerid", AttributeValue::Guid(id(2)))));
            attributes.push((
                "cust.name",
                aliased("name", AttributeValue::String("Contoso".to_string())),
            ));
        }
        if let Some((line_id, quantity)) = line {
            attributes.push(("lines.orderlineid", aliased("orderlineid", AttributeValue::Guid(id(line_id)))));
            attributes.push(("lines.quantity", aliased("quantity", AttributeValue::Integer(quantity))));
        }
        row(attributes)
    }

    #[test]
    fn nests_one_to_many_and_splices_many_to_one() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        let rows = RowSet(vec![
            order_row(Some((10, 1)), true),
            order_row(Some((11, 2)), true),
            order_row(Some((12, 3)), true),
        ]);

        let document = flatten(&shape, &rows, None, false).unwrap();

        similar_asserts::assert_eq!(
            document.to_json(),
            json!({
                "customerid": "00000000-0000-0000-0000-000000000002",
                "name": "SO-1",
                "orderid": "00000000-0000-0000-0000-000000000001",
                "lines": [
                    { "orderlineid": "00000000-0000-0000-0000-00000000000a", "quantity": 1 },
                    { "orderlineid": "00000000-0000-0000-0000-00000000000b", "quantity": 2 },
                    { "orderlineid": "00000000-0000-0000-0000-00000000000c", "quantity": 3 }
                ],
                "cust.customerid": "00000000-0000-0000-0000-000000000002",
                "cust.name": "Contoso"
            })
        );
        assert_eq!(
            document.keys().collect::<Vec<_>>(),
            vec!["customerid", "name", "orderid", "lines", "cust.customerid", "cust.name"]
        );
    }

    #[test]
    fn duplicate_child_ids_keep_the_first_row() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        let rows = RowSet(vec![order_row(Some((10, 1)), true), order_row(Some((10, 5)), true)]);

        let document = flatten(&shape, &rows, None, false).unwrap();

        similar_asserts::assert_eq!(
            document.get("lines").unwrap().to_json(),
            json!([{ "orderlineid": "00000000-0000-0000-0000-00000000000a", "quantity": 1 }])
        );
    }

    #[test]
    fn unmatched_links_give_empty_arrays_and_no_keys() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        let rows = RowSet(vec![order_row(None, false)]);

        let document = flatten(&shape, &rows, None, false).unwrap();

        similar_asserts::assert_eq!(
            document.to_json(),
            json!({
                "customerid": "00000000-0000-0000-0000-000000000002",
                "name": "SO-1",
                "orderid": "00000000-0000-0000-0000-000000000001",
                "lines": []
            })
        );
    }

    #[test]
    fn rejects_rows_of_several_root_records() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        let mut other = order_row(None, false);
        other.attributes.insert("orderid".to_string(), AttributeValue::Guid(id(99)));

        let result = flatten(&shape, &RowSet(vec![order_row(None, false), other]), None, false);
        assert!(matches!(result, Err(Error::AmbiguousRoot { count: 2 })));

        let mut without_id = order_row(None, false);
        without_id.attributes.shift_remove("orderid");
        let result = flatten(
            &shape,
            &RowSet(vec![order_row(None, false), without_id.clone()]),
            None,
            false,
        );
        assert!(matches!(result, Err(Error::AmbiguousRoot { count: 2 })));

        // rows that all lack the id still belong to one record
        let document = flatten(&shape, &RowSet(vec![without_id.clone(), without_id]), None, false).unwrap();
        assert_eq!(document.get("name").unwrap().to_json(), json!("SO-1"));
    }

    #[test]
    fn empty_rows_give_an_empty_document() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        assert_eq!(
            flatten(&shape, &RowSet::default(), None, true).unwrap(),
            MessageDocument::new()
        );
    }

    #[test]
    fn reference_record_restricts_root_attributes() {
        let shape = parse_query_shape(
            r#"<entity name="account"><attribute name="accountid" /><attribute name="name" /><attribute name="revenue" /></entity>"#,
        )
        .unwrap();
        let rows = RowSet(vec![row(vec![
            ("accountid", AttributeValue::Guid(id(1))),
            ("name", AttributeValue::String("Acme".to_string())),
            ("revenue", AttributeValue::Money(10.0)),
        ])]);
        let reference = row(vec![("name", AttributeValue::String("Acme".to_string()))]);

        let document = flatten(&shape, &rows, Some(&reference), false).unwrap();

        similar_asserts::assert_eq!(document.to_json(), json!({ "name": "Acme" }));
    }

    #[test]
    fn adds_display_text_without_overwriting() {
        let shape = parse_query_shape(
            r#"<entity name="account">
                 <attribute name="accountid" />
                 <attribute name="statuscode" />
                 <attribute name="statuscodename" />
                 <attribute name="revenue" />
                 <link-entity name="contact" from="contactid" to="primarycontactid" alias="pc">
                   <attribute name="contactid" />
                   <attribute name="gendercode" />
                 </link-entity>
               </entity>"#,
        )
        .unwrap();
        let mut first = row(vec![
            ("accountid", AttributeValue::Guid(id(1))),
            ("statuscode", AttributeValue::OptionSet(1)),
            ("statuscodename", AttributeValue::String("raw".to_string())),
            ("revenue", AttributeValue::Money(10.0)),
            ("pc.contactid", aliased("contactid", AttributeValue::Guid(id(3)))),
            ("pc.gendercode", aliased("gendercode", AttributeValue::OptionSet(2))),
        ]);
        first.formatted_values = [
            ("statuscode", "Active"),
            ("revenue", "$10.00"),
            ("createdon", "1/1/2024"),
            ("pc.gendercode", "Female"),
        ]
        .into_iter()
        .map(|(key, text)| (key.to_string(), text.to_string()))
        .collect();

        let document = flatten(&shape, &RowSet(vec![first]), None, true).unwrap();

        similar_asserts::assert_eq!(
            document.to_json(),
            json!({
                "accountid": "00000000-0000-0000-0000-000000000001",
                "revenue": 10.0,
                "revenueformatted": "$10.00",
                "statuscode": 1,
                "statuscodename": "raw",
                "pc.contactid": "00000000-0000-0000-0000-000000000003",
                "pc.gendercode": 2,
                "pc.gendercodename": "Female"
            })
        );
    }

    #[test]
    fn row_keys_differing_in_case_still_match() {
        let shape = parse_query_shape(
            r#"<entity name="account">
                 <attribute name="accountid" />
                 <attribute name="Name" />
                 <link-entity name="contact" from="contactid" to="primarycontactid" alias="pc">
                   <attribute name="contactid" />
                   <attribute name="FullName" />
                 </link-entity>
               </entity>"#,
        )
        .unwrap();
        let rows = RowSet(vec![row(vec![
            ("accountid", AttributeValue::Guid(id(1))),
            ("name", AttributeValue::String("Acme".to_string())),
            ("NAME", AttributeValue::String("shadowed".to_string())),
            ("pc.contactid", aliased("contactid", AttributeValue::Guid(id(3)))),
            ("pc.fullname", aliased("fullname", AttributeValue::String("Ada".to_string()))),
        ])]);

        let document = flatten(&shape, &rows, None, false).unwrap();

        similar_asserts::assert_eq!(
            document.to_json(),
            json!({
                "accountid": "00000000-0000-0000-0000-000000000001",
                "name": "Acme",
                "pc.contactid": "00000000-0000-0000-0000-000000000003",
                "pc.FullName": "Ada"
            })
        );
    }

    #[test]
    fn many_to_one_links_below_arrays_splice_into_the_array_element() {
        let shape = parse_query_shape(
            r#"<entity name="order">
                 <attribute name="orderid" />
                 <link-entity name="orderline" from="orderid" to="orderid" alias="lines">
                   <attribute name="orderlineid" />
                   <link-entity name="product" from="productid" to="productid" alias="prod">
                     <attribute name="productid" />
                     <attribute name="name" />
                   </link-entity>
                 </link-entity>
               </entity>"#,
        )
        .unwrap();
        let line = |line_id: u128, product_id: u128, name: &str| {
            row(vec![
                ("orderid", AttributeValue::Guid(id(1))),
                ("lines.orderlineid", aliased("orderlineid", AttributeValue::Guid(id(line_id)))),
                ("prod.productid", aliased("productid", AttributeValue::Guid(id(product_id)))),
                ("prod.name", aliased("name", AttributeValue::String(name.to_string()))),
            ])
        };

        let document = flatten(
            &shape,
            &RowSet(vec![line(10, 20, "Bolt"), line(11, 21, "Nut")]),
            None,
            false,
        )
        .unwrap();

        similar_asserts::assert_eq!(
            document.to_json(),
            json!({
                "orderid": "00000000-0000-0000-0000-000000000001",
                "lines": [
                    {
                        "orderlineid": "00000000-0000-0000-0000-00000000000a",
                        "prod.productid": "00000000-0000-0000-0000-000000000014",
                        "prod.name": "Bolt"
                    },
                    {
                        "orderlineid": "00000000-0000-0000-0000-00000000000b",
                        "prod.productid": "00000000-0000-0000-0000-000000000015",
                        "prod.name": "Nut"
                    }
                ]
            })
        );
    }

    #[test]
    fn many_to_one_links_matching_several_records_are_nested() {
        let shape = parse_query_shape(ORDER_QUERY).unwrap();
        let mut second = order_row(None, true);
        second
            .attributes
            .insert("cust.customerid".to_string(), aliased("customerid", AttributeValue::Guid(id(3))));

        let document = flatten(&shape, &RowSet(vec![order_row(None, true), second]), None, false).unwrap();

        similar_asserts::assert_eq!(
            document.get("cust").unwrap().to_json(),
            json!([
                { "cust.customerid": "00000000-0000-0000-0000-000000000002", "cust.name": "Contoso" },
                { "cust.customerid": "00000000-0000-0000-0000-000000000003", "cust.name": "Contoso" }
            ])
        );
        assert!(!document.contains_key("cust.name"));
    }

    #[test]
    fn root_attributes_win_over_linked_keys() {
        let shape = parse_query_shape(
            r#"<entity name="order">
                 <attribute name="orderid" />
                 <attribute name="lines" />
                 <link-entity name="orderline" from="orderid" to="orderid" alias="lines">
                   <attribute name="orderlineid" />
                 </link-entity>
               </entity>"#,
        )
        .unwrap();
        let rows = RowSet(vec![row(vec![
            ("orderid", AttributeValue::Guid(id(1))),
            ("lines", AttributeValue::Integer(3)),
            ("lines.orderlineid", aliased("orderlineid", AttributeValue::Guid(id(10)))),
        ])]);

        let document = flatten(&shape, &rows, None, false).unwrap();

        assert_eq!(document.get("lines").unwrap().to_json(), json!(3));
    }

    #[test]
    fn collections_are_merged_before_splices() {
        let mut document = MessageDocument::new();
        document.insert_if_absent("name", json!("root").into());
        let spliced: MessageDocument = [
            ("name".to_string(), DocumentValue::from(json!("spliced"))),
            ("lines".to_string(), DocumentValue::from(json!("spliced"))),
        ]
        .into_iter()
        .collect();

        merge_linked(
            &mut document,
            vec![
                Linked::Inline(spliced),
                Linked::Collection {
                    key: "lines".to_string(),
                    documents: vec![],
                },
            ],
        );

        similar_asserts::assert_eq!(document.to_json(), json!({ "name": "root", "lines": [] }));
    }
}
