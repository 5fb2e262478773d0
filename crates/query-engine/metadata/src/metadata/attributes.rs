//! Alias-qualified attribute names.

use std::fmt;

/// One projected column: the alias of the entity it belongs to and its logical name.
///
/// In a row-set, attributes of the root entity are keyed by their bare name while
/// attributes of a link-entity are keyed `alias.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AliasedAttribute {
    pub alias: Option<String>,
    pub name: String,
}

impl AliasedAttribute {
    /// An attribute with an explicit alias. A blank alias means no alias.
    pub fn new(name: impl Into<String>, alias: Option<&str>) -> Self {
        AliasedAttribute {
            alias: alias
                .filter(|alias| !alias.trim().is_empty())
                .map(str::to_string),
            name: name.into(),
        }
    }

    /// Split a qualified name such as `c.fullname` into alias and name.
    ///
    /// With more than two segments, every segment but the last forms the alias:
    /// `a.b.name` has alias `a.b`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((alias, name)) => AliasedAttribute::new(name, Some(alias)),
            None => AliasedAttribute::new(qualified, None),
        }
    }

    /// The key under which this attribute appears in a row.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AliasedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_qualified_names() {
        assert_eq!(
            AliasedAttribute::parse("name"),
            AliasedAttribute {
                alias: None,
                name: "name".to_string()
            }
        );
        assert_eq!(
            AliasedAttribute::parse("c.fullname"),
            AliasedAttribute::new("fullname", Some("c"))
        );
        assert_eq!(
            AliasedAttribute::parse("c.o.fullname"),
            AliasedAttribute::new("fullname", Some("c.o"))
        );
    }

    #[test]
    fn key_reflects_the_alias() {
        assert_eq!(AliasedAttribute::new("name", None).key(), "name");
        assert_eq!(AliasedAttribute::new("name", Some("  ")).key(), "name");
        assert_eq!(AliasedAttribute::new("name", Some("acct")).key(), "acct.name");
        assert_eq!(AliasedAttribute::new("name", Some("acct")).to_string(), "acct.name");
    }
}
