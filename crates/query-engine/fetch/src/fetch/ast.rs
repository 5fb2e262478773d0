//! Type definitions of a fetch query document.

/// Name of the optional wrapper element around the root entity.
pub const FETCH: &str = "fetch";
/// Name of the root entity element.
pub const ENTITY: &str = "entity";
/// Name of a joined entity element.
pub const LINK_ENTITY: &str = "link-entity";
/// Name of a projected attribute element.
pub const ATTRIBUTE: &str = "attribute";

/// A parsed fetch query document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchDocument {
    /// The outermost element, usually `<fetch>` but a bare `<entity>` is accepted too.
    pub root: Element,
}

/// A single element and everything nested inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order, values already unescaped.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Non-whitespace character data, unescaped and trimmed.
    Text(String),
}

impl FetchDocument {
    /// The root `<entity>` element.
    pub fn entity(&self) -> Option<&Element> {
        if self.root.name == ENTITY {
            Some(&self.root)
        } else {
            self.root.first_element(ENTITY)
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut Element> {
        if self.root.name == ENTITY {
            Some(&mut self.root)
        } else {
            self.root.elements_mut().find(|element| element.name == ENTITY)
        }
    }

    /// The `<fetch>` wrapper, when the document has one.
    pub fn fetch_mut(&mut self) -> Option<&mut Element> {
        (self.root.name == FETCH).then_some(&mut self.root)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: vec![],
            children: vec![],
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place or appending a new one.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements in document order, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn first_element(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Names of the `<attribute>` elements directly under this element.
    pub fn projected_attributes(&self) -> impl Iterator<Item = &str> {
        self.elements()
            .filter(|element| element.name == ATTRIBUTE)
            .filter_map(|element| element.attribute("name"))
    }

    /// Whether an `<attribute>` element is flagged `required="true"`.
    pub fn is_required(&self) -> bool {
        self.attribute("required")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Append an `<attribute name="..." />` child.
    pub fn push_attribute_element(&mut self, name: &str) {
        self.children.push(Node::Element(
            Element::new(ATTRIBUTE).with_attribute("name", name),
        ));
    }
}
