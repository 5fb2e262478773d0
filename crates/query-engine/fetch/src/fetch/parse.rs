//! Parse fetch query text into an element tree.
//!
//! Fetch queries are a small, well-behaved subset of XML: elements, quoted attributes,
//! comments, an optional declaration, and the odd text node inside condition values.
//! Anything beyond that (CDATA, DTDs, namespaces) is not supported.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, value},
    error::ParseError,
    multi::many0,
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};
use thiserror::Error;

use super::ast::{Element, FetchDocument, Node};

/// Errors raised while reading fetch query text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("malformed fetch query at offset {offset}, near '{near}'")]
    Malformed { offset: usize, near: String },
    #[error("unexpected content after the root element at offset {offset}")]
    TrailingContent { offset: usize },
}

/// Parse a complete fetch query document.
pub fn parse_document(text: &str) -> Result<FetchDocument, Error> {
    let (rest, root) = delimited(misc, element, misc)
        .parse(text)
        .map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => malformed(text, e.input),
            nom::Err::Incomplete(_) => malformed(text, ""),
        })?;

    if !rest.is_empty() {
        return Err(Error::TrailingContent {
            offset: text.len() - rest.len(),
        });
    }

    tracing::trace!(root = %root.name, "parsed fetch document");
    Ok(FetchDocument { root })
}

fn malformed(text: &str, remaining: &str) -> Error {
    Error::Malformed {
        offset: text.len() - remaining.len(),
        near: remaining.chars().take(24).collect(),
    }
}

fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

// element and attribute names, e.g. "link-entity" or "paging-cookie".
fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')).parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
    ))
    .parse(input)
}

fn attribute(input: &str) -> IResult<&str, (String, String)> {
    map(
        preceded(multispace1, separated_pair(name, ws(char('=')), quoted)),
        |(key, raw): (&str, &str)| (key.to_string(), unescape(raw)),
    )
    .parse(input)
}

fn comment(input: &str) -> IResult<&str, ()> {
    value((), (tag("<!--"), take_until("-->"), tag("-->"))).parse(input)
}

fn declaration(input: &str) -> IResult<&str, ()> {
    value((), (tag("<?"), take_until("?>"), tag("?>"))).parse(input)
}

// whitespace, comments and declarations around the root element.
fn misc(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((value((), multispace1), comment, declaration)))).parse(input)
}

fn content(input: &str) -> IResult<&str, Option<Node>> {
    alt((
        value(None, comment),
        map(element, |element| Some(Node::Element(element))),
        map(take_till1(|c: char| c == '<'), |text: &str| {
            let text = text.trim();
            (!text.is_empty()).then(|| Node::Text(unescape(text)))
        }),
    ))
    .parse(input)
}

fn element(input: &str) -> IResult<&str, Element> {
    let (input, name) = preceded(char('<'), name).parse(input)?;
    let (input, attributes) = many0(attribute).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, self_closing) = alt((value(true, tag("/>")), value(false, char('>')))).parse(input)?;

    if self_closing {
        return Ok((
            input,
            Element {
                name: name.to_string(),
                attributes,
                children: vec![],
            },
        ));
    }

    let (input, children) = many0(content).parse(input)?;
    let (input, _) = tag("</").parse(input)?;
    let (input, _) = tag(name).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('>')(input)?;

    Ok((
        input,
        Element {
            name: name.to_string(),
            attributes,
            children: children.into_iter().flatten().collect(),
        },
    ))
}

/// Replace the predefined entities. `&amp;` goes last so it cannot create new entities.
pub(crate) fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
