//! XML form of a [`Border`].
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <osm>
//!   <way id="101">
//!     <node id="1" lat="55.0" lon="37.0" />
//!   </way>
//! </osm>
//! ```

use crate::{Border, BorderNode, BorderWay};
use std::io::{Read, Write};
use thiserror::Error;
use xmltree::{Element, EmitterConfig, XMLNode};

pub const ROOT: &str = "osm";
pub const WAY: &str = "way";
pub const NODE: &str = "node";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Failed to parse xml document")]
    Parse(#[from] xmltree::ParseError),
    #[error("Failed to write xml document")]
    Emit(#[from] xmltree::Error),
    #[error("Unexpected root element <{0}>, expected <osm>")]
    UnexpectedRoot(String),
    #[error("<{element}> is missing attribute {attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("<{element}> has invalid {attribute}: {value}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

/// Formats a coordinate without losing precision. Integral values keep a trailing `.0`
/// so that `55.0` does not come out as `55`.
pub fn format_coord(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

pub fn to_document(border: &Border) -> Element {
    let mut root = Element::new(ROOT);

    for way in &border.ways {
        let mut way_elem = Element::new(WAY);
        way_elem
            .attributes
            .insert("id".to_string(), way.id.to_string());

        for node in &way.nodes {
            let mut node_elem = Element::new(NODE);
            node_elem
                .attributes
                .insert("id".to_string(), node.id.to_string());
            node_elem
                .attributes
                .insert("lat".to_string(), format_coord(node.lat));
            node_elem
                .attributes
                .insert("lon".to_string(), format_coord(node.lon));
            way_elem.children.push(XMLNode::Element(node_elem));
        }

        root.children.push(XMLNode::Element(way_elem));
    }

    root
}

/// Writes the document with an xml declaration and two space indentation.
pub fn write_document<W: Write>(border: &Border, w: W) -> Result<(), XmlError> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    to_document(border).write_with_config(w, config)?;
    Ok(())
}

pub fn parse_document<R: Read>(r: R) -> Result<Border, XmlError> {
    let root = Element::parse(r)?;
    if root.name != ROOT {
        return Err(XmlError::UnexpectedRoot(root.name));
    }

    let mut ways = Vec::new();
    for way_elem in child_elements(&root, WAY) {
        let id = parse_attr(way_elem, WAY, "id")?;

        let nodes = child_elements(way_elem, NODE)
            .map(|node_elem| {
                Ok(BorderNode {
                    id: parse_attr(node_elem, NODE, "id")?,
                    lat: parse_attr(node_elem, NODE, "lat")?,
                    lon: parse_attr(node_elem, NODE, "lon")?,
                })
            })
            .collect::<Result<Vec<_>, XmlError>>()?;

        ways.push(BorderWay { id, nodes });
    }

    Ok(Border { ways })
}

fn child_elements<'a>(
    parent: &'a Element,
    name: &'a str,
) -> impl Iterator<Item = &'a Element> + 'a {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(move |e| e.name == name)
}

fn parse_attr<T: std::str::FromStr>(
    elem: &Element,
    element: &'static str,
    attribute: &'static str,
) -> Result<T, XmlError> {
    let value = elem
        .attributes
        .get(attribute)
        .ok_or(XmlError::MissingAttribute { element, attribute })?;

    value.parse().map_err(|_| XmlError::InvalidAttribute {
        element,
        attribute,
        value: value.clone(),
    })
}
