use std::io;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Parses raw page bytes into a document tree. Invalid UTF-8 is replaced lossily;
/// only a failing reader makes parsing fail.
pub fn parse_html(mut content: &[u8]) -> io::Result<RcDom> {
    parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut content)
}

pub fn serialize_document(dom: &RcDom) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &document, SerializeOpts::default())?;
    Ok(buf)
}

/// Lower-case local name of an element node.
pub fn element_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_ascii_lowercase().to_string()),
        _ => None,
    }
}

/// Values of every attribute named `attr_name` on `node`, in attribute order.
pub fn get_node_attrs(node: &Handle, attr_name: &str) -> Vec<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .filter(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Replaces the value of the `index`-th attribute named `attr_name`.
/// Returns false when there is no such attribute.
pub fn set_nth_node_attr(node: &Handle, attr_name: &str, index: usize, value: &str) -> bool {
    match node.data {
        NodeData::Element { ref attrs, .. } => {
            let mut attrs = attrs.borrow_mut();
            match attrs
                .iter_mut()
                .filter(|attr| &*attr.name.local == attr_name)
                .nth(index)
            {
                Some(attr) => {
                    attr.value = StrTendril::from_slice(value);
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Pre-order list of every node under (and including) `root`.
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut nodes = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        let children: Vec<Handle> = node.children.borrow().clone();
        stack.extend(children.into_iter().rev());
        nodes.push(node);
    }
    nodes
}

pub fn count_nodes(root: &Handle) -> usize {
    descendants(root).len()
}

/// Pre-order `(depth, label)` pairs for every node under `root`. Labels name the
/// node kind and its identifying content, but not element attributes, so two trees
/// compare equal when only attribute values differ.
pub fn node_outline(root: &Handle) -> Vec<(usize, String)> {
    let mut outline = Vec::new();
    let mut stack = vec![(0usize, root.clone())];
    while let Some((depth, node)) = stack.pop() {
        let label = match node.data {
            NodeData::Document => "#document".to_string(),
            NodeData::Doctype { ref name, .. } => format!("#doctype {}", name),
            NodeData::Text { ref contents } => format!("#text {:?}", contents.borrow().to_string()),
            NodeData::Comment { ref contents } => format!("#comment {:?}", contents.to_string()),
            NodeData::Element { ref name, .. } => format!("<{}>", name.local),
            NodeData::ProcessingInstruction {
                ref target,
                ref contents,
            } => format!("#pi {} {:?}", target, contents.to_string()),
        };
        outline.push((depth, label));

        let children: Vec<Handle> = node.children.borrow().clone();
        stack.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
    }
    outline
}

/// `(tag, attribute values)` of every element carrying `attr_name`, in document order.
pub fn find_attribute_values(dom: &RcDom, attr_name: &str) -> Vec<(String, Vec<String>)> {
    descendants(&dom.document)
        .iter()
        .filter_map(|node| {
            let values = get_node_attrs(node, attr_name);
            if values.is_empty() {
                None
            } else {
                element_name(node).map(|name| (name, values))
            }
        })
        .collect()
}
