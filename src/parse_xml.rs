use std::fs::File;
use std::io::{BufRead, BufReader};

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A parsed XML element with its attributes, text and children
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    /// Tag name as written, namespace prefix included
    pub name: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Text directly inside this element (not its children)
    pub text_content: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Tag name without a namespace prefix (`svg:text` -> `text`)
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Visit this node and every descendant in document order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a XmlNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Parses an XML file and returns the root node
///
/// # Example
/// ```ignore
/// let root = parse_xml_file("diagram.svg")?;
/// println!("Root element: {}", root.name);
/// ```
pub fn parse_xml_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<XmlNode> {
    let file = File::open(&path).map_err(|e| {
        anyhow::anyhow!("Failed to open file '{}': {}", path.as_ref().display(), e)
    })?;
    parse_document(Reader::from_reader(BufReader::new(file)))
}

/// Parses an in-memory XML document
pub fn parse_xml_str(xml: &str) -> anyhow::Result<XmlNode> {
    parse_document(Reader::from_reader(xml.as_bytes()))
}

fn parse_document<R: BufRead>(mut reader: Reader<R>) -> anyhow::Result<XmlNode> {
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf)?;
        let maybe_root = match event {
            Event::Start(start) => Some((start.into_owned(), false)),
            Event::Empty(start) => Some((start.into_owned(), true)),
            Event::Eof => {
                anyhow::bail!("XML document is empty");
            }
            _ => None,
        };

        if let Some((start, self_closing)) = maybe_root {
            let mut node_buf = Vec::new();
            return parse_node(&mut reader, &mut node_buf, start, self_closing);
        }
    }
}

fn parse_node<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    start: BytesStart<'static>,
    self_closing: bool,
) -> anyhow::Result<XmlNode> {
    let element_name_bytes = start.name().as_ref().to_vec();
    let mut node = XmlNode {
        name: String::from_utf8_lossy(&element_name_bytes).to_string(),
        attributes: collect_attributes(&start)?,
        ..Default::default()
    };

    if self_closing {
        return Ok(node);
    }

    loop {
        buf.clear();
        let event = reader.read_event_into(buf)?;
        match event {
            Event::Start(child_start) => {
                let mut child_buf = Vec::new();
                let child = parse_node(reader, &mut child_buf, child_start.into_owned(), false)?;
                node.children.push(child);
            }
            Event::Empty(child_start) => {
                let mut child_buf = Vec::new();
                let child = parse_node(reader, &mut child_buf, child_start.into_owned(), true)?;
                node.children.push(child);
            }
            Event::Text(text) => {
                let value = match text.unescape() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(text.as_ref()).to_string(),
                };
                if !value.trim().is_empty() {
                    node.text_content.push_str(&value);
                }
            }
            Event::CData(text) => {
                let value = String::from_utf8_lossy(text.as_ref()).to_string();
                if !value.trim().is_empty() {
                    node.text_content.push_str(&value);
                }
            }
            Event::End(end) => {
                anyhow::ensure!(
                    end.name().as_ref() == element_name_bytes.as_slice(),
                    "unexpected closing tag '</{}>' while parsing '<{}>'",
                    String::from_utf8_lossy(end.name().as_ref()),
                    node.name
                );
                return Ok(node);
            }
            Event::Eof => {
                anyhow::bail!("unexpected end of file while parsing element '{}'", node.name);
            }
            _ => {}
        }
    }
}

fn collect_attributes(start: &BytesStart<'_>) -> anyhow::Result<IndexMap<String, String>> {
    let mut map = IndexMap::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(attr.value.as_ref()).to_string(),
        };
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements_and_text() {
        let root = parse_xml_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><text transform="matrix(1 0 0 1 10 20)">MH097</text><line x1="0" y1="0" x2="5" y2="0"/></g></svg>"#,
        )
        .unwrap();
        assert_eq!(root.name, "svg");
        let group = &root.children[0];
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[0].text_content, "MH097");
        assert_eq!(group.children[0].attr("transform"), Some("matrix(1 0 0 1 10 20)"));
        assert_eq!(group.children[1].local_name(), "line");
    }

    #[test]
    fn test_attribute_order_and_entities() {
        let root = parse_xml_str(r#"<a z="1" b="x &amp; y">A &lt; B</a>"#).unwrap();
        let keys: Vec<&str> = root.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "b"]);
        assert_eq!(root.attr("b"), Some("x & y"));
        assert_eq!(root.text_content, "A < B");
    }

    #[test]
    fn test_mismatched_tag_is_an_error() {
        assert!(parse_xml_str("<a><b></a>").is_err());
        assert!(parse_xml_str("").is_err());
    }

    #[test]
    fn test_walk_visits_in_document_order() {
        let root = parse_xml_str("<a><b><c/></b><svg:d/></a>").unwrap();
        let mut names = Vec::new();
        root.walk(&mut |n| names.push(n.local_name().to_string()));
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
