//! Lexicon Markup Model
//!
//! Parses a dictionary volume (TEI-style XML) into an explicit typed tree:
//! text-bearing leaves, collapsed citation blocks and structural containers.
//! Citation extraction works on this tree instead of probing raw elements.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{LexiconError, LexiconResult};

/// Role of a text-bearing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// `<foreign>`: Greek quotation or gloss in Beta Code
    Foreign,
    /// `<tr>`: translation
    Translation,
    /// `<bibl>`: bibliographic reference (author and passage)
    Bibliography,
    /// `<quote>`: quoted form
    Quote,
    /// `<tns>`: tense label
    Tense,
    /// Bare character data between elements
    Plain,
}

impl TextRole {
    fn for_tag(tag: &str) -> Option<Self> {
        match tag {
            "foreign" => Some(Self::Foreign),
            "tr" => Some(Self::Translation),
            "bibl" => Some(Self::Bibliography),
            "quote" => Some(Self::Quote),
            "tns" => Some(Self::Tense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub role: TextRole,
    pub text: String,
}

/// An explicit `<cit>` block collapsed into its three parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationNode {
    pub quote: Option<String>,
    pub translation: Option<String>,
    pub bibliography: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub tag: String,
    /// The `key` attribute (headword of an entry)
    pub key: Option<String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(TextNode),
    Citation(CitationNode),
    Container(ContainerNode),
}

/// One step of a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub enum Visit<'a> {
    Enter(&'a ContainerNode),
    Text(&'a TextNode),
    Citation(&'a CitationNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Node {
    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn has_role(&self, role: TextRole) -> bool {
        matches!(self, Node::Text(t) if t.role == role)
    }

    /// All character data below this node, whitespace-collapsed.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        collapse_whitespace(&parts.join(" "))
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        match self {
            Node::Text(t) => parts.push(&t.text),
            Node::Citation(c) => {
                parts.extend(
                    [&c.quote, &c.translation, &c.bibliography]
                        .into_iter()
                        .flatten()
                        .map(String::as_str),
                );
            }
            Node::Container(c) => {
                for child in &c.children {
                    child.collect_text(parts);
                }
            }
        }
    }
}

impl ContainerNode {
    fn new(tag: impl Into<String>, key: Option<String>) -> Self {
        Self {
            tag: tag.into(),
            key,
            children: Vec::new(),
        }
    }

    /// Pre-order walk of this container's subtree (the container itself first).
    pub fn walk(&self) -> Vec<Visit<'_>> {
        let mut out = Vec::new();
        self.walk_into(&mut out);
        out
    }

    fn walk_into<'a>(&'a self, out: &mut Vec<Visit<'a>>) {
        out.push(Visit::Enter(self));
        for child in &self.children {
            match child {
                Node::Text(t) => out.push(Visit::Text(t)),
                Node::Citation(c) => out.push(Visit::Citation(c)),
                Node::Container(c) => c.walk_into(out),
            }
        }
    }

    /// Descendant containers with the given tag, in document order.
    /// Matching containers are not searched further.
    pub fn find_all(&self, tag: &str) -> Vec<&ContainerNode> {
        let mut out = Vec::new();
        for child in &self.children {
            if let Node::Container(c) = child {
                if c.tag == tag {
                    out.push(c);
                } else {
                    out.extend(c.find_all(tag));
                }
            }
        }
        out
    }

    /// Every citation block anywhere below this container.
    pub fn citations(&self) -> Vec<&CitationNode> {
        self.walk()
            .into_iter()
            .filter_map(|v| match v {
                Visit::Citation(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

impl CitationNode {
    fn from_children(children: &[Node]) -> Self {
        let mut citation = Self::default();
        for child in children {
            citation.absorb(child);
        }
        citation
    }

    fn absorb(&mut self, node: &Node) {
        match node {
            Node::Text(t) => {
                let slot = match t.role {
                    TextRole::Quote => &mut self.quote,
                    TextRole::Translation => &mut self.translation,
                    TextRole::Bibliography => &mut self.bibliography,
                    _ => return,
                };
                if slot.is_none() && !t.text.is_empty() {
                    *slot = Some(t.text.clone());
                }
            }
            Node::Container(c) => {
                for child in &c.children {
                    self.absorb(child);
                }
            }
            Node::Citation(_) => {}
        }
    }
}

/// Search the siblings of `children[from]` for a target node.
///
/// Looks at most `window` element siblings away in the given direction and
/// stops early at a barrier node. Character data between elements does not
/// use up the window. Returns the index of the first target found.
pub fn scan_siblings<T, B>(
    children: &[Node],
    from: usize,
    direction: Direction,
    window: usize,
    is_target: T,
    is_barrier: B,
) -> Option<usize>
where
    T: Fn(&Node) -> bool,
    B: Fn(&Node) -> bool,
{
    let mut counted = 0;
    let mut idx = from;
    while counted < window {
        idx = match direction {
            Direction::Forward => idx.checked_add(1).filter(|i| *i < children.len())?,
            Direction::Backward => idx.checked_sub(1)?,
        };
        let node = &children[idx];
        if node.has_role(TextRole::Plain) {
            continue;
        }
        counted += 1;
        if is_target(node) {
            return Some(idx);
        }
        if is_barrier(node) {
            return None;
        }
    }
    None
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Frame {
    container: ContainerNode,
}

/// Parse one dictionary volume into a document tree.
///
/// The returned root is a synthetic `#document` container. Mismatched or
/// unclosed tags are errors; undecodable character data is kept raw.
pub fn parse_document(xml: &str) -> LexiconResult<ContainerNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Frame {
        container: ContainerNode::new("#document", None),
    }];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (tag, key) = element_header(&e)?;
                stack.push(Frame {
                    container: ContainerNode::new(tag, key),
                });
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(LexiconError::Markup(format!(
                        "unbalanced end tag at byte {}",
                        reader.buffer_position()
                    )));
                }
                let frame = stack.pop().map(|f| f.container);
                if let (Some(done), Some(parent)) = (frame, stack.last_mut()) {
                    parent.container.children.push(finish(done));
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t[..]).into_owned());
                push_text(&mut stack, &text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t[..]).into_owned();
                push_text(&mut stack, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(LexiconError::Markup(format!(
                    "error at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    if stack.len() != 1 {
        let open = stack
            .last()
            .map(|f| f.container.tag.clone())
            .unwrap_or_default();
        return Err(LexiconError::Markup(format!("unclosed element <{open}>")));
    }

    Ok(stack.remove(0).container)
}

fn element_header(e: &BytesStart<'_>) -> LexiconResult<(String, Option<String>)> {
    let tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let key = e
        .try_get_attribute("key")
        .map_err(|err| LexiconError::Markup(format!("bad attribute on <{tag}>: {err}")))?
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        });
    Ok((tag, key))
}

fn push_text(stack: &mut [Frame], text: &str) {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return;
    }
    if let Some(top) = stack.last_mut() {
        top.container.children.push(Node::Text(TextNode {
            role: TextRole::Plain,
            text,
        }));
    }
}

fn finish(container: ContainerNode) -> Node {
    if let Some(role) = TextRole::for_tag(&container.tag) {
        let text = Node::Container(container).text_content();
        return Node::Text(TextNode { role, text });
    }
    if container.tag == "cit" {
        return Node::Citation(CitationNode::from_children(&container.children));
    }
    Node::Container(container)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<TEI.2><text><body><div0>
  <entryFree key="lo/gos1">
    <sense n="A">
      <tr>word</tr>,
      <foreign lang="greek">lo/gos</foreign> hint <bibl><author>Il.</author> 5.3</bibl>
      <cit><quote>lo/gon ei)pei=n</quote> <tr>to speak</tr> <bibl>Pl. R. 332a</bibl></cit>
    </sense>
  </entryFree>
</div0></body></text></TEI.2>"#;

    #[test]
    fn test_parse_typed_tree() {
        let doc = parse_document(ENTRY).unwrap();
        let entries = doc.find_all("entryFree");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key.as_deref(), Some("lo/gos1"));

        let senses = entries[0].find_all("sense");
        assert_eq!(senses.len(), 1);
        let roles: Vec<_> = senses[0]
            .children
            .iter()
            .map(|n| match n {
                Node::Text(t) => format!("{:?}", t.role),
                Node::Citation(_) => "Citation".to_string(),
                Node::Container(c) => c.tag.clone(),
            })
            .collect();
        assert_eq!(
            roles,
            vec!["Translation", "Plain", "Foreign", "Plain", "Bibliography", "Citation"]
        );
    }

    #[test]
    fn test_leaf_text_includes_nested_elements() {
        let doc = parse_document(ENTRY).unwrap();
        let sense = doc.find_all("sense")[0];
        let bibl = sense.children[4].as_text().unwrap();
        assert_eq!(bibl.text, "Il. 5.3");
    }

    #[test]
    fn test_citation_block_collapsed() {
        let doc = parse_document(ENTRY).unwrap();
        let cits = doc.citations();
        assert_eq!(cits.len(), 1);
        assert_eq!(cits[0].quote.as_deref(), Some("lo/gon ei)pei=n"));
        assert_eq!(cits[0].translation.as_deref(), Some("to speak"));
        assert_eq!(cits[0].bibliography.as_deref(), Some("Pl. R. 332a"));
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(parse_document("<entryFree key='a'><sense></entryFree>").is_err());
        assert!(parse_document("<entryFree key='a'><sense>").is_err());
    }

    #[test]
    fn test_scan_siblings_bounded_and_barriers() {
        let doc = parse_document(
            "<s><foreign>a</foreign>x<tr>t</tr>y<bibl>B</bibl><foreign>c</foreign><bibl>D</bibl></s>",
        )
        .unwrap();
        let s = doc.find_all("s")[0];
        let is_bibl = |n: &Node| n.has_role(TextRole::Bibliography);
        let is_foreign = |n: &Node| n.has_role(TextRole::Foreign);

        assert_eq!(scan_siblings(&s.children, 0, Direction::Forward, 5, is_bibl, is_foreign), Some(4));
        // text nodes between elements do not count toward the window
        assert_eq!(scan_siblings(&s.children, 0, Direction::Forward, 2, is_bibl, is_foreign), Some(4));
        assert_eq!(scan_siblings(&s.children, 0, Direction::Forward, 1, is_bibl, is_foreign), None);
        assert_eq!(scan_siblings(&s.children, 4, Direction::Forward, 5, is_bibl, is_foreign), None);
        assert_eq!(
            scan_siblings(&s.children, 4, Direction::Backward, 5, |n: &Node| n.has_role(TextRole::Translation), is_foreign),
            Some(2)
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n b\t c "), "a b c");
    }
}
