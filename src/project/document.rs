//! Mutable in-memory XML tree for project files
//!
//! `roxmltree` gives a fast read-only parse; the tree is copied into owned
//! [`Element`] values so it can be edited and written back. Whitespace-only
//! text is dropped on load unless it sits under `xml:space="preserve"`, and
//! the writer re-indents everything else, so the output layout does not
//! depend on the input layout.

use roxmltree::{Document, ParsingOptions};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, value: Option<String> },
}

impl Node {
    fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    prefix: Option<String>,
    local_name: String,
    namespace: Option<String>,
    value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            prefix: None,
            local_name: name.to_string(),
            namespace: None,
            value: value.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// `xmlns` / `xmlns:prefix` declaration carried by an element
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamespaceDecl {
    prefix: Option<String>,
    uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    prefix: Option<String>,
    local_name: String,
    namespace: Option<String>,
    namespace_decls: Vec<NamespaceDecl>,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no namespace
    pub fn new(name: &str) -> Self {
        Self {
            prefix: None,
            local_name: name.to_string(),
            namespace: None,
            namespace_decls: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True for an element called `name` outside of any namespace
    pub fn is(&self, name: &str) -> bool {
        self.namespace.is_none() && self.local_name == name
    }

    /// Value of the un-namespaced attribute `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == name)
            .map(Attribute::value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First direct child element called `name`
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|c| c.is(name))
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// This element and every element below it, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element in document order (self included) accepted by `pred`
    pub fn find_mut<F>(&mut self, pred: F) -> Option<&mut Element>
    where
        F: Fn(&Element) -> bool,
    {
        self.find_mut_by(&pred)
    }

    fn find_mut_by<F>(&mut self, pred: &F) -> Option<&mut Element>
    where
        F: Fn(&Element) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(e) => e.find_mut_by(pred),
            _ => None,
        })
    }

    fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local_name)
    }
}

/// Pre-order walk over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        let children: Vec<&Element> = next.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(next)
    }
}

/// A parsed project file
///
/// Comments and processing instructions around the root element are kept;
/// the XML declaration is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl ProjectDocument {
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut options = ParsingOptions::default();
        options.allow_dtd = true;
        let doc = Document::parse_with_options(text, options)?;

        let root = convert_element(doc.root_element(), false);
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut seen_root = false;

        for node in doc.root().children() {
            if node.is_element() {
                seen_root = true;
            } else if let Some(converted) = convert_leaf(node, false) {
                if seen_root {
                    epilog.push(converted);
                } else {
                    prolog.push(converted);
                }
            }
        }

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Every element in document order, starting with the root
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }

    /// Serializes with two-space indentation and no XML declaration
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();

        for node in &self.prolog {
            write_node(&mut out, node, 0, true, None);
            out.push('\n');
        }
        write_element(&mut out, &self.root, 0, true, None);
        for node in &self.epilog {
            out.push('\n');
            write_node(&mut out, node, 0, true, None);
        }
        out
    }
}

fn convert_element(node: roxmltree::Node, inherited_preserve: bool) -> Element {
    let tag = node.tag_name();
    let namespace = tag.namespace().filter(|ns| !ns.is_empty()).map(str::to_string);
    let prefix = tag.namespace().and_then(|ns| element_prefix(&node, ns));

    let preserve_space = match node.attribute((XML_NAMESPACE, "space")) {
        Some("preserve") => true,
        Some("default") => false,
        _ => inherited_preserve,
    };

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    let namespace_decls = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    let attributes = node
        .attributes()
        .map(|a| Attribute {
            prefix: a.namespace().and_then(|ns| attribute_prefix(&node, ns)),
            local_name: a.name().to_string(),
            namespace: a.namespace().map(str::to_string),
            value: a.value().to_string(),
        })
        .collect();

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(Node::Element(convert_element(child, preserve_space)))
            } else {
                convert_leaf(child, preserve_space)
            }
        })
        .collect();

    Element {
        prefix,
        local_name: tag.name().to_string(),
        namespace,
        namespace_decls,
        attributes,
        children,
    }
}

fn element_prefix(node: &roxmltree::Node, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.lookup_prefix(uri).map(str::to_string)
}

/// Unprefixed attributes are never in a namespace, so only a prefixed
/// binding can carry one, even when the default namespace has the same URI.
fn attribute_prefix(node: &roxmltree::Node, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.namespaces()
        .find(|ns| ns.uri() == uri && ns.name().is_some())
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

fn convert_leaf(node: roxmltree::Node, preserve_space: bool) -> Option<Node> {
    if node.is_text() {
        let text = node.text()?;
        if !preserve_space && text.trim().is_empty() {
            return None;
        }
        Some(Node::Text(text.to_string()))
    } else if node.is_comment() {
        Some(Node::Comment(node.text().unwrap_or_default().to_string()))
    } else if let Some(pi) = node.pi() {
        Some(Node::ProcessingInstruction {
            target: pi.target.to_string(),
            value: pi.value.map(str::to_string),
        })
    } else {
        None
    }
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// `default_ns` is the default namespace in scope where `node` is written.
fn write_node(
    out: &mut String,
    node: &Node,
    depth: usize,
    indent: bool,
    default_ns: Option<&str>,
) {
    match node {
        Node::Element(element) => write_element(out, element, depth, indent, default_ns),
        Node::Text(text) => escape_text(out, text),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::ProcessingInstruction { target, value } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(value) = value {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
    }
}

fn write_element(
    out: &mut String,
    element: &Element,
    depth: usize,
    indent: bool,
    default_ns: Option<&str>,
) {
    let name = element.qualified_name();
    out.push('<');
    out.push_str(&name);

    let mut scope_default = default_ns;
    for decl in &element.namespace_decls {
        match &decl.prefix {
            Some(p) => write_attribute(out, &format!("xmlns:{}", p), &decl.uri),
            None => {
                write_attribute(out, "xmlns", &decl.uri);
                scope_default = Some(decl.uri.as_str()).filter(|u| !u.is_empty());
            }
        }
    }

    // Unprefixed elements whose namespace differs from the inherited default
    // (e.g. elements added to a namespaced document) need their own xmlns.
    if element.prefix.is_none() && element.namespace() != scope_default {
        write_attribute(out, "xmlns", element.namespace().unwrap_or(""));
        scope_default = element.namespace();
    }

    for attr in &element.attributes {
        write_attribute(
            out,
            &qualify(attr.prefix.as_deref(), &attr.local_name),
            &attr.value,
        );
    }

    if element.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');

    let indent_children = indent && !element.children.iter().any(Node::is_text);
    for child in &element.children {
        if indent_children {
            out.push('\n');
            push_indent(out, depth + 1);
        }
        write_node(out, child, depth + 1, indent_children, scope_default);
    }
    if indent_children {
        out.push('\n');
        push_indent(out, depth);
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
