//! Typed view over the generic syntax tree
//!
//! All positional knowledge about the protobuf grammar lives here. The
//! extractor works with [`Statement`], [`ServiceNode`] and [`RpcNode`] and
//! never indexes into raw nodes itself.

use crate::syntax::{child_text, SyntaxTree};

pub const IMPORT_KEYWORD: &str = "import";
pub const PACKAGE_KEYWORD: &str = "package";
pub const OPTION_KEYWORD: &str = "option";
pub const MESSAGE_KEYWORD: &str = "message";
pub const SERVICE_KEYWORD: &str = "service";
pub const RPC_KEYWORD: &str = "rpc";

/// Service children before the first member: `service`, name, `{`
const SERVICE_MEMBERS_OFFSET: usize = 3;

/// One top-level child of a schema file
pub enum Statement<'a> {
    /// `import "path";` with the quotes removed
    Import(String),
    /// `package a.b;`
    Package(String),
    /// `option name = value;` with the raw value text
    Option { name: String, value: String },
    /// Comment leaf, delimiters stripped
    Comment(String),
    Service(ServiceNode<'a>),
    /// `message Name { ... }`, only the name is kept
    Message(String),
    Other,
}

impl<'a> Statement<'a> {
    pub fn classify(node: &'a dyn SyntaxTree) -> Self {
        let count = node.child_count();

        if count == 0 {
            let text = node.text();
            return if is_comment(&text) {
                Statement::Comment(comment_text(&text))
            } else {
                Statement::Other
            };
        }

        let first = child_text(node, 0).unwrap_or_default();

        if first == IMPORT_KEYWORD {
            // `import "x";` or `import public "x";`
            if count == 3 || count == 4 {
                if let Some(path) = child_text(node, count - 2) {
                    return Statement::Import(unquote(&path));
                }
            }
        }

        if count == 3 && first == PACKAGE_KEYWORD {
            if let Some(name) = child_text(node, 1) {
                return Statement::Package(name);
            }
        }

        if count > 3 && first == OPTION_KEYWORD {
            if let (Some(name), Some(value)) = (child_text(node, 1), child_text(node, 3)) {
                return Statement::Option { name, value };
            }
        }

        if let Some(definition) = node.child(0).filter(|c| c.child_count() > 0) {
            match child_text(definition, 0).as_deref() {
                Some(SERVICE_KEYWORD) => return Statement::Service(ServiceNode::new(definition)),
                Some(MESSAGE_KEYWORD) => {
                    if let Some(name) = child_text(definition, 1) {
                        return Statement::Message(name);
                    }
                }
                _ => {}
            }
        }

        Statement::Other
    }
}

/// A `service` definition node
#[derive(Clone, Copy)]
pub struct ServiceNode<'a> {
    node: &'a dyn SyntaxTree,
}

impl<'a> ServiceNode<'a> {
    pub fn new(node: &'a dyn SyntaxTree) -> Self {
        Self { node }
    }

    pub fn name(&self) -> String {
        child_text(self.node, 1).unwrap_or_default()
    }

    /// Body members in declaration order, closing brace excluded
    pub fn members(&self) -> impl Iterator<Item = ServiceMember<'a>> + 'a {
        let node = self.node;
        (SERVICE_MEMBERS_OFFSET..node.child_count())
            .filter_map(move |index| node.child(index))
            .map(ServiceMember::classify)
    }
}

/// One child of a service body
pub enum ServiceMember<'a> {
    Comment(String),
    Rpc(RpcNode<'a>),
    /// Options, empty statements and the closing brace
    Other,
}

impl<'a> ServiceMember<'a> {
    fn classify(node: &'a dyn SyntaxTree) -> Self {
        if node.child_count() == 0 {
            let text = node.text();
            return if is_comment(&text) {
                ServiceMember::Comment(comment_text(&text))
            } else {
                ServiceMember::Other
            };
        }

        if child_text(node, 0).as_deref() == Some(RPC_KEYWORD) {
            ServiceMember::Rpc(RpcNode { node })
        } else {
            ServiceMember::Other
        }
    }
}

/// `rpc Name ( [stream] Request ) returns ( [stream] Response ) ...`
#[derive(Clone, Copy)]
pub struct RpcNode<'a> {
    node: &'a dyn SyntaxTree,
}

struct RpcLayout {
    request: usize,
    response: usize,
    client_streaming: bool,
    server_streaming: bool,
}

impl<'a> RpcNode<'a> {
    pub fn name(&self) -> Option<String> {
        child_text(self.node, 1)
    }

    pub fn request_type(&self) -> Option<String> {
        self.layout().and_then(|l| child_text(self.node, l.request))
    }

    pub fn response_type(&self) -> Option<String> {
        self.layout().and_then(|l| child_text(self.node, l.response))
    }

    pub fn client_streaming(&self) -> bool {
        self.layout().is_some_and(|l| l.client_streaming)
    }

    pub fn server_streaming(&self) -> bool {
        self.layout().is_some_and(|l| l.server_streaming)
    }

    /// Raw text of the whole declaration, for error messages
    pub fn text(&self) -> String {
        self.node.text()
    }

    pub fn line(&self) -> Option<usize> {
        self.node.line()
    }

    /// Locate the request and response type children, skipping `stream`
    fn layout(&self) -> Option<RpcLayout> {
        let mut index = 2;
        let (request, client_streaming) = self.parenthesized_type(&mut index)?;
        if child_text(self.node, index).as_deref() != Some("returns") {
            return None;
        }
        index += 1;
        let (response, server_streaming) = self.parenthesized_type(&mut index)?;
        Some(RpcLayout {
            request,
            response,
            client_streaming,
            server_streaming,
        })
    }

    /// Index of the type child and whether it was marked `stream`
    fn parenthesized_type(&self, index: &mut usize) -> Option<(usize, bool)> {
        if child_text(self.node, *index).as_deref() != Some("(") {
            return None;
        }
        *index += 1;
        let streaming = child_text(self.node, *index).as_deref() == Some("stream");
        if streaming {
            *index += 1;
        }
        let type_index = *index;
        *index += 1;
        if child_text(self.node, *index).as_deref() != Some(")") {
            return None;
        }
        *index += 1;
        Some((type_index, streaming))
    }
}

/// Comment shapes: `/** ... */`, `/* ... */` and `// ...`
pub fn is_comment(text: &str) -> bool {
    let text = text.trim();
    (text.starts_with("/*") && text.ends_with("*/") && text.len() >= 4) || text.starts_with("//")
}

/// Strip comment delimiters and surrounding whitespace
pub fn comment_text(text: &str) -> String {
    let text = text.trim();
    let body = if let Some(line) = text.strip_prefix("//") {
        line
    } else {
        let inner = text.strip_suffix("*/").unwrap_or(text);
        inner
            .strip_prefix("/**")
            .or_else(|| inner.strip_prefix("/*"))
            .unwrap_or(inner)
    };
    body.trim().to_string()
}

/// Remove every single and double quote from a literal
pub fn unquote(text: &str) -> String {
    text.replace(['"', '\''], "")
}
