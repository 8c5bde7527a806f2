//! Generic syntax tree consumed by the schema extractor
//!
//! The extractor only relies on the [`SyntaxTree`] trait: nodes expose their
//! concatenated token text and their children by position. Any grammar
//! front-end producing protobuf-3 shaped trees can be plugged in; this
//! module ships a lightweight one ([`parse_schema`]) so the crate works on
//! plain `.proto` text without protoc.

mod builder;
mod tokenizer;

pub use builder::parse_schema;
pub use tokenizer::{tokenize, Token};

/// Positional view of a parse tree node
pub trait SyntaxTree {
    /// Concatenated text of every token below this node, without whitespace
    fn text(&self) -> String;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> Option<&dyn SyntaxTree>;

    /// Source line of the first token below this node, when known
    fn line(&self) -> Option<usize> {
        None
    }
}

/// Iterate the immediate children of `node` in document order
pub fn children<'a>(node: &'a dyn SyntaxTree) -> impl Iterator<Item = &'a dyn SyntaxTree> + 'a {
    (0..node.child_count()).filter_map(move |index| node.child(index))
}

/// Text of the child at `index`, if present
pub fn child_text(node: &dyn SyntaxTree, index: usize) -> Option<String> {
    node.child(index).map(|child| child.text())
}

/// Owned syntax tree produced by [`parse_schema`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// Leaf holding one token (keyword, identifier, literal, symbol or comment)
    Token { text: String, line: usize },
    /// Inner node
    Branch(Vec<SyntaxNode>),
}

impl SyntaxNode {
    pub fn token(text: impl Into<String>) -> Self {
        SyntaxNode::Token {
            text: text.into(),
            line: 0,
        }
    }

    pub fn branch(children: Vec<SyntaxNode>) -> Self {
        SyntaxNode::Branch(children)
    }
}

impl From<Token> for SyntaxNode {
    fn from(token: Token) -> Self {
        SyntaxNode::Token {
            text: token.text,
            line: token.line,
        }
    }
}

impl SyntaxTree for SyntaxNode {
    fn text(&self) -> String {
        match self {
            SyntaxNode::Token { text, .. } => text.clone(),
            SyntaxNode::Branch(children) => children.iter().map(SyntaxTree::text).collect(),
        }
    }

    fn child_count(&self) -> usize {
        match self {
            SyntaxNode::Token { .. } => 0,
            SyntaxNode::Branch(children) => children.len(),
        }
    }

    fn child(&self, index: usize) -> Option<&dyn SyntaxTree> {
        match self {
            SyntaxNode::Token { .. } => None,
            SyntaxNode::Branch(children) => children.get(index).map(|c| c as &dyn SyntaxTree),
        }
    }

    fn line(&self) -> Option<usize> {
        match self {
            SyntaxNode::Token { line, .. } => Some(*line),
            SyntaxNode::Branch(children) => children.iter().find_map(SyntaxTree::line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_text_concatenates_tokens() {
        let node = SyntaxNode::branch(vec![
            SyntaxNode::token("package"),
            SyntaxNode::token("demo.v1"),
            SyntaxNode::token(";"),
        ]);
        assert_eq!(node.text(), "packagedemo.v1;");
        assert_eq!(node.child_count(), 3);
        assert_eq!(child_text(&node, 1).as_deref(), Some("demo.v1"));
        assert!(child_text(&node, 3).is_none());
    }

    #[test]
    fn test_token_has_no_children() {
        let leaf = SyntaxNode::token("// note");
        assert_eq!(leaf.child_count(), 0);
        assert!(leaf.child(0).is_none());
        assert_eq!(children(&leaf).count(), 0);
    }
}
