//! Token stream to generic syntax tree
//!
//! Node shapes follow the protobuf-3 grammar closely enough for the
//! extractor's positional reading:
//! - `import "a/b.proto";` -> 3 children (4 with `public`/`weak`)
//! - `package a.b;` -> 3 children
//! - `option name = value;` -> 5 children, name and value grouped
//! - `message`/`enum`/`service`/`extend` -> a top-level node wrapping the
//!   definition node
//! - `rpc Name (Req) returns (Resp);` -> one node per declaration inside a
//!   service body
//! - comments -> childless leaves, kept in document order at top level and
//!   inside service bodies

use super::tokenizer::{tokenize, Token};
use super::SyntaxNode;
use proto_service_generator_common::{GeneratorError, Result};

/// Parse schema text into a generic syntax tree
pub fn parse_schema(source: &str, file_name: &str) -> Result<SyntaxNode> {
    let tokens = tokenize(source, file_name)?;
    TreeBuilder::new(tokens, file_name).build()
}

struct TreeBuilder<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file_name: &'a str,
}

impl<'a> TreeBuilder<'a> {
    fn new(tokens: Vec<Token>, file_name: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            file_name,
        }
    }

    fn build(mut self) -> Result<SyntaxNode> {
        let mut children = Vec::new();

        while let Some(token) = self.peek() {
            let (text, line, is_comment) = (token.text.clone(), token.line, token.is_comment());

            let node = if is_comment {
                self.leaf()?
            } else {
                match text.as_str() {
                    "option" => self.option_statement()?,
                    "syntax" | "edition" | "import" | "package" => self.statement()?,
                    "message" | "enum" | "extend" => SyntaxNode::branch(vec![self.definition()?]),
                    "service" => SyntaxNode::branch(vec![self.service()?]),
                    ";" => self.leaf()?,
                    other => return Err(self.error(line, format!("unexpected token '{}'", other))),
                }
            };
            children.push(node);
        }

        Ok(SyntaxNode::branch(children))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> Option<&str> {
        self.peek().map(|t| t.text.as_str())
    }

    fn next(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => Err(self.error(self.last_line(), "unexpected end of file".to_string())),
        }
    }

    fn leaf(&mut self) -> Result<SyntaxNode> {
        Ok(self.next()?.into())
    }

    fn expect(&mut self, text: &str) -> Result<SyntaxNode> {
        let token = self.next()?;
        if token.text != text {
            return Err(self.error(
                token.line,
                format!("expected '{}' but found '{}'", text, token.text),
            ));
        }
        Ok(token.into())
    }

    /// Tokens up to and including the terminating `;`, one leaf each
    fn statement(&mut self) -> Result<SyntaxNode> {
        let mut children = Vec::new();
        loop {
            let token = self.next()?;
            let done = token.text == ";";
            children.push(token.into());
            if done {
                return Ok(SyntaxNode::branch(children));
            }
        }
    }

    /// `option` name `=` value `;`
    fn option_statement(&mut self) -> Result<SyntaxNode> {
        let keyword = self.expect("option")?;

        let mut name = Vec::new();
        while !matches!(self.peek_text(), Some("=") | None) {
            name.push(self.leaf()?);
        }
        let equals = self.expect("=")?;

        let mut value = Vec::new();
        while !matches!(self.peek_text(), Some(";") | None) {
            if self.peek_text() == Some("{") {
                value.push(self.block()?);
            } else {
                value.push(self.leaf()?);
            }
        }
        let semicolon = self.expect(";")?;

        Ok(SyntaxNode::branch(vec![
            keyword,
            group(name),
            equals,
            group(value),
            semicolon,
        ]))
    }

    /// `message`/`enum`/`extend` keyword, name and body block
    fn definition(&mut self) -> Result<SyntaxNode> {
        let keyword = self.leaf()?;
        let name = self.leaf()?;
        let body = self.block()?;
        Ok(SyntaxNode::branch(vec![keyword, name, body]))
    }

    /// Balanced `{ ... }` with nested blocks as sub-nodes
    fn block(&mut self) -> Result<SyntaxNode> {
        let mut children = vec![self.expect("{")?];
        loop {
            match self.peek_text() {
                Some("}") => {
                    children.push(self.leaf()?);
                    return Ok(SyntaxNode::branch(children));
                }
                Some("{") => children.push(self.block()?),
                Some(_) => children.push(self.leaf()?),
                None => {
                    return Err(self.error(self.last_line(), "unterminated block".to_string()))
                }
            }
        }
    }

    /// `service` name `{` members `}`
    fn service(&mut self) -> Result<SyntaxNode> {
        let mut children = vec![self.expect("service")?, self.leaf()?, self.expect("{")?];

        loop {
            let Some(token) = self.peek() else {
                return Err(self.error(self.last_line(), "unterminated service".to_string()));
            };
            let (text, line, is_comment) = (token.text.clone(), token.line, token.is_comment());

            if is_comment {
                children.push(self.leaf()?);
                continue;
            }

            match text.as_str() {
                "}" => {
                    children.push(self.leaf()?);
                    return Ok(SyntaxNode::branch(children));
                }
                "rpc" => children.push(self.rpc()?),
                "option" => children.push(self.option_statement()?),
                ";" => children.push(self.leaf()?),
                other => {
                    let message = format!("unexpected token '{}' in service body", other);
                    return Err(self.error(line, message));
                }
            }
        }
    }

    /// `rpc` declaration ending in `;` or an options block
    fn rpc(&mut self) -> Result<SyntaxNode> {
        let mut children = Vec::new();
        loop {
            match self.peek_text() {
                Some(";") => {
                    children.push(self.leaf()?);
                    return Ok(SyntaxNode::branch(children));
                }
                Some("{") => {
                    children.push(self.block()?);
                    return Ok(SyntaxNode::branch(children));
                }
                Some("}") | None => {
                    return Err(self.error(
                        self.current_line(),
                        "unterminated rpc declaration".to_string(),
                    ))
                }
                Some(_) => children.push(self.leaf()?),
            }
        }
    }

    fn current_line(&self) -> usize {
        self.peek().map(|t| t.line).unwrap_or_else(|| self.last_line())
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    fn error(&self, line: usize, message: String) -> GeneratorError {
        GeneratorError::Syntax {
            file: self.file_name.to_string(),
            message: format!("line {}: {}", line, message),
        }
    }
}

/// Single tokens stay leaves, anything longer becomes a node
fn group(mut nodes: Vec<SyntaxNode>) -> SyntaxNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        SyntaxNode::branch(nodes)
    }
}
