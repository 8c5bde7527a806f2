//! Regex tokenizer for `.proto` source text

use proto_service_generator_common::{GeneratorError, Result};
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s:/\*.*?\*/)",
        r"|//[^\n]*",
        r#"|"(?:[^"\\\n]|\\.)*""#,
        r"|'(?:[^'\\\n]|\\.)*'",
        r"|[-+]?0[xX][0-9A-Fa-f]+",
        r"|[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?",
        r"|\.?[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*",
        r"|[{}()\[\]<>;=,:\-+.]",
        r"|\s+",
    ))
    .expect("token pattern is a valid regex")
});

/// One lexical token with the line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        self.text.starts_with("//") || self.text.starts_with("/*")
    }
}

/// Split schema text into tokens, keeping comments and dropping whitespace
///
/// Fails on characters no token can start with, which also covers
/// unterminated strings and block comments.
pub fn tokenize(source: &str, file_name: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut last_end = 0;

    for mat in TOKEN_REGEX.find_iter(source) {
        if mat.start() > last_end {
            return Err(unexpected(&source[last_end..mat.start()], line, file_name));
        }

        let part = mat.as_str();
        if !part.trim().is_empty() {
            tokens.push(Token {
                text: part.to_string(),
                line,
            });
        }

        line += part.matches('\n').count();
        last_end = mat.end();
    }

    if last_end != source.len() {
        return Err(unexpected(&source[last_end..], line, file_name));
    }

    Ok(tokens)
}

fn unexpected(fragment: &str, line: usize, file_name: &str) -> GeneratorError {
    let snippet: String = fragment.chars().take(20).collect();
    GeneratorError::Syntax {
        file: file_name.to_string(),
        message: format!("line {}: unexpected input {:?}", line, snippet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source, "test.proto")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_tokenize_package() {
        assert_eq!(texts("package th2.common;"), vec!["package", "th2.common", ";"]);
    }

    #[test]
    fn test_tokenize_rpc() {
        assert_eq!(
            texts("rpc Do(.demo.Ping) returns (stream Pong);"),
            vec!["rpc", "Do", "(", ".demo.Ping", ")", "returns", "(", "stream", "Pong", ")", ";"]
        );
    }

    #[test]
    fn test_tokenize_keeps_comments() {
        let tokens = tokenize("// first\n/* second\n line */ message A {}", "test.proto").unwrap();
        assert_eq!(tokens[0].text, "// first");
        assert!(tokens[0].is_comment());
        assert_eq!(tokens[1].text, "/* second\n line */");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].text, "message");
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn test_tokenize_option_values() {
        assert_eq!(
            texts(r#"option java_package = "com.demo"; option (my.opt).x = -1.5e3;"#),
            vec![
                "option", "java_package", "=", "\"com.demo\"", ";", "option", "(", "my.opt", ")",
                ".x", "=", "-1.5e3", ";"
            ]
        );
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let result = tokenize("import \"demo.proto;\n", "broken.proto");
        match result {
            Err(GeneratorError::Syntax { file, message }) => {
                assert_eq!(file, "broken.proto");
                assert!(message.contains("line 1"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_unterminated_block_comment() {
        assert!(tokenize("/* never closed\nmessage A {}", "broken.proto").is_err());
    }
}
