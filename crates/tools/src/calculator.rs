//! Calculator tool — evaluates arithmetic expressions.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, unary negation, and decimal
//! numbers, via a small recursive-descent parser. Malformed input and
//! division by zero come back as failure text so the reasoner can see what
//! went wrong and correct itself.

use async_trait::async_trait;
use pincer_core::error::ToolError;
use pincer_core::tool::{Tool, ToolResponse};

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression. Supports +, -, *, /, parentheses, and decimal numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The expression to evaluate, e.g. '(2 + 3) * 4'"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResponse, ToolError> {
        let expression = arguments["expression"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("missing 'expression' argument".into()))?;

        match evaluate(expression) {
            Ok(value) => Ok(ToolResponse::text(format!(
                "{} = {}",
                expression.trim(),
                format_number(value)
            ))
            .with_metadata("result", serde_json::json!(value))),
            Err(e) => Ok(ToolResponse::failure(e)),
        }
    }
}

/// Render a result without a trailing `.0` when it is a whole number.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Evaluate an arithmetic expression string.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser::new(&tokens);
    let value = parser.parse_expr()?;
    if let Some(extra) = parser.peek() {
        return Err(format!("unexpected trailing input: {extra:?}"));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number: f64 = literal
                    .parse()
                    .map_err(|_| format!("malformed number '{literal}'"))?;
                tokens.push(Token::Number(number));
            }
            c => return Err(format!("unexpected character '{c}'")),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.advance();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.advance();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err("division by zero".into());
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = '-' unary | primary
    fn parse_unary(&mut self) -> Result<f64, String> {
        if let Some(Token::Minus) = self.peek() {
            self.advance();
            let value = self.parse_unary()?;
            return Ok(-value);
        }
        self.parse_primary()
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                let value = self.parse_expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("expected closing parenthesis".into()),
                }
            }
            Some(token) => Err(format!("unexpected token: {token:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_addition() {
        assert_eq!(evaluate("2 + 3").unwrap(), 5.0);
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    }

    #[test]
    fn parentheses() {
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    }

    #[test]
    fn nested_parentheses() {
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn division() {
        assert_eq!(evaluate("10 / 4").unwrap(), 2.5);
    }

    #[test]
    fn division_by_zero() {
        assert!(evaluate("1 / 0").is_err());
    }

    #[test]
    fn unary_negation() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
    }

    #[test]
    fn double_negation() {
        assert_eq!(evaluate("--4").unwrap(), 4.0);
    }

    #[test]
    fn decimals() {
        assert_eq!(evaluate("3.14 * 2").unwrap(), 6.28);
    }

    #[test]
    fn complex_expression() {
        let result = evaluate("(10 + 5) / 3 - 2 * (1 + 1)").unwrap();
        assert!((result - 1.0).abs() < 1e-10);
    }

    #[test]
    fn invalid_expression() {
        assert!(evaluate("2 +").is_err());
    }

    #[test]
    fn trailing_garbage() {
        assert!(evaluate("2 + 3 )").is_err());
    }

    #[test]
    fn empty_expression() {
        assert!(evaluate("").is_err());
    }

    #[tokio::test]
    async fn tool_reports_expression_and_result() {
        let tool = CalculatorTool;
        let response = tool
            .execute(serde_json::json!({"expression": "2 + 3"}))
            .await
            .unwrap();

        assert_eq!(response.text_content().as_deref(), Some("2 + 3 = 5"));
        assert_eq!(response.metadata["result"], serde_json::json!(5.0));
    }

    #[tokio::test]
    async fn tool_formats_integers() {
        let tool = CalculatorTool;
        let response = tool
            .execute(serde_json::json!({"expression": "10 / 2"}))
            .await
            .unwrap();

        assert_eq!(response.text_content().as_deref(), Some("10 / 2 = 5"));
    }

    #[tokio::test]
    async fn tool_formats_decimals() {
        let tool = CalculatorTool;
        let response = tool
            .execute(serde_json::json!({"expression": "10 / 3"}))
            .await
            .unwrap();

        assert!(response.text_content().unwrap().contains("= 3.333"));
    }

    #[tokio::test]
    async fn tool_failure_is_data() {
        let tool = CalculatorTool;
        let response = tool
            .execute(serde_json::json!({"expression": "1 / 0"}))
            .await
            .unwrap();

        let text = response.text_content().unwrap();
        assert!(text.starts_with("Error:"));
        assert!(text.contains("division by zero"));
        assert!(!response.is_interrupted);
    }

    #[tokio::test]
    async fn tool_missing_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let tool = CalculatorTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "calculator");
        assert_eq!(def.parameters["required"], serde_json::json!(["expression"]));
    }
}
