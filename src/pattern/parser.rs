use regex::Regex;

use crate::pattern::ast::{
    ParamKind, ParameterConstraint, ParameterNode, PatternAst, PatternNode, Quantifier,
};
use crate::pattern::{PatternError, PatternResult};

#[tracing::instrument(level = "trace", skip(pattern), fields(pattern = %pattern))]
pub fn parse_pattern(pattern: &str) -> PatternResult<PatternAst> {
    let mut parser = PatternParser::new(pattern);
    let nodes = parser.parse_sequence()?;

    let ast = PatternAst::new(nodes);
    validate_constraints(&ast, pattern)?;
    Ok(ast)
}

struct PatternParser<'a> {
    pattern: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    unnamed: usize,
}

impl<'a> PatternParser<'a> {
    fn new(pattern: &'a str) -> Self {
        let chars: Vec<(usize, char)> = pattern.char_indices().collect();
        Self {
            pattern,
            chars,
            index: 0,
            unnamed: 0,
        }
    }

    fn parse_sequence(&mut self) -> PatternResult<Vec<PatternNode>> {
        let mut nodes = Vec::new();
        let mut literal = String::new();
        // an escaped '/' or '.' never acts as a prefix
        let mut tail_escaped = false;

        while let Some(ch) = self.peek() {
            match ch {
                ')' => {
                    return Err(PatternError::UnexpectedClosingParenthesis {
                        pattern: self.pattern.to_string(),
                        index: self.current_byte_index(),
                    });
                }
                ':' | '(' | '*' => {
                    let prefix = if tail_escaped {
                        None
                    } else {
                        take_prefix(&mut literal)
                    };
                    if !literal.is_empty() {
                        nodes.push(PatternNode::Literal(std::mem::take(&mut literal)));
                    }

                    let mut param = match ch {
                        ':' => self.parse_colon_parameter(prefix)?,
                        '(' => self.parse_unnamed_group(prefix)?,
                        _ => self.parse_wildcard(prefix)?,
                    };
                    param.partial =
                        prefix.is_some_and(|p| self.peek().is_some_and(|next| next != p));
                    nodes.push(PatternNode::Parameter(param));
                    tail_escaped = false;
                }
                _ if self.is_escape_char(ch) => {
                    literal.push(self.consume_escape_char()?);
                    tail_escaped = true;
                }
                _ => {
                    literal.push(ch);
                    self.next();
                    tail_escaped = false;
                }
            }
        }

        if !literal.is_empty() {
            nodes.push(PatternNode::Literal(literal));
        }

        Ok(nodes)
    }

    fn parse_colon_parameter(&mut self, prefix: Option<char>) -> PatternResult<ParameterNode> {
        let start = self.current_byte_index();
        self.expect(':');
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }

        if name.is_empty() {
            return Err(PatternError::ParameterMissingName {
                pattern: self.pattern.to_string(),
                index: start,
            });
        }

        let first = name.as_bytes()[0];
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return Err(PatternError::ParameterInvalidStart {
                pattern: self.pattern.to_string(),
                name: name.clone(),
                found: first as char,
            });
        }

        let constraint = if self.peek() == Some('(') {
            let raw = self.parse_inline_constraint(&name)?;
            Some(ParameterConstraint::new(raw))
        } else {
            None
        };

        let quantifier = self.parse_quantifier();

        Ok(ParameterNode::new(
            name,
            ParamKind::Named,
            prefix,
            constraint,
            quantifier,
        ))
    }

    fn parse_unnamed_group(&mut self, prefix: Option<char>) -> PatternResult<ParameterNode> {
        let name = self.next_unnamed();
        let raw = self.parse_inline_constraint(&name)?;
        let quantifier = self.parse_quantifier();

        Ok(ParameterNode::new(
            name,
            ParamKind::Unnamed,
            prefix,
            Some(ParameterConstraint::new(raw)),
            quantifier,
        ))
    }

    fn parse_wildcard(&mut self, prefix: Option<char>) -> PatternResult<ParameterNode> {
        let index = self.current_byte_index();
        self.expect('*');
        if let Some(modifier @ ('?' | '*' | '+')) = self.peek() {
            return Err(PatternError::WildcardQuantifierUnsupported {
                pattern: self.pattern.to_string(),
                index,
                modifier,
            });
        }

        let name = self.next_unnamed();
        Ok(ParameterNode::new(
            name,
            ParamKind::Wildcard,
            prefix,
            None,
            Quantifier::One,
        ))
    }

    /// Reads a parenthesised expression. Nested capturing groups are rewritten
    /// as non-capturing so parameter groups stay positional.
    fn parse_inline_constraint(&mut self, name: &str) -> PatternResult<String> {
        let start = self.current_byte_index();
        self.expect('(');
        let mut depth = 1usize;
        let mut constraint = String::new();

        while let Some(ch) = self.peek() {
            if self.is_escape_char(ch) {
                let escaped = self.consume_escape_char()?;
                constraint.push('\\');
                constraint.push(escaped);
                continue;
            }
            match ch {
                '(' => {
                    self.next();
                    depth += 1;
                    constraint.push('(');
                    match (self.peek(), self.peek_at(1)) {
                        (Some('?'), Some('P' | '<')) => {
                            return Err(PatternError::NamedGroupInConstraint {
                                pattern: self.pattern.to_string(),
                                name: name.to_string(),
                            });
                        }
                        (Some('?'), _) => {}
                        _ => constraint.push_str("?:"),
                    }
                }
                ')' => {
                    depth -= 1;
                    self.next();
                    if depth == 0 {
                        if constraint.is_empty() {
                            return Err(PatternError::EmptyGroup {
                                pattern: self.pattern.to_string(),
                                start,
                            });
                        }
                        return Ok(constraint);
                    }
                    constraint.push(')');
                }
                _ => {
                    constraint.push(ch);
                    self.next();
                }
            }
        }

        Err(PatternError::UnterminatedGroup {
            pattern: self.pattern.to_string(),
            start,
        })
    }

    fn parse_quantifier(&mut self) -> Quantifier {
        match Quantifier::from_modifier(self.peek()) {
            Some(quantifier) => {
                self.next();
                quantifier
            }
            None => Quantifier::One,
        }
    }

    fn next_unnamed(&mut self) -> String {
        let name = self.unnamed.to_string();
        self.unnamed += 1;
        name
    }

    fn expect(&mut self, expected: char) {
        let actual = self.next();
        debug_assert_eq!(Some(expected), actual);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).map(|(_, ch)| *ch)
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn current_byte_index(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(idx, _)| *idx)
            .unwrap_or_else(|| self.pattern.len())
    }

    fn is_escape_char(&self, ch: char) -> bool {
        ch == '\\'
    }

    fn consume_escape_char(&mut self) -> PatternResult<char> {
        let escape_index = self.current_byte_index();
        self.next();
        match self.next() {
            Some(ch) => Ok(ch),
            None => Err(PatternError::LoneEscapeCharacter {
                pattern: self.pattern.to_string(),
                index: escape_index,
            }),
        }
    }
}

fn take_prefix(literal: &mut String) -> Option<char> {
    match literal.chars().last() {
        Some(ch @ ('/' | '.')) => {
            literal.pop();
            Some(ch)
        }
        _ => None,
    }
}

fn validate_constraints(ast: &PatternAst, pattern: &str) -> PatternResult<()> {
    for node in &ast.nodes {
        if let PatternNode::Parameter(param) = node
            && let Some(constraint) = &param.constraint
        {
            let source = format!("^(?:{})$", constraint.raw);
            if let Err(err) = Regex::new(&source) {
                return Err(PatternError::RegexConstraintInvalid {
                    pattern: pattern.to_string(),
                    name: param.name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(())
}
