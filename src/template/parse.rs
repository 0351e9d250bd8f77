// ABOUTME: Recursive-descent parser turning template text into a node tree.
// ABOUTME: Validates function names up front so unknown functions fail before rendering.

use super::error::TemplateError;
use super::funcs::FuncMap;
use std::fmt;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";
const RIGHT_TRIM_DELIM: &str = "-}}";

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
    If {
        pipe: Pipeline,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Range {
        pipe: Pipeline,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Pipeline {
    pub pos: usize,
    pub cmds: Vec<Command>,
}

#[derive(Debug, Clone)]
pub(crate) struct Command {
    pub pos: usize,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone)]
pub(crate) struct Operand {
    pub pos: usize,
    pub kind: OperandKind,
}

#[derive(Debug, Clone)]
pub(crate) enum OperandKind {
    Dot,
    /// `.A.B` chain.
    Field(Vec<String>),
    Func(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
    Pipe(Box<Pipeline>),
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperandKind::Dot => write!(f, "."),
            OperandKind::Field(names) => {
                for name in names {
                    write!(f, ".{name}")?;
                }
                Ok(())
            }
            OperandKind::Func(name) => write!(f, "{name}"),
            OperandKind::Str(s) => write!(f, "{s:?}"),
            OperandKind::Int(i) => write!(f, "{i}"),
            OperandKind::Bool(b) => write!(f, "{b}"),
            OperandKind::Nil => write!(f, "nil"),
            OperandKind::Pipe(pipe) => write!(f, "({pipe})"),
        }
    }
}

/// How a parsed list of nodes ended.
enum Terminator {
    Eof,
    End(usize),
    Else(usize, Option<Pipeline>),
}

/// What a single `{{ ... }}` action turned out to be.
enum Action {
    Node(Node),
    Comment,
    If(Pipeline),
    Range(Pipeline),
    Else(usize, Option<Pipeline>),
    End(usize),
}

/// Where a pipeline stops.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Closer {
    Delim,
    Paren,
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    pos: usize,
    funcs: &'a FuncMap,
    trim_next_text: bool,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, funcs: &'a FuncMap) -> Self {
        Self {
            src,
            pos: 0,
            funcs,
            trim_next_text: false,
        }
    }

    pub fn parse(mut self) -> Result<Vec<Node>, TemplateError> {
        let (nodes, terminator) = self.parse_list()?;
        match terminator {
            Terminator::Eof => Ok(nodes),
            Terminator::End(pos) => Err(self.error_at(pos, "unexpected {{end}}")),
            Terminator::Else(pos, _) => Err(self.error_at(pos, "unexpected {{else}}")),
        }
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> TemplateError {
        TemplateError::parse(self.src, pos, message)
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        self.error_at(self.pos, message)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push_text(&mut self, nodes: &mut Vec<Node>, mut text: &str, trim_end: bool) {
        if std::mem::take(&mut self.trim_next_text) {
            text = text.trim_start();
        }
        if trim_end {
            text = text.trim_end();
        }
        if !text.is_empty() {
            nodes.push(Node::Text(text.to_string()));
        }
    }

    fn parse_list(&mut self) -> Result<(Vec<Node>, Terminator), TemplateError> {
        let mut nodes = Vec::new();
        loop {
            let rest = self.rest();
            let Some(offset) = rest.find(LEFT_DELIM) else {
                self.push_text(&mut nodes, rest, false);
                self.pos = self.src.len();
                return Ok((nodes, Terminator::Eof));
            };

            let open = self.pos + offset;
            let mut inner = open + LEFT_DELIM.len();
            let after = &self.src[inner..];
            let trim_left = after.starts_with('-')
                && after[1..].starts_with(|c: char| c.is_ascii_whitespace());
            if trim_left {
                inner += 1;
            }
            self.push_text(&mut nodes, &rest[..offset], trim_left);
            self.pos = inner;

            match self.parse_action()? {
                Action::Node(node) => nodes.push(node),
                Action::Comment => {}
                Action::If(pipe) => {
                    let node = self.parse_if(pipe)?;
                    nodes.push(node);
                }
                Action::Range(pipe) => {
                    let node = self.parse_range(pipe)?;
                    nodes.push(node);
                }
                Action::Else(pos, pipe) => return Ok((nodes, Terminator::Else(pos, pipe))),
                Action::End(pos) => return Ok((nodes, Terminator::End(pos))),
            }
        }
    }

    fn parse_if(&mut self, pipe: Pipeline) -> Result<Node, TemplateError> {
        let (then, terminator) = self.parse_list()?;
        let otherwise = match terminator {
            Terminator::End(_) => Vec::new(),
            Terminator::Else(_, None) => self.parse_tail()?,
            Terminator::Else(_, Some(else_pipe)) => vec![self.parse_if(else_pipe)?],
            Terminator::Eof => return Err(self.error("unexpected EOF")),
        };
        Ok(Node::If {
            pipe,
            then,
            otherwise,
        })
    }

    fn parse_range(&mut self, pipe: Pipeline) -> Result<Node, TemplateError> {
        let (body, terminator) = self.parse_list()?;
        let otherwise = match terminator {
            Terminator::End(_) => Vec::new(),
            Terminator::Else(_, None) => self.parse_tail()?,
            Terminator::Else(pos, Some(_)) => {
                return Err(self.error_at(pos, "unexpected {{else if}} in range"));
            }
            Terminator::Eof => return Err(self.error("unexpected EOF")),
        };
        Ok(Node::Range {
            pipe,
            body,
            otherwise,
        })
    }

    /// The `{{else}}` branch, which must be closed by `{{end}}`.
    fn parse_tail(&mut self) -> Result<Vec<Node>, TemplateError> {
        let (nodes, terminator) = self.parse_list()?;
        match terminator {
            Terminator::End(_) => Ok(nodes),
            Terminator::Else(pos, _) => Err(self.error_at(pos, "unexpected {{else}}")),
            Terminator::Eof => Err(self.error("unexpected EOF")),
        }
    }

    fn skip_spaces(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches([' ', '\t', '\r', '\n']);
        self.pos += rest.len() - trimmed.len();
    }

    fn at_right_delim(&self) -> bool {
        let rest = self.rest();
        rest.starts_with(RIGHT_DELIM) || rest.starts_with(RIGHT_TRIM_DELIM)
    }

    fn close_action(&mut self) -> Result<(), TemplateError> {
        self.skip_spaces();
        if self.rest().starts_with(RIGHT_TRIM_DELIM) {
            self.pos += RIGHT_TRIM_DELIM.len();
            self.trim_next_text = true;
            Ok(())
        } else if self.rest().starts_with(RIGHT_DELIM) {
            self.pos += RIGHT_DELIM.len();
            Ok(())
        } else if self.rest().is_empty() {
            Err(self.error("unclosed action"))
        } else {
            Err(self.error(format!("unexpected {:?} in command", self.rest_token())))
        }
    }

    fn rest_token(&self) -> String {
        self.rest()
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '}')
            .collect()
    }

    /// Identifier at the cursor without consuming it.
    fn peek_ident(&self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 || !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            return None;
        }
        Some(&rest[..len])
    }

    fn parse_action(&mut self) -> Result<Action, TemplateError> {
        self.skip_spaces();
        if self.rest().is_empty() {
            return Err(self.error("unclosed action"));
        }
        if self.rest().starts_with("/*") {
            let Some(end) = self.rest().find("*/") else {
                return Err(self.error("unclosed comment"));
            };
            self.pos += end + 2;
            self.close_action()?;
            return Ok(Action::Comment);
        }
        if self.at_right_delim() {
            return Err(self.error("missing value for command"));
        }

        let start = self.pos;
        match self.peek_ident() {
            Some("end") => {
                self.pos += 3;
                self.close_action()?;
                Ok(Action::End(start))
            }
            Some("else") => {
                self.pos += 4;
                self.skip_spaces();
                if self.peek_ident() == Some("if") {
                    self.pos += 2;
                    let pipe = self.parse_pipeline(Closer::Delim)?;
                    self.close_action()?;
                    Ok(Action::Else(start, Some(pipe)))
                } else {
                    self.close_action()?;
                    Ok(Action::Else(start, None))
                }
            }
            Some("if") => {
                self.pos += 2;
                let pipe = self.parse_pipeline(Closer::Delim)?;
                self.close_action()?;
                Ok(Action::If(pipe))
            }
            Some("range") => {
                self.pos += 5;
                let pipe = self.parse_pipeline(Closer::Delim)?;
                self.close_action()?;
                Ok(Action::Range(pipe))
            }
            _ => {
                let pipe = self.parse_pipeline(Closer::Delim)?;
                self.close_action()?;
                Ok(Action::Node(Node::Action(pipe)))
            }
        }
    }

    fn parse_pipeline(&mut self, closer: Closer) -> Result<Pipeline, TemplateError> {
        self.skip_spaces();
        let pos = self.pos;
        let mut cmds = Vec::new();
        loop {
            cmds.push(self.parse_command(closer)?);
            self.skip_spaces();
            if self.peek() == Some('|') {
                self.pos += 1;
                continue;
            }
            break;
        }
        Ok(Pipeline { pos, cmds })
    }

    fn parse_command(&mut self, closer: Closer) -> Result<Command, TemplateError> {
        self.skip_spaces();
        let pos = self.pos;
        let mut args = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                None => {
                    let message = match closer {
                        Closer::Delim => "unclosed action",
                        Closer::Paren => "unclosed left paren",
                    };
                    return Err(self.error(message));
                }
                Some('|') => break,
                Some(')') if closer == Closer::Paren => break,
                Some(')') => return Err(self.error("unexpected right paren")),
                _ if self.at_right_delim() => {
                    if closer == Closer::Paren {
                        return Err(self.error("unclosed left paren"));
                    }
                    break;
                }
                _ => args.push(self.parse_operand()?),
            }
        }
        if args.is_empty() {
            return Err(self.error("missing value for command"));
        }
        Ok(Command { pos, args })
    }

    fn parse_operand(&mut self) -> Result<Operand, TemplateError> {
        let pos = self.pos;
        let Some(c) = self.peek() else {
            return Err(self.error("unclosed action"));
        };
        let kind = match c {
            '.' => {
                self.pos += 1;
                if self.peek_ident().is_some() {
                    let mut names = Vec::new();
                    while let Some(name) = self.peek_ident() {
                        names.push(name.to_string());
                        self.pos += name.len();
                        if self.peek() == Some('.') {
                            self.pos += 1;
                        } else {
                            break;
                        }
                    }
                    OperandKind::Field(names)
                } else {
                    OperandKind::Dot
                }
            }
            '"' => OperandKind::Str(self.quoted_string()?),
            '`' => OperandKind::Str(self.raw_string()?),
            '(' => {
                self.pos += 1;
                let pipe = self.parse_pipeline(Closer::Paren)?;
                self.skip_spaces();
                if self.peek() != Some(')') {
                    return Err(self.error("unclosed left paren"));
                }
                self.pos += 1;
                OperandKind::Pipe(Box::new(pipe))
            }
            '0'..='9' | '-' | '+' => OperandKind::Int(self.number()?),
            '$' => return Err(self.error("undefined variable")),
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.peek_ident().unwrap_or_default();
                self.pos += ident.len();
                match ident {
                    "true" => OperandKind::Bool(true),
                    "false" => OperandKind::Bool(false),
                    "nil" => OperandKind::Nil,
                    "if" | "else" | "end" | "range" => {
                        return Err(self.error_at(pos, format!("unexpected <{ident}> in command")));
                    }
                    name if self.funcs.contains(name) => OperandKind::Func(name.to_string()),
                    name => {
                        return Err(
                            self.error_at(pos, format!("function {name:?} not defined"))
                        );
                    }
                }
            }
            c => {
                return Err(self.error(format!(
                    "unexpected bad character U+{:04X} '{c}' in command",
                    c as u32
                )));
            }
        };
        Ok(Operand { pos, kind })
    }

    fn number(&mut self) -> Result<i64, TemplateError> {
        let rest = self.rest();
        let sign_len = usize::from(rest.starts_with(['-', '+']));
        let digits = rest[sign_len..]
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '.')
            .unwrap_or(rest.len() - sign_len);
        let text = &rest[..sign_len + digits];
        let value = text
            .parse::<i64>()
            .map_err(|_| self.error(format!("bad number syntax: {text:?}")))?;
        self.pos += text.len();
        Ok(value)
    }

    fn quoted_string(&mut self) -> Result<String, TemplateError> {
        let mut value = String::new();
        let mut chars = self.rest().char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(value);
                }
                '\\' => {
                    let escaped = match chars.next() {
                        Some((_, 'n')) => '\n',
                        Some((_, 't')) => '\t',
                        Some((_, 'r')) => '\r',
                        Some((_, '\\')) => '\\',
                        Some((_, '"')) => '"',
                        Some((_, '\'')) => '\'',
                        Some((_, other)) => {
                            return Err(self.error(format!("invalid escape \\{other} in string")));
                        }
                        None => break,
                    };
                    value.push(escaped);
                }
                c => value.push(c),
            }
        }
        Err(self.error("unterminated quoted string"))
    }

    fn raw_string(&mut self) -> Result<String, TemplateError> {
        let rest = &self.rest()[1..];
        match rest.find('`') {
            Some(end) => {
                let value = rest[..end].to_string();
                self.pos += end + 2;
                Ok(value)
            }
            None => Err(self.error("unterminated raw quoted string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Vec<Node>, TemplateError> {
        let funcs = FuncMap::basic();
        Parser::new(src, &funcs).parse()
    }

    #[test]
    fn splits_text_and_actions() {
        let nodes = parse("a {{.Name}} b").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[0], Node::Text(t) if t == "a "));
        assert!(matches!(&nodes[2], Node::Text(t) if t == " b"));
    }

    #[test]
    fn pipeline_display_round_trips() {
        let nodes = parse(r#"{{json .Labels | upper}}{{split .Name "," }}"#).unwrap();
        let Node::Action(pipe) = &nodes[0] else {
            panic!("expected action");
        };
        assert_eq!(pipe.to_string(), "json .Labels | upper");
        let Node::Action(pipe) = &nodes[1] else {
            panic!("expected action");
        };
        assert_eq!(pipe.to_string(), r#"split .Name ",""#);
    }

    #[test]
    fn trim_markers_remove_surrounding_whitespace() {
        let nodes = parse("a  {{- .X -}}  b").unwrap();
        assert!(matches!(&nodes[0], Node::Text(t) if t == "a"));
        assert!(matches!(&nodes[2], Node::Text(t) if t == "b"));
    }

    #[test]
    fn else_if_nests_inside_otherwise() {
        let nodes = parse("{{if .A}}a{{else if .B}}b{{else}}c{{end}}").unwrap();
        let Node::If { otherwise, .. } = &nodes[0] else {
            panic!("expected if");
        };
        assert!(matches!(&otherwise[0], Node::If { .. }));
    }

    #[test]
    fn unclosed_action_is_an_error() {
        let err = parse("{{.Name").unwrap_err();
        assert_eq!(err.to_string(), "template: :1: unclosed action");
    }

    #[test]
    fn missing_end_is_an_error() {
        let err = parse("{{if .A}}x").unwrap_err();
        assert_eq!(err.to_string(), "template: :1: unexpected EOF");
    }

    #[test]
    fn stray_end_is_an_error() {
        let err = parse("x{{end}}").unwrap_err();
        assert_eq!(err.to_string(), "template: :1: unexpected {{end}}");
    }

    #[test]
    fn unknown_function_names_the_function() {
        let err = parse("line1\n{{nope .}}").unwrap_err();
        assert_eq!(err.to_string(), "template: :2: function \"nope\" not defined");
    }

    #[test]
    fn empty_action_is_an_error() {
        let err = parse("{{ }}").unwrap_err();
        assert_eq!(err.to_string(), "template: :1: missing value for command");
    }
}
