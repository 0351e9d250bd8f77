// ABOUTME: Tree-walking executor for parsed templates.
// ABOUTME: Resolves fields against the root Context and calls registered functions.

use super::error::TemplateError;
use super::funcs::FuncMap;
use super::parse::{Command, Node, Operand, OperandKind, Pipeline};
use super::{Context, Value};

/// The value `.` refers to at a point of execution.
enum Dot {
    Root,
    Value(Value),
}

pub(crate) struct State<'a> {
    src: &'a str,
    root: &'a dyn Context,
    funcs: &'a FuncMap,
    out: &'a mut String,
}

impl<'a> State<'a> {
    pub fn new(
        src: &'a str,
        root: &'a dyn Context,
        funcs: &'a FuncMap,
        out: &'a mut String,
    ) -> Self {
        Self {
            src,
            root,
            funcs,
            out,
        }
    }

    pub fn walk_root(&mut self, nodes: &[Node]) -> Result<(), TemplateError> {
        self.walk(&Dot::Root, nodes)
    }

    fn fail(&self, pos: usize, node: impl ToString, message: impl Into<String>) -> TemplateError {
        TemplateError::exec(self.src, pos, node.to_string(), message)
    }

    fn walk(&mut self, dot: &Dot, nodes: &[Node]) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Action(pipe) => {
                    let value = self.eval_pipeline(dot, pipe)?;
                    self.out.push_str(&value.to_string());
                }
                Node::If {
                    pipe,
                    then,
                    otherwise,
                } => {
                    if self.eval_pipeline(dot, pipe)?.is_true() {
                        self.walk(dot, then)?;
                    } else {
                        self.walk(dot, otherwise)?;
                    }
                }
                Node::Range {
                    pipe,
                    body,
                    otherwise,
                } => {
                    let items = match self.eval_pipeline(dot, pipe)? {
                        Value::List(items) => items,
                        Value::Map(entries) => entries.into_iter().map(|(_, v)| v).collect(),
                        Value::Nil => Vec::new(),
                        other => {
                            return Err(self.fail(
                                pipe.pos,
                                pipe,
                                format!("range can't iterate over {other}"),
                            ));
                        }
                    };
                    if items.is_empty() {
                        self.walk(dot, otherwise)?;
                    }
                    for item in items {
                        self.walk(&Dot::Value(item), body)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_pipeline(&mut self, dot: &Dot, pipe: &Pipeline) -> Result<Value, TemplateError> {
        let mut value = None;
        for cmd in &pipe.cmds {
            value = Some(self.eval_command(dot, cmd, value.take())?);
        }
        Ok(value.unwrap_or(Value::Nil))
    }

    fn eval_command(
        &mut self,
        dot: &Dot,
        cmd: &Command,
        piped: Option<Value>,
    ) -> Result<Value, TemplateError> {
        let first = &cmd.args[0];
        if let OperandKind::Func(name) = &first.kind {
            let mut args = cmd.args[1..]
                .iter()
                .map(|arg| self.eval_arg(dot, arg))
                .collect::<Result<Vec<_>, _>>()?;
            args.extend(piped);
            return self.call(name, &args, cmd.pos, cmd);
        }

        if cmd.args.len() > 1 || piped.is_some() {
            return Err(self.fail(
                first.pos,
                first,
                format!("can't give argument to non-function {first}"),
            ));
        }
        if let OperandKind::Nil = first.kind {
            return Err(self.fail(first.pos, first, "nil is not a command"));
        }
        self.eval_arg(dot, first)
    }

    fn call(
        &self,
        name: &str,
        args: &[Value],
        pos: usize,
        node: &Command,
    ) -> Result<Value, TemplateError> {
        let Some(func) = self.funcs.get(name) else {
            return Err(self.fail(pos, node, format!("function {name:?} not defined")));
        };
        func(args).map_err(|e| self.fail(pos, node, format!("error calling {name}: {e}")))
    }

    fn eval_arg(&mut self, dot: &Dot, arg: &Operand) -> Result<Value, TemplateError> {
        match &arg.kind {
            OperandKind::Dot => Ok(match dot {
                Dot::Root => self.root.to_value(),
                Dot::Value(v) => v.clone(),
            }),
            OperandKind::Field(names) => self.eval_field(dot, names, arg),
            OperandKind::Func(name) => {
                let node = Command {
                    pos: arg.pos,
                    args: vec![arg.clone()],
                };
                self.call(name, &[], arg.pos, &node)
            }
            OperandKind::Str(s) => Ok(Value::Str(s.clone())),
            OperandKind::Int(i) => Ok(Value::Int(*i)),
            OperandKind::Bool(b) => Ok(Value::Bool(*b)),
            OperandKind::Nil => Ok(Value::Nil),
            OperandKind::Pipe(pipe) => self.eval_pipeline(dot, pipe),
        }
    }

    fn eval_field(
        &self,
        dot: &Dot,
        names: &[String],
        arg: &Operand,
    ) -> Result<Value, TemplateError> {
        let (first, rest) = names
            .split_first()
            .ok_or_else(|| self.fail(arg.pos, arg, "empty field chain"))?;
        let mut current = match dot {
            Dot::Root => self.root.field(first).ok_or_else(|| {
                self.fail(
                    arg.pos,
                    arg,
                    format!(
                        "can't evaluate field {first} in type {}",
                        self.root.type_name()
                    ),
                )
            })?,
            Dot::Value(v) => self.field_of(v, first, arg)?,
        };
        for name in rest {
            current = self.field_of(&current, name, arg)?;
        }
        Ok(current)
    }

    fn field_of(&self, value: &Value, name: &str, arg: &Operand) -> Result<Value, TemplateError> {
        match value {
            Value::Map(_) => Ok(value.get(name).cloned().unwrap_or(Value::Nil)),
            Value::Nil => Err(self.fail(
                arg.pos,
                arg,
                format!("nil pointer evaluating {name}"),
            )),
            other => Err(self.fail(
                arg.pos,
                arg,
                format!("can't evaluate field {name} in type {}", other.type_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::template::{FuncMap, Template, TemplateError, Value};

    fn root() -> Value {
        Value::Map(vec![
            ("ID".to_string(), Value::from("abc")),
            ("Count".to_string(), Value::Int(2)),
            (
                "Labels".to_string(),
                Value::Map(vec![("env".to_string(), Value::from("prod"))]),
            ),
            (
                "Ports".to_string(),
                Value::List(vec![Value::from("80/tcp"), Value::from("443/tcp")]),
            ),
        ])
    }

    fn render(src: &str) -> Result<String, TemplateError> {
        let funcs = FuncMap::basic();
        Template::parse(src, &funcs)?.render(&root(), &funcs)
    }

    #[test]
    fn nil_command_is_an_execution_error() {
        let err = render("{{nil}}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "template: :1:2: executing \"\" at <nil>: nil is not a command"
        );
    }

    #[test]
    fn unknown_root_field_names_the_type() {
        let err = render("x {{.Missing}}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "template: :1:4: executing \"\" at <.Missing>: can't evaluate field Missing in type map"
        );
    }

    #[test]
    fn pipelines_pass_value_as_last_argument() {
        assert_eq!(render("{{.ID | upper}}").unwrap(), "ABC");
        assert_eq!(render(r#"{{"-" | split "x-y-z"}}"#).unwrap(), "[x y z]");
    }

    #[test]
    fn nested_map_fields_resolve() {
        assert_eq!(render("{{.Labels.env}}").unwrap(), "prod");
        assert_eq!(render("{{.Labels.missing}}").unwrap(), "<no value>");
    }

    #[test]
    fn range_iterates_lists() {
        assert_eq!(
            render("{{range .Ports}}[{{.}}]{{end}}").unwrap(),
            "[80/tcp][443/tcp]"
        );
        assert_eq!(
            render(r#"{{range split "" ","}}x{{else}}empty{{end}}"#).unwrap(),
            "x"
        );
    }

    #[test]
    fn range_over_scalar_fails() {
        let err = render("{{range .ID}}{{end}}").unwrap_err();
        assert!(err.to_string().contains("range can't iterate over abc"));
    }

    #[test]
    fn json_of_dot_serializes_whole_context() {
        assert_eq!(
            render("{{json .}}").unwrap(),
            r#"{"ID":"abc","Count":2,"Labels":{"env":"prod"},"Ports":["80/tcp","443/tcp"]}"#
        );
    }

    #[test]
    fn json_of_field_serializes_that_value() {
        assert_eq!(
            render("{{json .Labels}}").unwrap(),
            r#"{"env":"prod"}"#
        );
        assert_eq!(render("{{json .Count}}").unwrap(), "2");
    }

    #[test]
    fn field_given_arguments_is_rejected() {
        let err = render("{{.ID 1}}").unwrap_err();
        assert!(
            err.to_string()
                .contains("can't give argument to non-function .ID")
        );
    }

    #[test]
    fn function_errors_are_wrapped() {
        let err = render("{{pad .ID}}").unwrap_err();
        assert!(
            err.to_string()
                .contains("error calling pad: wrong number of args for pad: want 3 got 1")
        );
    }
}
