// ABOUTME: Small text-template evaluator with dotted field access, pipelines and functions.
// ABOUTME: Renders values exposed through the Context trait; errors carry position info.

mod error;
mod exec;
mod funcs;
mod parse;

pub use error::TemplateError;
pub use funcs::{Func, FuncMap};

use parse::Node;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A dynamically typed value produced by a context or a function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
    /// Ordered key/value pairs.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Truthiness used by `if` and `range`.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type as shown in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "<no value>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "map[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// The root value a template executes against.
///
/// `.Name` resolves through [`Context::field`]; a bare `.` evaluates to
/// [`Context::to_value`].
pub trait Context {
    /// Type name used in "can't evaluate field" errors.
    fn type_name(&self) -> &str;

    /// Look up a named field, `None` when the context has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// The whole context as a value.
    fn to_value(&self) -> Value;
}

impl Context for Value {
    fn type_name(&self) -> &str {
        Value::type_name(self)
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// A parsed template, ready to be executed any number of times.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source`, checking every function name against `funcs`.
    pub fn parse(source: &str, funcs: &FuncMap) -> Result<Self, TemplateError> {
        let nodes = parse::Parser::new(source, funcs).parse()?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// Execute against `ctx`, appending the rendered text to `out`.
    ///
    /// On error `out` may hold a partial rendering; callers render into a
    /// scratch buffer when partial output must not escape.
    pub fn execute(
        &self,
        out: &mut String,
        ctx: &dyn Context,
        funcs: &FuncMap,
    ) -> Result<(), TemplateError> {
        exec::State::new(&self.source, ctx, funcs, out).walk_root(&self.nodes)
    }

    /// Convenience wrapper returning the rendered text.
    pub fn render(&self, ctx: &dyn Context, funcs: &FuncMap) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.execute(&mut out, ctx, funcs)?;
        Ok(out)
    }
}
