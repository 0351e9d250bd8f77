// ABOUTME: Function registry for templates: json, split, join, case helpers, pad, truncate.
// ABOUTME: Header variants pass titles through so header rows keep their column names.

use super::Value;
use std::collections::HashMap;

/// A template function. Receives evaluated arguments, the piped value last.
pub type Func = fn(&[Value]) -> Result<Value, String>;

/// Named functions available to a template.
#[derive(Debug, Clone, Default)]
pub struct FuncMap {
    funcs: HashMap<String, Func>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Functions used when rendering entity rows.
    pub fn basic() -> Self {
        let mut map = Self::new();
        map.insert("json", json);
        map.insert("split", split);
        map.insert("join", join);
        map.insert("title", title);
        map.insert("lower", lower);
        map.insert("upper", upper);
        map.insert("pad", pad);
        map.insert("truncate", truncate);
        map.insert("println", println);
        map
    }

    /// Functions used when rendering a header row.
    ///
    /// Same names as [`FuncMap::basic`], each returning its first argument
    /// so `{{upper .Name}}` still yields the `NAME` title.
    pub fn header() -> Self {
        let mut map = Self::new();
        map.insert("json", header_json);
        for name in ["split", "join", "title", "lower", "upper", "pad", "truncate"] {
            map.insert(name, passthrough);
        }
        map.insert("println", println);
        map
    }

    pub fn insert(&mut self, name: impl Into<String>, func: Func) {
        self.funcs.insert(name.into(), func);
    }

    pub fn get(&self, name: &str) -> Option<Func> {
        self.funcs.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }
}

fn want(name: &str, args: &[Value], n: usize) -> Result<(), String> {
    if args.len() != n {
        return Err(format!(
            "wrong number of args for {name}: want {n} got {}",
            args.len()
        ));
    }
    Ok(())
}

fn text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn int(name: &str, value: &Value) -> Result<usize, String> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        other => Err(format!(
            "wrong type for value in {name}; expected non-negative int; got {}",
            other.type_name()
        )),
    }
}

fn json(args: &[Value]) -> Result<Value, String> {
    want("json", args, 1)?;
    serde_json::to_string(&args[0])
        .map(Value::Str)
        .map_err(|e| e.to_string())
}

fn split(args: &[Value]) -> Result<Value, String> {
    want("split", args, 2)?;
    let source = text(&args[0]);
    let sep = text(&args[1]);
    let parts = if sep.is_empty() {
        source.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        source
            .split(sep.as_str())
            .map(|part| Value::Str(part.to_string()))
            .collect()
    };
    Ok(Value::List(parts))
}

fn join(args: &[Value]) -> Result<Value, String> {
    want("join", args, 2)?;
    let sep = text(&args[1]);
    match &args[0] {
        Value::List(items) => Ok(Value::Str(
            items.iter().map(text).collect::<Vec<_>>().join(&sep),
        )),
        other => Ok(Value::Str(text(other))),
    }
}

fn title(args: &[Value]) -> Result<Value, String> {
    want("title", args, 1)?;
    let source = text(&args[0]);
    let mut result = String::with_capacity(source.len());
    let mut at_word_start = true;
    for c in source.chars() {
        if at_word_start && c.is_alphanumeric() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    Ok(Value::Str(result))
}

fn lower(args: &[Value]) -> Result<Value, String> {
    want("lower", args, 1)?;
    Ok(Value::Str(text(&args[0]).to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value, String> {
    want("upper", args, 1)?;
    Ok(Value::Str(text(&args[0]).to_uppercase()))
}

fn pad(args: &[Value]) -> Result<Value, String> {
    want("pad", args, 3)?;
    let left = int("pad", &args[1])?;
    let right = int("pad", &args[2])?;
    Ok(Value::Str(format!(
        "{}{}{}",
        " ".repeat(left),
        text(&args[0]),
        " ".repeat(right)
    )))
}

fn truncate(args: &[Value]) -> Result<Value, String> {
    want("truncate", args, 2)?;
    let source = text(&args[0]);
    let length = int("truncate", &args[1])?;
    Ok(Value::Str(source.chars().take(length).collect()))
}

fn println(args: &[Value]) -> Result<Value, String> {
    let mut line = args.iter().map(text).collect::<Vec<_>>().join(" ");
    line.push('\n');
    Ok(Value::Str(line))
}

fn passthrough(args: &[Value]) -> Result<Value, String> {
    Ok(args.first().cloned().unwrap_or(Value::Str(String::new())))
}

fn header_json(args: &[Value]) -> Result<Value, String> {
    match args.first() {
        Some(Value::Str(s)) => Ok(Value::Str(s.clone())),
        _ => Ok(Value::Str(String::new())),
    }
}
