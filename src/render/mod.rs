// ABOUTME: Generic entity rendering: table, raw, JSON and custom-template output.
// ABOUTME: Entity views declare one field table used for lookup, headers and JSON alike.

mod error;
mod format;
mod tabwriter;
pub mod text;

pub use error::{RenderError, RenderErrorKind};
pub use format::{
    DEFAULT_QUIET_FORMAT, Format, FormatResolver, JSON_FORMAT, JSON_FORMAT_KEY, KindFormats,
    RAW_FORMAT_KEY, TABLE_FORMAT_KEY,
};
pub use tabwriter::TabWriter;

use crate::template::{Context, Func, FuncMap, Template, Value};
use error::{ExecuteSnafu, ParseSnafu};
use snafu::ResultExt;
use std::io::Write;

/// One displayable field of an entity view.
pub struct Field<V> {
    /// Name used in templates (`{{.Name}}`) and as the JSON key.
    pub name: &'static str,
    /// Column title shown in table headers.
    pub header: &'static str,
    pub get: fn(&V) -> Value,
}

impl<V> Field<V> {
    pub const fn new(name: &'static str, header: &'static str, get: fn(&V) -> Value) -> Self {
        Self { name, header, get }
    }
}

/// Adapter exposing one domain object's displayable fields.
///
/// `fields` is the single declaration of what a kind can display: template
/// lookups, header titles and `{{json .}}` all read from it.
pub trait EntityView: Sized {
    /// Kind name, used for format defaults and in error messages.
    const KIND: &'static str;

    /// Ordered field table.
    fn fields() -> Vec<Field<Self>>;
}

/// Value of a single field of `view`, as a template would see it.
pub fn field_value<V: EntityView>(view: &V, name: &str) -> Option<Value> {
    V::fields()
        .iter()
        .find(|f| f.name == name)
        .map(|f| (f.get)(view))
}

/// Header mapping of a kind: field name to column title.
pub fn header_titles<V: EntityView>() -> Vec<(&'static str, &'static str)> {
    V::fields().iter().map(|f| (f.name, f.header)).collect()
}

/// A view bound to its field table, as seen by the template.
struct Row<'a, V> {
    view: &'a V,
    fields: &'a [Field<V>],
}

impl<V: EntityView> Context for Row<'_, V> {
    fn type_name(&self) -> &str {
        V::KIND
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| (f.get)(self.view))
    }

    /// Every field rendered to its display string, so `{{json .}}` agrees
    /// with table output field by field. Keys are sorted.
    fn to_value(&self) -> Value {
        let mut entries: Vec<(String, Value)> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), Value::Str((f.get)(self.view).to_string())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Map(entries)
    }
}

/// Upper-cased column titles, evaluated by the same template as the rows.
struct HeaderRow {
    titles: Vec<(&'static str, String)>,
}

impl HeaderRow {
    fn new<V>(fields: &[Field<V>]) -> Self {
        Self {
            titles: fields
                .iter()
                .map(|f| (f.name, f.header.to_uppercase()))
                .collect(),
        }
    }
}

impl Context for HeaderRow {
    fn type_name(&self) -> &str {
        "header"
    }

    fn field(&self, name: &str) -> Option<Value> {
        let title = self
            .titles
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t.clone())
            .unwrap_or_default();
        Some(Value::Str(title))
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.titles
                .iter()
                .map(|(n, t)| (n.to_string(), Value::Str(t.clone())))
                .collect(),
        )
    }
}

/// Drives one render pass over a list of entities.
pub struct RenderContext<W: Write> {
    output: W,
    format: Format,
    trunc: bool,
    quiet: bool,
    funcs: FuncMap,
    header_funcs: FuncMap,
}

impl<W: Write> RenderContext<W> {
    pub fn new(output: W, format: impl Into<Format>) -> Self {
        Self {
            output,
            format: format.into(),
            trunc: false,
            quiet: false,
            funcs: FuncMap::basic(),
            header_funcs: FuncMap::header(),
        }
    }

    /// Shorten identifiers and long text fields.
    pub fn truncate(mut self, trunc: bool) -> Self {
        self.trunc = trunc;
        self
    }

    /// Identifier-only output without a header.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Make `func` callable from templates as `name`.
    pub fn register_func(&mut self, name: &str, func: Func) {
        self.funcs.insert(name, func);
        self.header_funcs.insert(name, func);
    }

    /// Whether views should truncate. Quiet output always shows full IDs.
    pub fn trunc(&self) -> bool {
        self.trunc && !self.quiet
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    /// Render `views` in order.
    ///
    /// Non-table layouts stream each completed record to the output; table
    /// layouts are aligned once every row is known. A failing record stops
    /// the pass and is never partially written.
    pub fn write<V, I>(&mut self, views: I) -> Result<(), RenderError>
    where
        V: EntityView,
        I: IntoIterator<Item = V>,
    {
        let source = self.format.template();
        let template = Template::parse(&source, &self.funcs).context(ParseSnafu)?;
        let fields = V::fields();
        tracing::debug!(kind = V::KIND, format = %self.format, "rendering entities");

        let mut table = self.format.is_table().then(TabWriter::default);
        if let Some(tw) = table.as_mut().filter(|_| !self.quiet) {
            let header = HeaderRow::new(&fields);
            let line = template
                .render(&header, &self.header_funcs)
                .context(ExecuteSnafu)?;
            tw.push_str(&line);
            tw.push_str("\n");
        }

        let mut rows = 0usize;
        for view in views {
            let row = Row {
                view: &view,
                fields: &fields,
            };
            let mut line = template.render(&row, &self.funcs).context(ExecuteSnafu)?;
            line.push('\n');
            match table.as_mut() {
                Some(tw) => tw.push_str(&line),
                None => self.output.write_all(line.as_bytes())?,
            }
            rows += 1;
        }

        if let Some(tw) = table {
            self.output.write_all(tw.finish().as_bytes())?;
        }
        self.output.flush()?;
        tracing::debug!(kind = V::KIND, rows, "rendered entities");
        Ok(())
    }
}
