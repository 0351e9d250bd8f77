// ABOUTME: Entity view for swarm tasks: placement, image, lifecycle state, error and ports.
// ABOUTME: Task names and node names come from a resolver table keyed by task ID.

use crate::models::Task;
use crate::render::text::{ellipsis, pretty_print, quote_non_empty, time_ago, zero_time};
use crate::render::{EntityView, Field, KindFormats, RenderContext, RenderError};
use crate::template::Value;
use crate::types::ImageRef;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::Write;

pub const KIND: &str = "task";

const DEFAULT_TABLE_FORMAT: &str = "table {{.ID}}\t{{.Name}}\t{{.Image}}\t{{.Node}}\t{{.DesiredState}}\t{{.CurrentState}}\t{{.Error}}\t{{.Ports}}";
const RAW_FORMAT: &str = "id: {{.ID}}\\nname: {{.Name}}\\nimage: {{.Image}}\\nnode: {{.Node}}\\ndesired_state: {{.DesiredState}}\\ncurrent_state: {{.CurrentState}}\\nerror: {{.Error}}\\nports: {{.Ports}}\\n";

/// Display width of a truncated task error.
pub const MAX_ERR_LENGTH: usize = 30;

pub fn formats() -> KindFormats {
    KindFormats {
        table: DEFAULT_TABLE_FORMAT.to_string(),
        raw: RAW_FORMAT.to_string(),
        ..KindFormats::default()
    }
}

/// Display names and node names of tasks, keyed by task ID.
#[derive(Debug, Clone, Default)]
pub struct TaskNames {
    names: HashMap<String, String>,
    nodes: HashMap<String, String>,
}

impl TaskNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task_id: &str, name: impl Into<String>, node: impl Into<String>) {
        self.names.insert(task_id.to_string(), name.into());
        self.nodes.insert(task_id.to_string(), node.into());
    }

    pub fn name(&self, task_id: &str) -> &str {
        self.names.get(task_id).map(String::as_str).unwrap_or("")
    }

    pub fn node(&self, task_id: &str) -> &str {
        self.nodes.get(task_id).map(String::as_str).unwrap_or("")
    }

    /// Names built from raw IDs, for when services and nodes cannot be looked up.
    ///
    /// A task is `<service>.<slot>`, or `<service>.<node>` for global services
    /// (slot zero). A task sharing its name with the previous one is an older
    /// attempt at the same slot and is shown indented as ` \_ <name>`.
    pub fn unresolved(tasks: &[Task]) -> Self {
        let mut names = Self::new();
        let mut previous: Option<String> = None;
        for task in tasks {
            let name = if task.slot != 0 {
                format!("{}.{}", task.service_id, task.slot)
            } else {
                format!("{}.{}", task.service_id, task.node_id)
            };
            let shown = if previous.as_deref() == Some(name.as_str()) {
                format!(" \\_ {name}")
            } else {
                name.clone()
            };
            names.insert(task.id.as_str(), shown, task.node_id.as_str());
            previous = Some(name);
        }
        names
    }
}

/// Write `tasks` using the context's format; relative times are measured from `now`.
pub fn format_write<W: Write>(
    ctx: &mut RenderContext<W>,
    tasks: &[Task],
    names: &TaskNames,
    now: DateTime<Utc>,
) -> Result<(), RenderError> {
    let trunc = ctx.trunc();
    ctx.write(tasks.iter().map(|task| TaskView {
        task,
        name: names.name(task.id.as_str()),
        node: names.node(task.id.as_str()),
        trunc,
        now,
    }))
}

pub struct TaskView<'a> {
    task: &'a Task,
    name: &'a str,
    node: &'a str,
    trunc: bool,
    now: DateTime<Utc>,
}

impl<'a> TaskView<'a> {
    pub fn new(
        task: &'a Task,
        name: &'a str,
        node: &'a str,
        trunc: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            task,
            name,
            node,
            trunc,
            now,
        }
    }

    fn id(&self) -> Value {
        if self.trunc {
            Value::from(self.task.id.short())
        } else {
            Value::from(self.task.id.as_str())
        }
    }

    fn name(&self) -> Value {
        Value::from(self.name)
    }

    /// Under truncation a tagged reference loses its digest and default
    /// registry; anything else is shown as written.
    fn image(&self) -> Value {
        let image = &self.task.spec.container_spec.image;
        let short = self
            .trunc
            .then(|| ImageRef::parse(image).ok())
            .flatten()
            .and_then(|r| r.familiar_tagged());
        Value::Str(short.unwrap_or_else(|| image.clone()))
    }

    fn node(&self) -> Value {
        Value::from(self.node)
    }

    fn desired_state(&self) -> Value {
        Value::Str(pretty_print(self.task.desired_state.as_str()))
    }

    fn current_state(&self) -> Value {
        let status = &self.task.status;
        let since = status.timestamp.unwrap_or_else(zero_time);
        Value::Str(format!(
            "{} {}",
            pretty_print(status.state.as_str()),
            time_ago(since, self.now)
        ))
    }

    fn error(&self) -> Value {
        let err = &self.task.status.err;
        let shown = if self.trunc {
            ellipsis(err, MAX_ERR_LENGTH)
        } else {
            err.clone()
        };
        Value::Str(quote_non_empty(&shown))
    }

    fn ports(&self) -> Value {
        let ports: Vec<String> = self
            .task
            .status
            .port_status
            .ports
            .iter()
            .map(|p| format!("*:{}->{}/{}", p.published_port, p.target_port, p.protocol))
            .collect();
        Value::Str(ports.join(","))
    }
}

impl EntityView for TaskView<'_> {
    const KIND: &'static str = KIND;

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("ID", "ID", Self::id),
            Field::new("Name", "NAME", Self::name),
            Field::new("Image", "IMAGE", Self::image),
            Field::new("Node", "NODE", Self::node),
            Field::new("DesiredState", "DESIRED STATE", Self::desired_state),
            Field::new("CurrentState", "CURRENT STATE", Self::current_state),
            Field::new("Error", "ERROR", Self::error),
            Field::new("Ports", "PORTS", Self::ports),
        ]
    }
}
