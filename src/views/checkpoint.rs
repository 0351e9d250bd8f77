// ABOUTME: Entity view for container checkpoints, identified by name alone.
// ABOUTME: Quiet output lists names since checkpoints carry no separate ID.

use crate::models::Checkpoint;
use crate::render::{EntityView, Field, KindFormats, RenderContext, RenderError};
use crate::template::Value;
use std::io::Write;

pub const KIND: &str = "checkpoint";

pub fn formats() -> KindFormats {
    KindFormats {
        table: "table {{.Name}}".to_string(),
        raw: "checkpoint_name: {{.Name}}\\n".to_string(),
        raw_quiet: "checkpoint_name: {{.Name}}".to_string(),
        quiet: "{{.Name}}".to_string(),
    }
}

pub fn format_write<W: Write>(
    ctx: &mut RenderContext<W>,
    checkpoints: &[Checkpoint],
) -> Result<(), RenderError> {
    ctx.write(checkpoints.iter().map(CheckpointView::new))
}

pub struct CheckpointView<'a> {
    checkpoint: &'a Checkpoint,
}

impl<'a> CheckpointView<'a> {
    pub fn new(checkpoint: &'a Checkpoint) -> Self {
        Self { checkpoint }
    }

    fn name(&self) -> Value {
        Value::from(self.checkpoint.name.as_str())
    }
}

impl EntityView for CheckpointView<'_> {
    const KIND: &'static str = KIND;

    fn fields() -> Vec<Field<Self>> {
        vec![Field::new("Name", "CHECKPOINT NAME", Self::name)]
    }
}
