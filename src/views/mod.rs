// ABOUTME: Entity views for the listed object kinds.
// ABOUTME: Each kind exposes its KIND name, default formats and a format_write entry point.

pub mod checkpoint;
pub mod network;
pub mod task;

pub use checkpoint::CheckpointView;
pub use network::NetworkView;
pub use task::{TaskNames, TaskView};
