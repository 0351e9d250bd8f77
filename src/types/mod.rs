// ABOUTME: Type-safe identifiers and small value types shared by the domain models.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod image_ref;
mod labels;

pub use id::{Id, NetworkId, NodeId, SHORT_ID_LEN, ServiceId, TaskId, truncate_id};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use labels::Labels;
