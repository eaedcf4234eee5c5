mod error;
mod floating;
pub(crate) mod graph;
pub mod ops;
mod strategy;
pub mod systems;
mod tiling;
mod workspace;

pub use error::WorkspaceError;
pub use floating::FloatingLayout;
pub use graph::Orientation;
pub use ops::{LayoutCommand, LayoutOp, OpBatch, apply_ops, batch_capacity};
pub use strategy::{Layout, LayoutStrategy};
pub use systems::{Dwindle, MasterStack, Partition, PartitionKind, SplitState};
pub use tiling::TilingLayout;
pub use workspace::{Ctx, Workspace};
