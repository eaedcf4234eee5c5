use thiserror::Error;

use crate::model::output::OutputId;
use crate::model::view::ViewId;
use crate::sys::surface::SurfaceId;

/// An operation whose precondition did not hold. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("View {0:?} is not on workspace {1}")]
    NotOnWorkspace(ViewId, usize),
    #[error("Unknown view: {0:?}")]
    UnknownView(ViewId),
    #[error("Unknown output: {0:?}")]
    UnknownOutput(OutputId),
    #[error("Unknown workspace: {0}")]
    UnknownWorkspace(usize),
    #[error("View {0:?} is not floating")]
    NotFloating(ViewId),
    #[error("View {0:?} is maximized")]
    Maximized(ViewId),
    #[error("View {0:?} is fullscreen")]
    Fullscreen(ViewId),
    #[error("View {0:?} is not fullscreen")]
    NotFullscreen(ViewId),
    #[error("View {0:?} is not maximized")]
    NotMaximized(ViewId),
    #[error("View {0:?} is hidden")]
    Hidden(ViewId),
    #[error("View {0:?} is not hidden")]
    NotHidden(ViewId),
    #[error("View {0:?} is not in a tiling or floating layer")]
    NotLayouted(ViewId),
    #[error("View {0:?} has no layout metadata")]
    MissingMetadata(ViewId),
    #[error("View {0:?} has no output")]
    NoOutput(ViewId),
    #[error("View {0:?} is already on workspace {1}")]
    AlreadyPlaced(ViewId, usize),
    #[error("{0} already backs a view")]
    SurfaceInUse(SurfaceId),
}
