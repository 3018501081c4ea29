//! Error types with diagnostic codes using miette
//!
//! Nothing here is retried: every error aborts the operation that raised it
//! and is meant to be reported to the user as-is.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// Canvas Errors
// ============================================================================

/// Errors raised while creating a canvas or writing its document
#[derive(Error, Diagnostic, Debug)]
pub enum CanvasError {
    #[error("cannot open '{}'", path.display())]
    #[diagnostic(
        code(epsdraw::canvas::destination_unavailable),
        help("check that the directory exists and is writable")
    )]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write document")]
    #[diagnostic(code(epsdraw::canvas::write))]
    Write(#[from] io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that occur while walking the scene
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("empty scene")]
    #[diagnostic(
        code(epsdraw::render::empty_scene),
        help("add at least one path or text before drawing")
    )]
    EmptyScene,

    #[error("shape refers to released property record #{index}")]
    #[diagnostic(
        code(epsdraw::render::stale_properties),
        help("a property handle was used after the shape holding it was released")
    )]
    StaleProperties { index: u32 },
}

// ============================================================================
// Path Errors
// ============================================================================

/// Errors from building a path
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("{operation} needs a current point")]
    #[diagnostic(
        code(epsdraw::path::no_current_point),
        help("start the path with move_to")
    )]
    NoCurrentPoint { operation: &'static str },
}
