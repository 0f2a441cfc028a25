use std::{io, path::PathBuf};

use thiserror::Error;

/// Fatal conditions that end a capture run.
///
/// The consumer only ever sees a single `Failed` event; the variants exist for
/// logging and for callers driving the pipeline directly.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capturing with device {index} failed")]
    DeviceOpen { index: i32 },
    #[error("can not create temporary classifier file: {0}")]
    TemporaryFile(#[source] io::Error),
    #[error("load classifier {path:?} failed")]
    ClassifierLoad { path: PathBuf },
    #[error("reading a frame from device {index} failed")]
    FrameRead { index: i32 },
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("transport failure: {0}")]
    Transport(String),
}
