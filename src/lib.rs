//! Webcam monitoring: a background capture-and-detect worker plus the login
//! request used by the desktop front-end.

pub mod accumulator;
mod capture;
pub mod config;
pub mod constants;
pub mod detector;
pub mod display;
pub mod error;
pub mod login;
pub mod presence;
pub mod settings;
pub mod window;
pub mod worker;

use anyhow::Result;
use log::LevelFilter;

pub use config::{AppSettings, CaptureSettings, Language};
pub use error::{CaptureError, LoginError};
pub use login::{ApiEndpoint, LoginEvent, LoginRequest};
pub use presence::{PresenceState, PresenceTimer};
pub use worker::{
    CaptureBackend, CaptureEvent, CaptureWorker, CapturedFrame, Detection, FrameSource,
    InterruptHandle, OpenCvBackend, Region,
};

/// Initialise `env_logger`, honouring `RUST_LOG` when set.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );

    // A logger installed earlier stays in place.
    let _ = builder.try_init();
    Ok(())
}
