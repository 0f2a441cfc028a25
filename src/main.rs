use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use image::RgbaImage;
use log::{debug, info, warn, LevelFilter};
use webcam_watch::config::default_settings_path;
use webcam_watch::constants::*;
use webcam_watch::window::Window;
use webcam_watch::{
    init_logging, AppSettings, CaptureEvent, CaptureWorker, CapturedFrame, Detection, LoginEvent,
    LoginRequest, PresenceState, PresenceTimer,
};

const EVENT_POLL: Duration = Duration::from_millis(30);

/// Watch a webcam for faces and talk to the companion web service.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Settings JSON. Defaults to `config/settings.json`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture from the webcam and run the detector.
    Watch(WatchArgs),
    /// Log in against the configured API.
    Login(LoginArgs),
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Capture device index.
    #[arg(long)]
    device: Option<i32>,

    /// Cascade classifier XML.
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// Smallest detection window, percent of the frame.
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=100))]
    min: Option<i32>,

    /// Largest detection window, percent of the frame.
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=100))]
    max: Option<i32>,

    /// Show frames in a preview window (press q to stop).
    #[arg(long)]
    show: bool,
}

#[derive(Debug, Args)]
struct LoginArgs {
    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Store the credentials in the settings file after a successful login.
    #[arg(long)]
    save: bool,
}

fn watch(settings: &AppSettings, args: WatchArgs) -> Result<()> {
    let mut capture = settings.capture.clone();
    if let Some(device) = args.device {
        capture.device_index = device;
    }
    if let Some(classifier) = args.classifier {
        capture.classifier_path = classifier;
    }
    if let Some(min) = args.min {
        capture.detector_min_size = min;
    }
    if let Some(max) = args.max {
        capture.detector_max_size = max;
    }
    if args.show {
        capture.hidden_capture = false;
    }

    let mut worker = CaptureWorker::new();
    capture.apply_to(&worker);
    let events = worker.events();

    let window = match args.show {
        true => Some(Window::create(PREVIEW_WINDOW)?),
        false => None,
    };
    let mut presence = PresenceTimer::from_minutes(
        settings.duration,
        Duration::from_secs(PRESENCE_GRACE_SECS),
    );

    info!(
        "Watching device {} (limit {} min)",
        capture.device_index, settings.duration
    );
    ensure!(worker.start(), "capture worker did not start");
    let result = frame_loop(&worker, &events, window.as_ref(), &mut presence);
    worker.request_interruption();
    worker.wait();
    result
}

fn frame_loop(
    worker: &CaptureWorker,
    events: &Receiver<CaptureEvent>,
    window: Option<&Window>,
    presence: &mut PresenceTimer,
) -> Result<()> {
    let mut last_image: Option<RgbaImage> = None;
    let mut warned = false;
    let mut status = String::new();

    loop {
        let event = match events.recv_timeout(EVENT_POLL) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) if !worker.is_running() => break,
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        match event {
            Some(CaptureEvent::Failed) => bail!("capture stopped on an unrecoverable error"),
            Some(CaptureEvent::Captured(CapturedFrame::EndOfStream)) => break,
            Some(CaptureEvent::Captured(frame)) => {
                let state = presence.observe(false, Instant::now());
                status = describe(state, &mut warned, presence.limit());
                if let (Some(window), CapturedFrame::Frame(image)) = (window, frame) {
                    window.show_image(&image, None, &status)?;
                    last_image = Some(image);
                }
            }
            Some(CaptureEvent::Detected(detection)) => {
                let state = presence.observe(true, Instant::now());
                status = describe(state, &mut warned, presence.limit());
                match detection {
                    Detection::Region(region) => {
                        debug!("Detected region {:?}", region);
                        if let (Some(window), Some(image)) = (window, last_image.as_ref()) {
                            window.show_image(image, Some(region), &status)?;
                        }
                    }
                    Detection::Image(image) => {
                        debug!("Detected region {}x{}", image.width(), image.height());
                    }
                }
            }
            None => {}
        }

        if let Some(window) = window {
            if window.poll_key()? == Q_KEY_CODE {
                worker.request_interruption();
            }
        }
    }

    if events
        .try_iter()
        .any(|event| matches!(event, CaptureEvent::Failed))
    {
        bail!("capture stopped on an unrecoverable error");
    }
    Ok(())
}

fn describe(state: PresenceState, warned: &mut bool, limit: Duration) -> String {
    match state {
        PresenceState::Absent => {
            *warned = false;
            "nobody".to_string()
        }
        PresenceState::Present(elapsed) => format!("present {}s", elapsed.as_secs()),
        PresenceState::Exceeded(elapsed) => {
            if !*warned {
                warn!(
                    "In front of the webcam for {} min, limit is {} min",
                    elapsed.as_secs() / 60,
                    limit.as_secs() / 60
                );
                *warned = true;
            }
            format!("take a break ({}s)", elapsed.as_secs())
        }
    }
}

fn login(settings: &mut AppSettings, args: LoginArgs, config_path: &Path) -> Result<()> {
    ensure!(
        !settings.domain.is_empty(),
        "no API domain configured in {}",
        config_path.display()
    );

    let mut request = LoginRequest::new(settings.endpoint());
    request.set_username(args.username.unwrap_or_else(|| settings.username.clone()));
    request.set_password(args.password.unwrap_or_else(|| settings.password.clone()));

    let messages = request.messages();
    let success = request.send();
    for event in messages.try_iter() {
        if let LoginEvent::Message(text) = event {
            println!("{text}");
        }
    }

    if !success {
        if let Some(link) = settings.registration_link() {
            println!("Register: {link}");
        }
        bail!("login as '{}' failed", request.username());
    }

    println!("Logged in as {}", request.username());
    if args.save {
        settings.username = request.username().to_string();
        settings.password = request.password().to_string();
        settings.save_to_path(config_path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    init_logging(level)?;

    let config_path = cli.config.unwrap_or_else(default_settings_path);
    let mut settings = AppSettings::load_or_default(&config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    match cli.command {
        Command::Watch(args) => watch(&settings, args),
        Command::Login(args) => login(&mut settings, args, &config_path),
    }
}
