pub const CASCADE_XML_FILE: &str = "models/haarcascade_frontalface_alt.xml";

pub const DEFAULT_DEVICE_INDEX: i32 = 0;
pub const DEFAULT_DETECTOR_MIN_SIZE: i32 = 20;
pub const DEFAULT_DETECTOR_MAX_SIZE: i32 = 50;

// Weight of the history in the running grayscale average.
pub const ACCUMULATOR_DECAY: f64 = 0.75;
pub const ACCUMULATOR_FRAME_WEIGHT: f64 = 1f64 - ACCUMULATOR_DECAY;

pub const DETECT_SCALE_FACTOR: f64 = 1.1;
pub const DETECT_MIN_NEIGHBORS: i32 = 3;

pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 60;
pub const PRESENCE_GRACE_SECS: u64 = 10;

pub const LOGIN_API_PATH: &str = "api/login";

pub const PREVIEW_WINDOW: &str = "webcam-watch";
pub const Q_KEY_CODE: i32 = 113;
