pub const LOG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/logs");
pub const CRASH_LOG: &str = "crash.log";
pub const LATEST_LOG: &str = "latest.log";
