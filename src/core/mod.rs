pub mod acquisition;
pub mod error;
pub mod playback;
pub mod replay;
pub mod session;
pub mod turn_log;
