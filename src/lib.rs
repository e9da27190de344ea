mod client;
mod error;
mod logger;
mod pairing;
mod protocol;
mod session;
mod status;
mod types;

pub use client::{FancoilClient, FancoilClientBuilder};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use pairing::{Candidate, DEFAULT_CANDIDATE_NAME, PairingCoordinator};
pub use protocol::{API_PATH, Command, degrees_to_tenths, tenths_to_degrees};
pub use session::{
    DEFAULT_POLL_INTERVAL, DeviceSession, SessionBuilder, SessionHandle, SessionState,
};
pub use status::decode;
pub use types::*;
