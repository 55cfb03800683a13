//! Domain constants
//!
//! Centralized location for the fixed API endpoints and timing defaults used
//! throughout the client.

// REST API hosts
pub const FORMS_API_HOST: &str = "forms.googleapis.com";
pub const DRIVE_API_HOST: &str = "www.googleapis.com";
pub const HTTPS_PORT: u16 = 443;

// Clock gate configuration
pub const DEFAULT_CLOCK_SYNC_TIMEOUT_MS: u64 = 3000;
pub const CLOCK_SYNC_POLL_MS: u64 = 100;
/// Timestamps below this are treated as an unsynchronized clock
/// (2021-01-01T00:00:00Z).
pub const CLOCK_SANITY_FLOOR_SECS: i64 = 1_609_459_200;

// Transport configuration
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 30;
