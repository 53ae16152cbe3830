//! System-wide constants and defaults.

/// Default listen address for the HTTP/WebSocket server.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:1111";

/// Default delay between the end of one poll cycle and the start of the next.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default bound of a session's outbound snapshot queue.
pub const DEFAULT_QUEUE_BOUND: usize = 8;

/// Number of characters kept when truncating a container ID for display.
pub const SHORT_ID_LEN: usize = 12;

/// Placeholder shown for containers the runtime reports without a name.
pub const UNNAMED_PLACEHOLDER: &str = "<unnamed>";

/// Path of the WebSocket upgrade endpoint.
pub const WS_PATH: &str = "/ws";

/// Application name used in CLI output and logs.
pub const APP_NAME: &str = "conwatch";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cwatch";
