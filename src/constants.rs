//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.
//! Most of these are defaults for `[timeline]` and `[demo]` config keys.

// === Timeline Constants ===

/// Distance in rows from the content end that still counts as "at bottom".
pub const AT_BOTTOM_THRESHOLD_ROWS: usize = 1;

/// Smallest height a rendered message can have (header + one body line).
/// Used to estimate how many rows fit the viewport.
pub const MIN_ROW_HEIGHT: usize = 2;

/// Once the list grows past this multiple of the viewport's row capacity
/// while at the bottom, older messages are discarded from the view.
pub const DISCARD_FACTOR: f64 = 1.5;

/// Trailing-edge throttle window for mark-read requests in milliseconds.
pub const MARK_READ_THROTTLE_MS: u64 = 500;

/// Settle delay before peeking at an active group call, once per mount.
pub const CALL_PEEK_DELAY_MS: u64 = 500;

/// How long the "recently scrolled" indicator stays up after the last scroll.
pub const SCROLL_ACTIVITY_MS: u64 = 3000;

/// Delay before checking where focus landed after a blur.
/// Zero defers the check to the next tick so a freshly opened overlay can take focus first.
pub const BLUR_CHECK_DELAY_MS: u64 = 0;

/// Height of the at-bottom detector at the end of the content.
pub const SENTINEL_HEIGHT: usize = 0;

// === Demo Store Constants ===

/// Number of messages delivered per page by the demo store.
pub const PAGE_SIZE: usize = 30;

/// Total length of the generated demo history.
pub const DEMO_HISTORY_LEN: usize = 400;

/// Simulated latency of a page load in milliseconds.
pub const LOAD_LATENCY_MS: u64 = 250;

/// Interval between simulated incoming messages (0 = disabled).
pub const INCOMING_INTERVAL_SECS: u64 = 20;

/// How long the simulated typing indicator shows before a message arrives.
pub const TYPING_LEAD_SECS: u64 = 3;

// === UI Constants ===

/// Event poll timeout while timers are pending (milliseconds).
pub const FAST_POLL_MS: u64 = 16;

/// Event poll timeout when idle (milliseconds).
pub const IDLE_POLL_MS: u64 = 100;

/// Capacity of the queue between the timeline and the host.
pub const TIMELINE_COMMAND_CAPACITY: usize = 64;

/// Rows scrolled per line-scroll key press.
pub const LINE_SCROLL_ROWS: usize = 1;

/// Maximum width of the review dialog popup.
pub const DIALOG_MAX_WIDTH: u16 = 64;

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 5;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

/// A gap this long between two messages starts a new author header.
pub const HEADER_GAP_MINUTES: i64 = 30;
