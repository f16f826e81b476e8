//! Shared helpers for the platform-specific WebSocket clients.
//!
//! This module is runtime-agnostic (no tokio, no web-sys) so it can be used by
//! both the desktop and WASM implementations.

// Reconnection defaults (kept here so desktop + wasm stay in sync)
pub const INITIAL_RETRY_DELAY_MS: u64 = 2_000;
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;
pub const MAX_RETRY_ATTEMPTS: u32 = 5;
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Longest text frame echoed into logs.
const LOG_PREVIEW_CHARS: usize = 120;

/// Shorten a frame for log output.
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        assert_eq!(preview(&long).chars().count(), LOG_PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }
}
