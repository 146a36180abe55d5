//! Constants used throughout the application
//!
//! This module centralizes file names, defaults and user-facing messages.

// Files and directories
pub const APP_DIR_NAME: &str = "unwind";
pub const CONFIG_FILE_NAME: &str = "unwind.toml";
pub const XDG_CONFIG_FILE_NAME: &str = "config.toml";
pub const DATABASE_FILE_NAME: &str = "unwind.db";
pub const LOG_FILE_NAME: &str = "unwind.log";

// Backend
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const API_URL_ENV: &str = "UNWIND_API_URL";
pub const DEFAULT_TOKEN_ENV: &str = "UNWIND_ID_TOKEN";
/// Records fetched by one pull.
pub const DEFAULT_PULL_PAGE_SIZE: u32 = 200;

// Connectivity
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;

// Local views
pub const DEFAULT_LATEST_LIMIT: u64 = 10;
pub const DEFAULT_TODO_PRIORITY: &str = "medium";
/// Bound of the in-memory log kept for diagnostics.
pub const MAX_MEMORY_LOG_ENTRIES: usize = 500;

// Sync notices
pub const NOTICE_SAVED_OFFLINE: &str = "📴 Saved offline, will sync when back online";
pub const NOTICE_SYNCED: &str = "✅ Synced";
pub const NOTICE_PUSH_FAILED: &str = "❌ Sync failed, will retry when back online";
pub const NOTICE_RESYNCED: &str = "🔄 Resynced";

// Log messages
pub const LOG_ERROR_PULL: &str = "❌ Failed to pull";
pub const LOG_ERROR_PUSH: &str = "❌ Failed to push";
pub const LOG_ERROR_REMOTE_DELETE: &str = "❌ Failed to delete remote copy";
pub const LOG_ERROR_REMOTE_UPDATE: &str = "❌ Failed to update remote copy";

// CLI messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const WARN_NO_ID_TOKEN: &str = "⚠️ No ID token available: running offline only until one is provided via";
