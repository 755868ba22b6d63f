//! Constants used throughout the Listenink library.

use std::time::Duration;

/// Name of the category created for a user's first upload.
pub const DEFAULT_CATEGORY_NAME: &str = "Recent Uploads";

/// Colour of the category created for a user's first upload.
pub const DEFAULT_CATEGORY_COLOR: &str = "#FFFFFF";

/// Name given to documents uploaded without one.
pub const DEFAULT_DOCUMENT_NAME: &str = "New Document";

/// Upper bound on a whole transaction attempt, including lock waits.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempts made for a transaction that keeps hitting serialization conflicts.
pub const DEFAULT_TRANSACTION_ATTEMPTS: u32 = 5;

/// Base delay between conflicting attempts; grows linearly per attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// SQLite busy timeout in milliseconds.
pub const SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;
