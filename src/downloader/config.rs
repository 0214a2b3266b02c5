//! Download configuration constants

use std::time::Duration;

/// Total fetch attempts per period, including the first.
/// The portal's transient failures clear quickly or not at all; past three
/// attempts the month is reported as failed and left for a future run.
pub const MAX_ATTEMPTS: u32 = 3;

/// Fixed wait between attempts. The export form intermittently drops
/// requests under load; 15 seconds is enough for the portal to settle.
/// The delay is flat, not exponential: the binding limit is the daily
/// download cap, which no backoff shape can wait out within a run.
pub const RETRY_DELAY: Duration = Duration::from_secs(15);
