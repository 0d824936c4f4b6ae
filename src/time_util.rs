//! Small time helpers shared by the workers, grounded in
//! `original_source/worker/utils.go`'s `now`/`getSepTimeInFind`/
//! `getPassedTimeSince`.

use chrono::Utc;

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Earliest timestamp still within `max_lifetime` seconds of now, floored
/// at zero. Used to bound how far back a worker's paged scan looks.
pub fn since_floor(max_lifetime: i64) -> i64 {
    let n = now();
    if n > max_lifetime {
        n - max_lifetime
    } else {
        0
    }
}

pub fn passed_since(start: i64) -> i64 {
    let n = now();
    if n > start {
        n - start
    } else {
        0
    }
}
