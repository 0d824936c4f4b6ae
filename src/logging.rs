//! Structured logging bootstrap, `env_logger` over the `log` facade —
//! the same pairing the teacher's binaries use.

use std::io::Write;

/// Initialize the global logger once. Safe to call more than once; later
/// calls are no-ops (mirrors `env_logger::Builder::try_init`'s contract).
pub fn init(identifier: &str) {
    let prefix = identifier.to_owned();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Utc::now().to_rfc3339(),
                prefix,
                record.level(),
                record.args()
            )
        })
        .try_init();
}
