use std::{backtrace::Backtrace, panic::PanicHookInfo};

use anyhow::anyhow;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the fmt subscriber; `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    std::panic::set_hook(Box::new(log_panic));
    Ok(())
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let backtrace = Backtrace::capture();
    let location = info
        .location()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    tracing::error!(
        panic = %panic_message(info),
        location = %location,
        backtrace = %backtrace,
        "panic"
    );
}

fn panic_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
