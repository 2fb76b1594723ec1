/// Tracing setup.
///
/// The terminal belongs to the renderer while the game runs, so log lines
/// go to a file. `RUST_LOG` overrides the configured filter. No file means
/// no subscriber: tracing macros become no-ops.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(file: Option<&Path>, filter: &str) -> io::Result<()> {
    let Some(path) = file else { return Ok(()) };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}
