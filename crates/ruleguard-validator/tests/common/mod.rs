//! Common test utilities for validator integration tests

use ruleguard_validator::{MapResolver, Value};
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Install a test-writer subscriber once so ignored failures show up with
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory log sink for a scoped subscriber
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with debug logging captured on this thread, returning its result
/// and the formatted log lines
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    let lines = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect();
    (result, lines)
}

/// Context of a typical visitor
pub fn visitor() -> MapResolver {
    MapResolver::new()
        .with("country", "US")
        .with("age", 34)
        .with("premium", true)
        .with("referrer", Value::Null)
}

pub fn absent(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn none() -> HashSet<String> {
    HashSet::new()
}
