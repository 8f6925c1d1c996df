#![allow(dead_code)]

use std::sync::Arc;
use textedit_core::{Context, TextBuffer};

/// Route `tracing` output through the test harness so it shows up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn context() -> Arc<Context> {
    Context::shared_default()
}

pub fn buffer(text: &str) -> TextBuffer {
    TextBuffer::from_text(context(), text)
}

pub fn lines(buffer: &TextBuffer) -> Vec<String> {
    buffer.lines().map(|l| l.data().to_string()).collect()
}
