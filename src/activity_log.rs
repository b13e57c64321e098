use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only text log shown in the activity pane.
///
/// Clones share the same buffer, so background jobs append while the GUI reads.
#[derive(Clone, Default)]
pub struct ActivityLog {
    buffer: Arc<Mutex<String>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        // a panicked writer leaves at worst a half-written line
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append one line followed by a newline.
    pub fn append(&self, line: impl AsRef<str>) {
        let line = line.as_ref();
        tracing::info!(target: "activity", "{}", line);
        let mut buffer = self.lock();
        buffer.push_str(line);
        buffer.push('\n');
    }

    pub fn text(&self) -> String {
        self.lock().clone()
    }

    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
