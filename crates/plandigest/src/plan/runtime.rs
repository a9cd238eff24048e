use std::{fmt::Write as _, time::Duration};

///
/// RuntimeStats
///
/// Execution statistics attached after a plan ran. Display only.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeStats {
    pub time: Duration,
    pub loops: u64,
    pub act_rows: u64,
    pub memory_bytes: Option<u64>,
    pub disk_bytes: Option<u64>,
    pub concurrency: Option<u32>,
    /// Operator-specific fragments appended verbatim (`cop_task: {num: 1}`).
    pub details: Vec<String>,
}

impl RuntimeStats {
    #[must_use]
    pub const fn new(time: Duration, loops: u64, act_rows: u64) -> Self {
        Self {
            time,
            loops,
            act_rows,
            memory_bytes: None,
            disk_bytes: None,
            concurrency: None,
            details: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_memory(mut self, bytes: u64) -> Self {
        self.memory_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub const fn with_disk(mut self, bytes: u64) -> Self {
        self.disk_bytes = Some(bytes);
        self
    }

    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// `time:1.20ms, loops:2, concurrency:5, <details>`. Never empty.
    #[must_use]
    pub fn execution_info(&self) -> String {
        let mut out = format!("time:{}, loops:{}", format_duration(self.time), self.loops);
        if let Some(concurrency) = self.concurrency {
            let _ = write!(out, ", concurrency:{concurrency}");
        }
        for detail in &self.details {
            out.push_str(", ");
            out.push_str(detail);
        }
        out
    }

    #[must_use]
    pub fn memory(&self) -> String {
        self.memory_bytes.map_or_else(|| "N/A".to_string(), format_bytes)
    }

    #[must_use]
    pub fn disk(&self) -> String {
        self.disk_bytes.map_or_else(|| "N/A".to_string(), format_bytes)
    }
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos < 1_000 {
        format!("{nanos}ns")
    } else if nanos < 1_000_000 {
        format!("{:.1}µs", nanos as f64 / 1e3)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1e6)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

///
/// TESTS
///
