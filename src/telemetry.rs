/// Events emitted while a run walks its datasets
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// Started resolving a dataset
    DatasetStarted,
    /// DDL for one table was produced
    TableGenerated,
    /// A version (or a whole dataset) was left out
    VersionSkipped,
    /// A dataset failed and contributed nothing
    DatasetFailed,
}

/// Statistics aggregated from telemetry events
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub datasets_started: usize,
    pub datasets_failed: usize,
    pub tables_generated: usize,
    pub versions_skipped: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a telemetry event
    pub fn update(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::DatasetStarted => {
                self.datasets_started += 1;
            }
            TelemetryEvent::TableGenerated => {
                self.tables_generated += 1;
            }
            TelemetryEvent::VersionSkipped => {
                self.versions_skipped += 1;
            }
            TelemetryEvent::DatasetFailed => {
                self.datasets_failed += 1;
            }
        }
    }

    /// Datasets that completed without error
    pub fn datasets_succeeded(&self) -> usize {
        self.datasets_started - self.datasets_failed
    }
}
