//! Fan-out over the open table sinks.

use std::path::Path;

use contracts::{ContractError, DerivedFrame, FrameSink};
use tracing::{debug, instrument};

use crate::tables::{Ekf1Table, Ekf2Table, Ekf3Table, Ekf4Table, Plot2Table, PlotTable};

/// Forwards every frame to all registered sinks in registration order.
/// A sink failure is fatal for the replay; there is nothing useful a
/// partial table set could be used for.
pub struct SinkDispatcher {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl SinkDispatcher {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// The full analysis table set in `output_dir`
    pub fn tables(output_dir: &Path) -> Result<Self, ContractError> {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(PlotTable::create(output_dir)?));
        dispatcher.register(Box::new(Plot2Table::create(output_dir)?));
        dispatcher.register(Box::new(Ekf1Table::create(output_dir)?));
        dispatcher.register(Box::new(Ekf2Table::create(output_dir)?));
        dispatcher.register(Box::new(Ekf3Table::create(output_dir)?));
        dispatcher.register(Box::new(Ekf4Table::create(output_dir)?));
        Ok(dispatcher)
    }

    pub fn register(&mut self, sink: Box<dyn FrameSink>) {
        debug!(sink = sink.name(), "sink registered");
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for SinkDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for SinkDispatcher {
    fn name(&self) -> &str {
        "dispatcher"
    }

    #[instrument(name = "dispatch_frame", skip_all, fields(time_ms = frame.time_ms))]
    fn write(&mut self, frame: &DerivedFrame) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.write(frame)?;
        }
        metrics::counter!("dispatcher_frames_total").increment(1);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DerivedState, ReferenceState};
    use tempfile::tempdir;

    #[test]
    fn test_table_set_creates_all_files() {
        let dir = tempdir().unwrap();
        let mut dispatcher = SinkDispatcher::tables(dir.path()).unwrap();
        assert_eq!(dispatcher.sink_count(), 6);

        dispatcher
            .write(&DerivedFrame {
                time_ms: 1000,
                reference: ReferenceState::default(),
                state: DerivedState::default(),
            })
            .unwrap();
        dispatcher.flush().unwrap();

        for name in ["plot.dat", "plot2.dat", "EKF1.dat", "EKF2.dat", "EKF3.dat", "EKF4.dat"] {
            let contents = std::fs::read_to_string(dir.path().join(name)).unwrap();
            assert_eq!(contents.lines().count(), 2, "{name}");
        }
    }
}
