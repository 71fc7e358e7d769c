//! Report export
//!
//! Serializes scenario and race reports to JSON for external consumption.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::SimulationReport;
use crate::race::RaceReport;

/// Combined export containing all simulation outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationExport {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<SimulationReport>,
    pub race: Option<RaceReport>,
}

impl SimulationExport {
    pub fn new(reports: Vec<SimulationReport>, race: Option<RaceReport>) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            generated_at: Utc::now(),
            reports,
            race,
        }
    }

    /// True when every scenario passed and the race (if any) had one winner.
    pub fn passed(&self) -> bool {
        self.reports.iter().all(|r| r.passed())
            && self.race.as_ref().map_or(true, |r| r.exactly_once())
    }
}

/// Export as pretty-printed JSON.
pub fn export_json(export: &SimulationExport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(export)
}

/// Write export to a file path.
pub fn write_to_file(export: &SimulationExport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let json = export_json(export)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Simulation;
    use crate::scenarios;

    #[test]
    fn test_export_json_contains_reports() {
        let report = Simulation::run(&scenarios::validate_flow()).unwrap();
        let export = SimulationExport::new(vec![report], None);
        let json = export_json(&export).unwrap();
        assert!(json.contains("validate_flow"));
        assert!(json.contains(crate::VERSION));
        assert!(export.passed());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let export = SimulationExport::new(Vec::new(), None);

        write_to_file(&export, &path).unwrap();
        let back: SimulationExport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.version, export.version);
        assert!(back.reports.is_empty());
    }
}
