//! Run summaries and series export for downstream plotting

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::simulation::SimulationResult;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// Summary plus series as one pretty-printed document
    #[default]
    Json,
    /// `time,temperature,output[,reference]` rows
    Csv,
}

/// Headline figures of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub steps: usize,
    pub final_time: Option<f64>,
    pub final_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub peak_output: Option<f64>,
    pub mean_output: Option<f64>,
}

impl RunSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            steps: result.steps(),
            final_time: result.time.last(),
            final_temperature: result.temperature.last(),
            min_temperature: result.temperature.min(),
            max_temperature: result.temperature.max(),
            peak_output: result.output.max(),
            mean_output: result.output.mean(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    summary: &'a RunSummary,
    #[serde(flatten)]
    result: &'a SimulationResult,
}

/// Write summary and series as JSON
pub fn write_json<W: Write>(
    mut writer: W,
    summary: &RunSummary,
    result: &SimulationResult,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &RunReport { summary, result })?;
    writer.flush()?;
    Ok(())
}

/// Write the series as CSV, one row per sample index
///
/// The temperature and output series run one sample past the clock, so the
/// last row has an empty time cell.
pub fn write_csv<W: Write>(mut writer: W, result: &SimulationResult) -> Result<()> {
    let reference = result.reference.as_ref();

    write!(writer, "time,temperature,output")?;
    if reference.is_some() {
        write!(writer, ",reference")?;
    }
    writeln!(writer)?;

    let rows = result.temperature.iter().zip(&result.output);
    for (index, (temperature, output)) in rows.enumerate() {
        match result.time.get(index) {
            Some(time) => write!(writer, "{time},{temperature},{output}")?,
            None => write!(writer, ",{temperature},{output}")?,
        }
        if let Some(reference) = reference {
            match reference.get(index) {
                Some(value) => write!(writer, ",{value}")?,
                None => write!(writer, ",")?,
            }
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the result to `path` in the requested format, creating parent directories
pub fn write_to_path(
    path: &Path,
    format: OutputFormat,
    summary: &RunSummary,
    result: &SimulationResult,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => write_json(writer, summary, result),
        OutputFormat::Csv => write_csv(writer, result),
    }
    .with_context(|| format!("writing {format} output to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PidParameters, SimulationConfig, ThermalParameters};
    use crate::simulation::{run, ReferenceCurve, SimulationEngine};

    fn small_result() -> SimulationResult {
        let config = SimulationConfig::new(1.0, 2.0, 20.0);
        let pid = PidParameters::new(1.0, 0.0, 0.0, 18.0);
        let thermal = ThermalParameters::default().with_max_actuator_energy(0.0);
        run(&config, &pid, &thermal).unwrap()
    }

    #[test]
    fn test_summary() {
        let result = small_result();
        let summary = RunSummary::from_result(&result);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.final_time, Some(2.0));
        assert_eq!(summary.final_temperature, Some(20.0));
        assert_eq!(summary.min_temperature, Some(20.0));
        assert_eq!(summary.peak_output, Some(2.0));
        assert_eq!(summary.mean_output, Some(2.0));
    }

    #[test]
    fn test_csv_rows() {
        let result = small_result();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &result).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "time,temperature,output",
                "0,20,2",
                "1,20,2",
                "2,20,2",
                ",20,2",
            ]
        );
    }

    #[test]
    fn test_csv_with_reference_column() {
        let result = SimulationEngine::new(
            SimulationConfig::new(1.0, 1.0, 20.0),
            PidParameters::gentle(),
            ThermalParameters::default(),
        )
        .with_initial_condition(Box::new(ReferenceCurve::default()))
        .run()
        .unwrap();

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &result).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "time,temperature,output,reference");
        assert!(lines[1].starts_with("0,20.3,"));
        assert!(lines[1].ends_with(",20.3"));
        assert!(lines[3].ends_with(','));
    }

    #[test]
    fn test_json_contains_summary_and_series() {
        let result = small_result();
        let summary = RunSummary::from_result(&result);
        let mut buffer = Vec::new();
        write_json(&mut buffer, &summary, &result).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["summary"]["steps"], 3);
        assert_eq!(value["time"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["temperature"].as_array().map(Vec::len), Some(4));
        assert!(value.get("reference").is_none());
    }

    #[test]
    fn test_write_to_path_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.csv");
        let result = small_result();
        let summary = RunSummary::from_result(&result);

        write_to_path(&path, OutputFormat::Csv, &summary, &result).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("time,temperature,output\n"));
    }
}
