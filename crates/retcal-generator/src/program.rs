//! Program assembly and output
//!
//! [`CalibrationGenerator`] stitches the header, start sequence, raft,
//! tower sections and end sequence into one [`CalibrationProgram`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use retcal_core::{CalibrationConfig, CalibrationResult, GcodeLine};
use tracing::info;

use crate::header::generate_header;
use crate::raft::generate_raft;
use crate::sequences::{end_sequence, start_sequence};
use crate::tower::TowerGenerator;

/// A complete, ordered calibration program
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProgram {
    lines: Vec<GcodeLine>,
}

impl CalibrationProgram {
    pub fn lines(&self) -> &[GcodeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of layer marker comments, raft layers included
    pub fn layer_count(&self) -> usize {
        self.lines
            .iter()
            .filter_map(GcodeLine::as_comment)
            .filter(|text| is_layer_marker(text))
            .count()
    }

    /// Render the program, one newline-terminated line per command
    pub fn to_gcode(&self) -> String {
        let mut gcode = String::new();
        for line in &self.lines {
            gcode.push_str(&line.to_string());
            gcode.push('\n');
        }
        gcode
    }

    /// Write the rendered program to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CalibrationResult<()> {
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the program to a file, replacing any existing content
    pub fn save(&self, path: &Path) -> CalibrationResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        info!(path = %path.display(), lines = self.len(), "Calibration program saved");
        Ok(())
    }
}

impl IntoIterator for CalibrationProgram {
    type Item = GcodeLine;
    type IntoIter = std::vec::IntoIter<GcodeLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

fn is_layer_marker(text: &str) -> bool {
    text.strip_prefix("Layer ")
        .is_some_and(|n| n.parse::<u32>().is_ok())
}

/// Generator for retraction calibration programs
pub struct CalibrationGenerator {
    config: CalibrationConfig,
}

impl CalibrationGenerator {
    /// Create a new CalibrationGenerator with the given parameters
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Generate the full program.
    ///
    /// Fails before emitting anything if the configuration is invalid.
    pub fn generate(&self) -> CalibrationResult<CalibrationProgram> {
        let config = &self.config;
        config.validate()?;
        let tower = TowerGenerator::new(config)?;

        let mut gcode = generate_header(config);
        gcode.extend(start_sequence(config));
        let raft_filament = generate_raft(config, &mut gcode)?;

        gcode.push(GcodeLine::relative_extrusion());
        gcode.push(GcodeLine::relative_positioning());
        let next_layer = tower.generate(&mut gcode);

        gcode.extend(end_sequence());

        info!(
            sections = config.num_tests,
            tower_layers = config.total_layers(),
            last_layer = next_layer - 1,
            raft_filament_mm = raft_filament,
            lines = gcode.len(),
            "Calibration program generated"
        );

        Ok(CalibrationProgram { lines: gcode })
    }
}

/// Generate the program for `config`
pub fn generate(config: &CalibrationConfig) -> CalibrationResult<CalibrationProgram> {
    CalibrationGenerator::new(config.clone()).generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_marker_detection() {
        assert!(is_layer_marker("Layer 12"));
        assert!(!is_layer_marker("Layer"));
        assert!(!is_layer_marker(" Start Movement"));
        assert!(!is_layer_marker("Layers per test"));
    }

    #[test]
    fn test_mode_switch_precedes_tower() {
        let config = CalibrationConfig {
            num_tests: 1,
            layers_per_test: 1,
            ..Default::default()
        };
        let program = generate(&config).unwrap();
        let lines: Vec<String> = program.lines().iter().map(ToString::to_string).collect();
        let fan = lines.iter().position(|l| l.starts_with("M106")).unwrap();
        assert_eq!(lines[fan - 2], "M83");
        assert_eq!(lines[fan - 1], "G91");
    }

    #[test]
    fn test_write_to_matches_to_gcode() {
        let program = generate(&CalibrationConfig::default()).unwrap();
        let mut buffer = Vec::new();
        program.write_to(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), program.to_gcode());
    }

    #[test]
    fn test_invalid_config_yields_no_program() {
        let config = CalibrationConfig {
            filament_diameter: 0.0,
            ..Default::default()
        };
        let err = generate(&config).unwrap_err();
        assert!(err.to_string().contains("filament_diameter"));
    }
}
