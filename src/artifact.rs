use crate::engine::{EngineError, ErrorCode, SelectedPromoter, now_unix_secs};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const BODY_HEADER: [&str; 2] = ["Promoter Sequences", "Promoter Strength"];

/// Artifact names are a pure function of the request parameters and a
/// one-second-resolution wall clock. Two identical requests within the same
/// second produce the same name and the later write wins; this is a known
/// limitation, not corrected here.
pub fn artifact_name(target_strength: f64, count: usize, unix_secs: u64) -> String {
    format!("target_{target_strength}_{count}_{unix_secs}.csv")
}

/// Writes the selection to `<output_dir>/<artifact_name>`: one header line
/// with the project label, then a two-column CSV body with strengths at two
/// decimal places. Returns the artifact name. The output directory must
/// already exist.
pub fn write_selection(
    output_dir: &str,
    project_name: &str,
    target_strength: f64,
    count: usize,
    selection: &[SelectedPromoter],
) -> Result<String, EngineError> {
    let name = artifact_name(target_strength, count, now_unix_secs());
    let path = Path::new(output_dir).join(&name);

    let mut file = File::create(&path).map_err(|e| EngineError {
        code: ErrorCode::Io,
        message: format!("Could not create selection file '{}': {e}", path.display()),
    })?;
    writeln!(file, "Project name: {project_name}").map_err(|e| EngineError {
        code: ErrorCode::Io,
        message: format!("Could not write selection file '{}': {e}", path.display()),
    })?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(BODY_HEADER).map_err(|e| csv_error(&name, e))?;
    for promoter in selection {
        wtr.write_record([
            promoter.sequence.as_str(),
            format!("{:.2}", promoter.strength).as_str(),
        ])
        .map_err(|e| csv_error(&name, e))?;
    }
    wtr.flush().map_err(|e| EngineError {
        code: ErrorCode::Io,
        message: format!("Could not flush selection file '{name}': {e}"),
    })?;

    Ok(name)
}

fn csv_error(name: &str, e: csv::Error) -> EngineError {
    EngineError {
        code: ErrorCode::Io,
        message: format!("Could not write selection file '{name}': {e}"),
    }
}
