//! Output formatting and logging utilities

use color_eyre::eyre::Result;
use scf::{Molecule, ScfResult, ScfStatus};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock HH:MM:SS timestamps for log lines
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let secs = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write!(w, "{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
    }
}

/// Send the log to `output_path` if given, stdout otherwise
pub fn setup_output(output_path: Option<&String>) {
    match output_path.map(|path| (path, File::create(path))) {
        Some((path, Ok(log))) => {
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            Registry::default().with(file_layer).init();
            info!("Output will be written to: {}", path);
        }
        Some((path, Err(err))) => {
            eprintln!("Could not create output file {}: {}", path, err);
            stdout_logging();
        }
        None => stdout_logging(),
    }
}

fn stdout_logging() {
    let stdout_layer = layer()
        .with_writer(std::io::stdout)
        .with_timer(SecondPrecisionTimer)
        .with_ansi(true);
    Registry::default().with(stdout_layer).init();
}

/// Geometry (bohr), energies and orbital levels of a finished run
pub fn write_summary<W: Write>(
    writer: &mut W,
    molecule: &Molecule,
    result: &ScfResult,
) -> Result<()> {
    writeln!(writer, "Geometry (bohr):")?;
    for (i, atom) in molecule.atoms.iter().enumerate() {
        writeln!(
            writer,
            "  Atom {}: {} at [{:.6}, {:.6}, {:.6}]",
            i + 1,
            atom.element.get_symbol(),
            atom.position.x,
            atom.position.y,
            atom.position.z
        )?;
    }
    let status = match result.status {
        ScfStatus::Converged => "converged",
        ScfStatus::IterationLimitExceeded => "NOT converged",
    };
    writeln!(writer, "SCF {} after {} cycles", status, result.iterations)?;
    writeln!(writer, "Nuclear repulsion: {:.10} au", result.nuclear_repulsion)?;
    writeln!(writer, "Electronic energy: {:.10} au", result.electronic_energy)?;
    writeln!(writer, "Total energy: {:.10} au", result.total_energy)?;
    writeln!(writer, "Orbital energies (au):")?;
    for (i, e) in result.orbital_energies.iter().enumerate() {
        let occ = if i < result.num_occupied { 2 } else { 0 };
        writeln!(writer, "  {:>3} {:>14.8} occ {}", i + 1, e, occ)?;
    }
    Ok(())
}
