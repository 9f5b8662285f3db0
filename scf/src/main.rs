//! Restricted Hartree-Fock command-line driver
//!
//! Reads a YAML job (geometry, basis, SCF parameters), applies command-line
//! overrides, runs the SCF and logs the result.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::ScfApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    ScfApplication::from_cli()?.run()
}
