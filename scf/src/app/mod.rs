mod geometry;
mod report;
mod runner;

pub use geometry::build_molecule;
pub use runner::run_restricted;

use self::report::report_summary;
use crate::config::{Args, Config};
use crate::io::{setup_output, write_summary};
use basis::library::builtin;
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs::{self, File};
use tracing::{info, warn};

pub struct ScfApplication {
    args: Args,
    config: Config,
}

impl ScfApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded from {}:\n{:?}", self.args.config_file, self.config);

        let charge = self.config.charge(&self.args);
        let molecule = build_molecule(&self.config, charge)?;

        let basis_name = self.config.basis_name();
        let library =
            builtin(basis_name).ok_or_else(|| eyre!("Unknown basis set: {}", basis_name))?;
        let basis = molecule
            .build_basis(library.as_ref())
            .wrap_err_with(|| format!("Unable to build {} basis", basis_name))?;
        info!(
            "Basis {}: {} functions in {} shells, highest l = {}",
            basis.name,
            basis.len(),
            basis.shells().len(),
            basis.max_angular_momentum()
        );

        let result = run_restricted(&molecule, &basis, &self.config.scf_params)?;
        report_summary(&result);
        if !result.is_converged() {
            warn!(
                "SCF did not converge within {} cycles; reported energies are from the last cycle",
                result.iterations
            );
        }

        if let Some(path) = &self.args.summary {
            let mut file = File::create(path)
                .wrap_err_with(|| format!("Unable to create summary file: {}", path))?;
            write_summary(&mut file, &molecule, &result)?;
            info!("Summary written to {}", path);
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let mut config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();
    config.scf_params = config.scf_params.override_with(args);

    Ok(config)
}
