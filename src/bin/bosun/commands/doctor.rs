//! `bosun doctor` command

use anyhow::Result;

use bosun::ops::doctor::DoctorReport;
use bosun::util::config::OrchestratorConfig;

use crate::cli::DoctorArgs;

pub fn execute(args: DoctorArgs) -> Result<()> {
    let config = OrchestratorConfig::load_layered(&args.project_dir);
    let report = DoctorReport::run(&config, &args.project_dir);

    print!("{}", report.format());

    // Exit with error code if required checks failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
