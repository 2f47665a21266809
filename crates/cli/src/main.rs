use clap::Parser;
use stac_entity_cli::StacEntity;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = StacEntity::parse();
    match args.run(true) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
