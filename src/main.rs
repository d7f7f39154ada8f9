// src/main.rs

use kicheck::errors::exit_codes;
use kicheck::{cli, logging};

fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level, args.verbose) {
        eprintln!("kicheck error: {err:?}");
        std::process::exit(exit_codes::INTERNAL_ERROR);
    }

    if let Err(err) = kicheck::run(args) {
        tracing::error!("{err}");
        std::process::exit(err.exit_code());
    }
}
