use hdkeys_core::log::init_logger;
use hdkeys_lib::{args::parse_args, commands::run};
use log::error;

pub fn main() {
    let args = parse_args();

    if let Err(err) = init_logger(args.log_level.as_deref()) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    match run(&args) {
        Ok(report) => print!("{report}"),
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
