use color_eyre::Result;
use structopt::StructOpt;
use subgraph_wizard::cli::{self, Cli};
use subgraph_wizard::logging::{debug_enabled, setup_logging};
use tracing::error;

fn main() -> Result<()> {
    setup_logging();
    color_eyre::install()?;

    let cli = Cli::from_args();
    if let Err(err) = cli::run(cli) {
        let code = err.exit_code();
        if err.is_known() {
            eprintln!("{}", err);
        } else if debug_enabled() {
            error!("Unexpected error");
            return Err(color_eyre::Report::new(err));
        } else {
            eprintln!("Unexpected error: {}", err);
            eprintln!("Set DEBUG=1 for full details.");
        }
        std::process::exit(code);
    }
    Ok(())
}
