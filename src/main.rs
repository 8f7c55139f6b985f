use clap::Parser;
use color_eyre::Result;
use tps_history::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    init_logging(args.verbose)?;
    App::new(Config::new(args)?)?.run().await
}
