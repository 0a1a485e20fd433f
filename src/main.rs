//! `rabbitmq-provisioner` command line entry point

use clap::Parser;

mod cli;

use cli::Cli;
use rabbitmq_provisioner::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init_tracing(cli.verbose);

    cli.run().await
}
