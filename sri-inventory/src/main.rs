use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = sri_inventory::args::normalize_args(std::env::args());
    let cli = sri_inventory::cli::Cli::parse_from(args);
    cli.init_tracing();
    cli.execute()
}
