// shelfscore/src/main.rs

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};
use commands::run_all::Overrides;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup Logging (Tracing)
    // RUST_LOG=debug shelfscore run-all ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::DataQuality {
            common,
            extreme_price_factor,
        } => commands::data_quality::execute(common, extreme_price_factor),

        Commands::Promos {
            common,
            promo_discount_threshold,
            promo_min_days,
        } => commands::promos::execute(common, promo_discount_threshold, promo_min_days),

        Commands::Pricing {
            common,
            target_supplier,
        } => commands::pricing::execute(common, target_supplier),

        Commands::RunAll {
            common,
            extreme_price_factor,
            promo_discount_threshold,
            promo_min_days,
            target_supplier,
        } => {
            commands::run_all::execute(
                common,
                Overrides {
                    extreme_price_factor,
                    promo_discount_threshold,
                    promo_min_days,
                    target_supplier,
                },
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("\n💥 CRITICAL PIPELINE ERROR: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
