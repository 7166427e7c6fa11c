// shelfscore/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shelfscore")]
#[command(about = "Retail KPI pipeline: data health, promotions, price index", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct CommonArgs {
    /// Input transaction table (CSV)
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output directory (created if absent)
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Optional scoring configuration file (shelfscore.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rows shown in the terminal preview of the primary output
    #[arg(long, default_value = "5")]
    pub preview: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🩺 Computes data health scores by store and by supplier
    DataQuality {
        #[command(flatten)]
        common: CommonArgs,

        /// Realised prices further than this factor from RRP are extreme
        #[arg(long)]
        extreme_price_factor: Option<f64>,
    },

    /// 🏷️  Detects promotions and computes uplift/coverage/price deltas
    Promos {
        #[command(flatten)]
        common: CommonArgs,

        /// Discount fraction below RRP that makes a day promotional
        #[arg(long)]
        promo_discount_threshold: Option<f64>,

        /// Minimum promo days before a store/item pair is on promotion
        #[arg(long)]
        promo_min_days: Option<u32>,
    },

    /// ⚖️  Computes the target-vs-peers price index (segments + roll-up)
    Pricing {
        #[command(flatten)]
        common: CommonArgs,

        /// Case-insensitive substring matching the target supplier
        #[arg(long)]
        target_supplier: Option<String>,
    },

    /// 🚀 Runs all stages over the same input
    RunAll {
        #[command(flatten)]
        common: CommonArgs,

        #[arg(long)]
        extreme_price_factor: Option<f64>,

        #[arg(long)]
        promo_discount_threshold: Option<f64>,

        #[arg(long)]
        promo_min_days: Option<u32>,

        #[arg(long)]
        target_supplier: Option<String>,
    },
}
