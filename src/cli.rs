use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "contactfinder")]
#[command(about = "Enriches board addresses with property-owner phone and email contacts")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/contactfinder.toml
    #[arg(long)]
    pub init: bool,

    /// Path to an alternate configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Board to pull address items from (overrides config)
    #[arg(short, long)]
    pub board: Option<String>,

    /// Maximum number of board items to process (overrides config)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output file path for the JSON report (overrides config)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Run the property search in paid mode. Off by default; the free mode
    /// may return no results for some addresses.
    #[arg(long)]
    pub purchase: bool,

    /// Verbose logging (use -v for detailed steps, -vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
