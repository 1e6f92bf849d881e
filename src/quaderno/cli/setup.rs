use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use quaderno::coerce::parse_decimal_arg;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Returns the version string, including the git hash for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("QUADERNO_GIT_HASH");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

/// Accepts `2024-05-02` and `02/05/2024`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("'{}' is not a date (use YYYY-MM-DD or DD/MM/YYYY)", raw))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Parser, Debug)]
#[command(name = "quaderno", bin_name = "quaderno", version = get_version())]
#[command(about = "Farm logbook: treatments, fertilizations and warehouse stock", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Operate on the global logbook
    #[arg(short, long, global = true, help_heading = "Options")]
    pub global: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Warehouse stock
    #[command(subcommand)]
    Stock(StockCommands),

    /// Draw a product out of stock
    Consume {
        product: String,
        #[arg(value_parser = parse_decimal_arg, allow_negative_numbers = true)]
        quantity: Decimal,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        lot: Option<String>,
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Pesticide treatments
    #[command(subcommand)]
    Treatment(ApplicationCommands),

    /// Fertilizations
    #[command(subcommand)]
    Fertilization(ApplicationCommands),

    /// Record a manual return
    Return {
        product: String,
        #[arg(value_parser = parse_decimal_arg)]
        quantity: Decimal,
        #[arg(long, default_value = "")]
        lot: String,
        #[arg(long)]
        unit: Option<String>,
        /// Goods leave the warehouse (e.g. back to the supplier)
        #[arg(long)]
        out: bool,
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Show the movement log
    Movements {
        /// Only products whose name contains this text
        #[arg(long)]
        product: Option<String>,
        /// Only movements on or after this date
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
    },

    /// Company profile
    #[command(subcommand)]
    Company(CompanyCommands),

    /// Archive all data files into a .tar.gz
    Export {
        /// Directory to write the archive to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Check data files for problems
    Doctor,

    /// Create the data directory
    Init,

    /// Get or set configuration values
    Config {
        /// Configuration key (default-unit, default-operator)
        key: Option<String>,
        /// Value to set
        value: Option<String>,
    },
}

/// Date, operator and note shared by every logged change.
#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    /// Defaults to today
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// Defaults to the configured default-operator
    #[arg(long, default_value = "")]
    pub operator: String,
    #[arg(long, default_value = "")]
    pub note: String,
}

impl EntryArgs {
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(today)
    }
}

#[derive(Args, Debug, Clone)]
pub struct StockArgs {
    pub product: String,
    #[arg(value_parser = parse_decimal_arg, allow_negative_numbers = true)]
    pub quantity: Decimal,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long, default_value = "")]
    pub lot: String,
    /// Unit cost
    #[arg(long, value_parser = parse_decimal_arg, default_value = "0")]
    pub cost: Decimal,
}

#[derive(Subcommand, Debug)]
pub enum StockCommands {
    /// Add to a stock line, creating it if needed
    Add(StockArgs),
    /// Overwrite a stock line
    Set(StockArgs),
    /// List stock lines with their value
    List {
        /// Only products whose name contains this text
        filter: Option<String>,
    },
    /// Move a stock line to a new lot or unit
    Relabel {
        product: String,
        #[arg(long, default_value = "")]
        lot: String,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        new_lot: Option<String>,
        #[arg(long)]
        new_unit: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApplicationCommands {
    /// Record an application and draw the product from stock
    Add(ApplicationArgs),
    /// List recorded applications
    List,
}

#[derive(Args, Debug, Clone)]
pub struct ApplicationArgs {
    /// Field or plot name
    #[arg(long)]
    pub field: String,
    #[arg(long)]
    pub product: String,
    /// Dose per hectare (L/ha for treatments, kg/ha for fertilizations)
    #[arg(long, value_parser = parse_decimal_arg)]
    pub dose: Decimal,
    #[arg(long, value_parser = parse_decimal_arg)]
    pub hectares: Decimal,
    #[arg(long, default_value = "")]
    pub lot: String,
    #[arg(long, default_value = "")]
    pub unit: String,
    #[command(flatten)]
    pub entry: EntryArgs,
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    Show,
    /// Update the given fields, keeping the rest
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        vat: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(parse_date("2024-05-02").unwrap(), expected);
        assert_eq!(parse_date("02/05/2024").unwrap(), expected);
        assert!(parse_date("ieri").is_err());
    }

    #[test]
    fn test_consume_accepts_comma_decimal() {
        let cli = Cli::try_parse_from(["quaderno", "consume", "Urea", "2,5", "--unit", "kg"]).unwrap();
        match cli.command {
            Commands::Consume { quantity, unit, .. } => {
                assert_eq!(quantity, dec!(2.5));
                assert_eq!(unit.as_deref(), Some("kg"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["quaderno", "stock", "list", "--global"]).unwrap();
        assert!(cli.global);
    }

    #[test]
    fn test_treatment_add_requires_field() {
        let err = Cli::try_parse_from([
            "quaderno", "treatment", "add", "--product", "Rame", "--dose", "1", "--hectares", "1",
        ]);
        assert!(err.is_err());
    }
}
