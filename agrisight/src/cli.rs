// agrisight/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use agrisight_core::domain::filter::{DateRange, InsuredStatus, SurveyFilter};
use agrisight_core::domain::kpi::GroupOrder;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agrisight")]
#[command(about = "Farmer survey quality checks & insurance KPIs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the survey comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Raw survey CSV (defaults to `input` in agrisight.yaml, else a synthetic survey)
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

/// Dashboard selection, shared by `kpi`, `dashboard` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only this country (repeatable)
    #[arg(long = "country", value_name = "COUNTRY")]
    pub countries: Vec<String>,

    /// Keep only this region (repeatable)
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Keep only this crop (repeatable)
    #[arg(long = "crop", value_name = "CROP")]
    pub crops: Vec<String>,

    /// First survey date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last survey date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Insurance status: all | yes | no
    #[arg(long, default_value = "all")]
    pub insured: InsuredStatus,
}

impl FilterArgs {
    pub fn to_filter(&self) -> SurveyFilter {
        SurveyFilter {
            countries: self.countries.iter().cloned().collect(),
            regions: self.regions.iter().cloned().collect(),
            crops: self.crops.iter().cloned().collect(),
            date_range: DateRange {
                start: self.from,
                end: self.to,
            },
            insured: self.insured,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Region,
    Agent,
    Country,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Highest claim rate first
    Risk,
    /// Most records first
    Volume,
    /// Alphabetical
    Key,
}

impl From<OrderBy> for GroupOrder {
    fn from(order: OrderBy) -> Self {
        match order {
            OrderBy::Risk => GroupOrder::RiskRanking,
            OrderBy::Volume => GroupOrder::Volume,
            OrderBy::Key => GroupOrder::Key,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🎲 Writes a synthetic raw survey CSV
    Generate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Number of records (overrides the config)
        #[arg(long)]
        records: Option<usize>,

        /// Random seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: <target>/raw_survey.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 🔎 Applies the SOP quality rules and writes flagged + cleaned CSVs
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (default: <target>)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// 📊 Prints the KPI card and a grouped breakdown
    Kpi {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Breakdown dimension
        #[arg(long, value_enum, default_value = "region")]
        by: GroupBy,

        /// Breakdown ordering
        #[arg(long, value_enum, default_value = "risk")]
        order: OrderBy,
    },

    /// 🖥️  Renders the HTML dashboard for a selection
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file (default: <target>/dashboard.html)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 📤 Exports the filtered clean / flagged tables and KPI breakdowns
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output directory (default: <target>/exports)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// 🚀 Runs the full pipeline (generate/read -> check -> KPIs -> artifacts)
    Run {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// 🧹 Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["agrisight", "run"]);
        match args.command {
            Commands::Run { source } => {
                assert_eq!(source.project_dir.to_string_lossy(), ".");
                assert_eq!(source.input, None);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_generate() -> Result<()> {
        let args = Cli::parse_from(["agrisight", "generate", "--records", "250", "--seed", "9"]);
        match args.command {
            Commands::Generate { records, seed, output, .. } => {
                assert_eq!(records, Some(250));
                assert_eq!(seed, Some(9));
                assert_eq!(output, None);
                Ok(())
            }
            _ => bail!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_kpi_filters() -> Result<()> {
        let args = Cli::parse_from([
            "agrisight", "kpi", "--country", "Kenya", "--country", "Zambia", "--region", "Nyanza",
            "--from", "2025-02-01", "--to", "2025-03-31", "--insured", "yes", "--by", "agent",
            "--order", "volume",
        ]);
        match args.command {
            Commands::Kpi { filter, by, order, .. } => {
                let f = filter.to_filter();
                assert_eq!(f.countries.len(), 2);
                assert!(f.regions.contains("Nyanza"));
                assert_eq!(f.date_range.start, NaiveDate::from_ymd_opt(2025, 2, 1));
                assert_eq!(f.insured, InsuredStatus::Yes);
                assert_eq!(by, GroupBy::Agent);
                assert_eq!(GroupOrder::from(order), GroupOrder::Volume);
                Ok(())
            }
            _ => bail!("Expected Kpi command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_filter_values() {
        assert!(Cli::try_parse_from(["agrisight", "export", "--insured", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["agrisight", "export", "--from", "March"]).is_err());
    }

    #[test]
    fn test_default_filter_is_unconstrained() -> Result<()> {
        let args = Cli::parse_from(["agrisight", "dashboard"]);
        match args.command {
            Commands::Dashboard { filter, .. } => {
                assert!(filter.to_filter().is_unconstrained());
                Ok(())
            }
            _ => bail!("Expected Dashboard command"),
        }
    }
}
