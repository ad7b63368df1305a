use clap::{Parser, Subcommand, ValueEnum};

use crate::entry::EntryKind;
use crate::rollup::Bucketing;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the ingredient table (CSV, values per 100 g)
    #[arg(short, long)]
    pub ingredients: String,

    /// Path to a JSON list of stored meals
    #[arg(short, long)]
    pub meals: Option<String>,

    /// Path to a JSON RDA table replacing the built-in one
    #[arg(long)]
    pub rda: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Totals and RDA coverage per day, week or month
    Rollup {
        /// Path to a JSON list of diary/planner entries
        #[arg(short, long)]
        entries: String,

        /// Bucket size; defaults to NUTRI_DEFAULT_BUCKETING or `day`
        #[arg(short, long, value_enum)]
        by: Option<Bucketing>,

        /// Only include entries of this kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
    /// Nutrient profile of one stored meal
    Meal {
        #[arg(long)]
        id: i64,

        #[arg(short, long, default_value_t = 1.0)]
        portions: f64,

        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Diary,
    Planned,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Diary => EntryKind::Diary,
            KindArg::Planned => EntryKind::Planned,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rollup_command() {
        let cli = Cli::try_parse_from([
            "nutri_tally",
            "--ingredients",
            "foods.csv",
            "rollup",
            "--entries",
            "diary.json",
            "--by",
            "week",
            "--kind",
            "planned",
        ])
        .unwrap();
        assert_eq!(cli.ingredients, "foods.csv");
        match cli.command {
            Command::Rollup { entries, by, kind, json } => {
                assert_eq!(entries, "diary.json");
                assert_eq!(by, Some(Bucketing::Week));
                assert_eq!(kind.map(EntryKind::from), Some(EntryKind::Planned));
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_meal_portions_default_to_one() {
        let cli = Cli::try_parse_from(["nutri_tally", "-i", "foods.csv", "-m", "meals.json", "meal", "--id", "4"]).unwrap();
        match cli.command {
            Command::Meal { id, portions, .. } => {
                assert_eq!(id, 4);
                assert_eq!(portions, 1.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
