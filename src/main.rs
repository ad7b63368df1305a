use anyhow::{Context, Result};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use nutri_tally::aggregator::{Aggregator, MealId};
use nutri_tally::catalog::Catalog;
use nutri_tally::cli::{parse_args, Command};
use nutri_tally::config::AppConfig;
use nutri_tally::data_loader::{load_ingredients_csv, parse_entries_json, parse_meals_json, parse_rda_json};
use nutri_tally::display::{round_for_display, round_percentages, DisplayPercentage, DisplayVector, MacroBreakdown};
use nutri_tally::nutrients::NutrientKey;
use nutri_tally::rda::{percent_of, RdaTable};
use nutri_tally::rollup::{rollup, rollup_kind};

fn init_tracing(config: &AppConfig) {
    if config.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(config.log_filter.as_str())
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(config.log_filter.as_str())
            .init();
    }
}

async fn load_rda_table(path: Option<&Path>) -> Result<RdaTable> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read RDA table '{}'", path.display()))?;
            let table = parse_rda_json(&raw)?;
            tracing::info!(rows = table.len(), path = %path.display(), "loaded RDA table");
            Ok(table)
        }
        None => Ok(RdaTable::standard().clone()),
    }
}

fn print_vector(shown: &DisplayVector) {
    for key in NutrientKey::ALL {
        if let Some(value) = shown.get(*key) {
            println!("  {:<24} {:>10} {}", key.label(), value, key.unit());
        }
    }
}

fn print_percentages(rows: &BTreeMap<NutrientKey, DisplayPercentage>) {
    for row in rows.values() {
        println!("  {:<24} {:>7.1}%  {}", row.label, row.percent, row.severity);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config);
    let cli_args = parse_args();

    let ingredients = load_ingredients_csv(Path::new(&cli_args.ingredients))
        .with_context(|| format!("Failed to load ingredients from '{}'", cli_args.ingredients))?;
    let meals = match &cli_args.meals {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read meals file '{}'", path))?;
            parse_meals_json(&raw)?
        }
        None => Vec::new(),
    };
    let catalog = Catalog::from_parts(ingredients, meals);
    tracing::info!(
        ingredients = catalog.ingredient_count(),
        meals = catalog.meal_count(),
        "catalog ready"
    );

    let rda_path = cli_args
        .rda
        .as_deref()
        .map(Path::new)
        .or(config.rda_table_path.as_deref());
    let rda_table = load_rda_table(rda_path).await?;

    match cli_args.command {
        Command::Rollup { entries, by, kind, json } => {
            let raw = fs::read_to_string(&entries)
                .await
                .with_context(|| format!("Failed to read entries file '{}'", entries))?;
            let entries = parse_entries_json(&raw)?;
            let bucketing = by.unwrap_or(config.default_bucketing);

            let report = match kind {
                Some(kind) => rollup_kind(&catalog, &entries, bucketing, kind.into())?,
                None => rollup(&catalog, &entries, bucketing)?,
            };

            if json {
                let buckets: Vec<_> = report
                    .iter()
                    .map(|bucket| {
                        json!({
                            "bucket_key": bucket.bucket_key,
                            "entry_count": bucket.entry_count,
                            "day_count": bucket.day_count,
                            "total": round_for_display(&bucket.total),
                            "rda_daily_average": round_percentages(&percent_of(&bucket.daily_average(), &rda_table)),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&buckets)?);
            } else {
                if report.is_empty() {
                    println!("No entries to report.");
                }
                for bucket in &report {
                    println!(
                        "\n{} ({}, {} entries over {} days)",
                        bucket.bucket_key, bucketing, bucket.entry_count, bucket.day_count
                    );
                    print_vector(&round_for_display(&bucket.total));
                    println!("  RDA coverage (daily average):");
                    print_percentages(&round_percentages(&percent_of(&bucket.daily_average(), &rda_table)));
                }
            }
        }
        Command::Meal { id, portions, json } => {
            let aggregator = Aggregator::new(&catalog);
            let total = aggregator.meal(MealId(id), portions)?;
            let profile = aggregator.meal_profile(MealId(id))?;
            let split = MacroBreakdown::from_vector(&total);
            let rda_rows = round_percentages(&percent_of(&total, &rda_table));

            if json {
                let out = json!({
                    "meal_id": id,
                    "portions": portions,
                    "total": round_for_display(&total),
                    "portion_mass_g": profile.total_mass_g,
                    "per_100g": profile.per_100g.as_ref().map(round_for_display),
                    "macro_breakdown": split,
                    "rda": rda_rows,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("Meal {} x {} portion(s):", id, portions);
                print_vector(&round_for_display(&total));
                if let Some(per_100g) = &profile.per_100g {
                    println!("Per 100 g ({:.1} g per portion):", profile.total_mass_g);
                    print_vector(&round_for_display(per_100g));
                }
                if let Some(split) = split {
                    println!(
                        "Energy split: protein {:.1}%, carbs {:.1}%, fat {:.1}%",
                        split.protein_percent, split.carbs_percent, split.fat_percent
                    );
                }
                println!("RDA coverage:");
                print_percentages(&rda_rows);
            }
        }
    }

    Ok(())
}
