use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::aggregator::{Ingredient, IngredientId, Meal};
use crate::entry::Entry;
use crate::nutrients::{NutrientKey, NutrientVector};
use crate::rda::RdaTable;

const ID_COL: &str = "id";
const NAME_COL: &str = "name";
const CATEGORY_COL: &str = "category";

fn parse_optional_f64(s: &str) -> Result<Option<f64>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|e| anyhow!("'{}' is not a number: {}", trimmed, e))
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| anyhow!("Column '{}' not found", name))
}

/// Reads an ingredient table from CSV.
///
/// Expected columns are `id`, `name`, `category`, the four macros, and any
/// number of vitamin/mineral columns named by their nutrient key. Values are
/// per 100 g. An empty micronutrient cell means "unknown"; an empty macro cell
/// is an error. Columns that are not nutrient keys are skipped with a warning.
pub fn load_ingredients_csv(csv_path: &Path) -> Result<Vec<Ingredient>> {
    if !csv_path.exists() {
        return Err(anyhow!("Ingredient CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open ingredient CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = rdr.headers()?.clone();

    let id_idx = column(&headers, ID_COL)?;
    let name_idx = column(&headers, NAME_COL)?;
    let category_idx = column(&headers, CATEGORY_COL)?;

    let mut nutrient_cols: Vec<(usize, NutrientKey)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == id_idx || idx == name_idx || idx == category_idx {
            continue;
        }
        match header.parse::<NutrientKey>() {
            Ok(key) => nutrient_cols.push((idx, key)),
            Err(e) => tracing::warn!(column = header, error = %e, "ignoring ingredient CSV column"),
        }
    }
    for key in NutrientKey::ALL.iter().filter(|k| k.is_macro()) {
        if !nutrient_cols.iter().any(|(_, k)| k == key) {
            return Err(anyhow!("Column '{}' not found", key.as_str()));
        }
    }

    let mut ingredients = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let id = record
            .get(id_idx)
            .unwrap_or_default()
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Invalid ingredient id at row {}", row_index))?;
        let name = record.get(name_idx).unwrap_or_default().trim().to_string();
        let category = record.get(category_idx).unwrap_or_default().trim().to_string();

        let mut per_100g = NutrientVector::zero();
        for &(idx, key) in &nutrient_cols {
            let value = parse_optional_f64(record.get(idx).unwrap_or_default())
                .with_context(|| format!("Invalid {} for ingredient {} at row {}", key, id, row_index))?;
            if key.is_macro() && value.is_none() {
                return Err(anyhow!("Missing {} for ingredient {} at row {}", key, id, row_index));
            }
            per_100g.set(key, value);
        }
        per_100g
            .validate()
            .with_context(|| format!("Ingredient {} at row {}", id, row_index))?;

        ingredients.push(Ingredient {
            id: IngredientId(id),
            name,
            category,
            per_100g,
        });
    }

    if ingredients.is_empty() {
        return Err(anyhow!("No ingredients loaded from {:?}", csv_path));
    }

    tracing::info!(count = ingredients.len(), path = ?csv_path, "loaded ingredient table");
    Ok(ingredients)
}

pub fn parse_meals_json(json: &str) -> Result<Vec<Meal>> {
    serde_json::from_str(json).context("Failed to parse meals document")
}

pub fn parse_entries_json(json: &str) -> Result<Vec<Entry>> {
    serde_json::from_str(json).context("Failed to parse entries document")
}

#[derive(Debug, Deserialize)]
struct RawRdaValue {
    value: f64,
    #[serde(default)]
    label: Option<String>,
}

/// Parses an RDA table document: `{ "<nutrientKey>": { "value": .., "label": .. } }`.
///
/// Keys that are not known nutrients are skipped with a warning so that newer
/// documents keep loading. Invalid reference values are an error.
pub fn parse_rda_json(json: &str) -> Result<RdaTable> {
    let raw: BTreeMap<String, RawRdaValue> =
        serde_json::from_str(json).context("Failed to parse RDA table document")?;

    let mut table = RdaTable::new();
    for (name, entry) in raw {
        let key = match name.parse::<NutrientKey>() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "skipping RDA table row");
                continue;
            }
        };
        table
            .insert(key, entry.value, entry.label)
            .with_context(|| format!("Invalid RDA value for '{}'", name))?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv_file() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,category,proteins,carbs,fats,calories,vitaminC,iron,omega3")?;
        writeln!(file, "1,Apple,fruit,0.3,13.8,0.2,52,4.6,0.1,")?;
        writeln!(file, "2,Banana,fruit,1.1,22.8,0.3,89,,0.3,")?;
        writeln!(file, "3,Cucumber,vegetable,0.7,3.6,0.1,15,0,,")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_ingredients_csv_success() -> Result<()> {
        let file = create_test_csv_file()?;
        let data = load_ingredients_csv(file.path())?;
        assert_eq!(data.len(), 3);

        let apple = data.iter().find(|i| i.name == "Apple").unwrap();
        assert_eq!(apple.id, IngredientId(1));
        assert_eq!(apple.category, "fruit");
        assert_eq!(apple.per_100g.calories, 52.0);
        assert_eq!(apple.per_100g.get(NutrientKey::VitaminC), Some(4.6));

        let banana = data.iter().find(|i| i.name == "Banana").unwrap();
        assert_eq!(banana.per_100g.get(NutrientKey::VitaminC), None);

        let cucumber = data.iter().find(|i| i.name == "Cucumber").unwrap();
        assert_eq!(cucumber.per_100g.get(NutrientKey::VitaminC), Some(0.0));
        assert_eq!(cucumber.per_100g.get(NutrientKey::Iron), None);
        Ok(())
    }

    #[test]
    fn test_load_ingredients_csv_missing_macro_column() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,category,proteins,carbs,fats")?;
        writeln!(file, "1,Apple,fruit,0.3,13.8,0.2")?;
        file.flush()?;

        let result = load_ingredients_csv(file.path());
        assert!(result.unwrap_err().to_string().contains("Column 'calories' not found"));
        Ok(())
    }

    #[test]
    fn test_load_ingredients_csv_empty_macro_cell() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,category,proteins,carbs,fats,calories")?;
        writeln!(file, "1,Apple,fruit,0.3,,0.2,52")?;
        file.flush()?;

        let err = load_ingredients_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("Missing carbs"));
        Ok(())
    }

    #[test]
    fn test_load_ingredients_csv_rejects_negative_value() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "id,name,category,proteins,carbs,fats,calories,iron")?;
        writeln!(file, "1,Apple,fruit,0.3,13.8,0.2,52,-1")?;
        file.flush()?;

        assert!(load_ingredients_csv(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_load_ingredients_csv_file_not_found() {
        let result = load_ingredients_csv(Path::new("this_file_does_not_exist.csv"));
        assert!(result.unwrap_err().to_string().contains("Ingredient CSV file not found"));
    }

    #[test]
    fn test_parse_rda_json_skips_unknown_keys() -> Result<()> {
        let table = parse_rda_json(
            r#"{
                "calcium": {"value": 1200},
                "vitaminC": {"value": 75, "label": "Ascorbic acid"},
                "omega3": {"value": 1.6}
            }"#,
        )?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(NutrientKey::Calcium).unwrap().value, 1200.0);
        assert_eq!(table.get(NutrientKey::VitaminC).unwrap().label, "Ascorbic acid");
        Ok(())
    }

    #[test]
    fn test_parse_rda_json_rejects_zero_value() {
        assert!(parse_rda_json(r#"{"iron": {"value": 0}}"#).is_err());
    }

    #[test]
    fn test_parse_meals_json() -> Result<()> {
        let meals = parse_meals_json(
            r#"[{"id": 5, "name": "Porridge", "contributions": [{"ingredient_id": 1, "amount_grams": 80}]}]"#,
        )?;
        assert_eq!(meals.len(), 1);
        assert!(meals[0].precomputed_total.is_none());
        Ok(())
    }
}
