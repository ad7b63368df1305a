use std::io::Write;

use nutri_tally::catalog::Catalog;
use nutri_tally::data_loader::{load_ingredients_csv, parse_entries_json, parse_meals_json, parse_rda_json};
use nutri_tally::display::{round_for_display, round_percentages};
use nutri_tally::nutrients::NutrientKey;
use nutri_tally::rda::{percent_of, Severity};
use nutri_tally::rollup::{rollup, Bucketing};
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[tokio::test]
async fn test_weekly_report_from_files() {
    let foods = write_temp(
        "id,name,category,proteins,carbs,fats,calories,vitaminC,calcium\n\
         1,Chicken,meat,20,0,5,120,10,\n\
         2,Rice,grain,2,25,0,110,,10\n",
    );
    let meals = write_temp(
        r#"[{"id": 9, "name": "Chicken rice", "contributions": [
            {"ingredient_id": 1, "amount_grams": 150},
            {"ingredient_id": 2, "amount_grams": 50}
        ], "precomputed_total": {"proteins": 31, "carbs": 12.5, "fats": 7.5, "calories": 235}}]"#,
    );
    let entries = write_temp(
        r#"[
            {"date": "2024-01-01", "time": "12:00", "source": {"type": "meal", "meal_id": 9}},
            {"date": "2024-01-03", "source": {"type": "ingredients", "contributions": [{"ingredient_id": 2, "amount_grams": 200}]}},
            {"date": "2024-01-08", "kind": "planned", "source": {"type": "meal", "meal_id": 9, "portions": 0.5}}
        ]"#,
    );
    let rda = write_temp(r#"{"vitaminC": {"value": 90}, "calcium": {"value": 1000}, "vitaminZ": {"value": 1}}"#);

    let ingredients = load_ingredients_csv(foods.path()).unwrap();
    let meals = parse_meals_json(&tokio::fs::read_to_string(meals.path()).await.unwrap()).unwrap();
    let entries = parse_entries_json(&tokio::fs::read_to_string(entries.path()).await.unwrap()).unwrap();
    let table = parse_rda_json(&tokio::fs::read_to_string(rda.path()).await.unwrap()).unwrap();
    assert_eq!(table.len(), 2);

    let catalog = Catalog::from_parts(ingredients, meals);
    let report = rollup(&catalog, &entries, Bucketing::Week).unwrap();
    assert_eq!(report.len(), 2);

    let first = report.get("2024-W01").unwrap();
    assert_eq!(first.entry_count, 2);
    assert_eq!(first.day_count, 2);
    // 235 kcal meal + 220 kcal of rice
    let shown = round_for_display(&first.total);
    assert_eq!(shown.get(NutrientKey::Calories), Some(455.0));
    assert_eq!(shown.get(NutrientKey::Carbs), Some(62.5));
    assert_eq!(shown.get(NutrientKey::Calcium), Some(25.0));

    let rows = round_percentages(&percent_of(&first.daily_average(), &table));
    // 15 mg vitamin C over 2 days against 90 mg
    assert_eq!(rows[&NutrientKey::VitaminC].percent, 8.3);
    assert_eq!(rows[&NutrientKey::VitaminC].severity, Severity::Deficient);

    let second = report.get("2024-W02").unwrap();
    assert!((second.total.calories - 117.5).abs() < 1e-9);
}
