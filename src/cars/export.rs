use std::path::Path;

use anyhow::Context;
use tracing::info;

use super::repo_types::Car;
use super::services::CarService;
use crate::error::AppError;

const HEADER: [&str; 7] = ["ID", "MODEL", "YEAR", "COLOR", "HP", "MANUFACTURER", "COUNTRY"];

/// Quotes every field, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = fields
        .into_iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

pub fn render_csv(cars: &[Car]) -> String {
    let mut out = csv_row(HEADER);
    for car in cars {
        out.push_str(&csv_row([
            car.id.to_string(),
            car.model.clone(),
            car.year.to_string(),
            car.color.clone(),
            car.horsepower.to_string(),
            car.manufacturer.clone(),
            car.country.clone(),
        ]));
    }
    out
}

/// Dumps the whole inventory to `path`, replacing any previous export.
/// Returns the rendered file so callers never read `path` back.
pub async fn export_csv(service: &CarService, path: &Path) -> Result<String, AppError> {
    let cars = service.list_all(0, i32::MAX as i64).await?;
    let csv = render_csv(&cars);
    tokio::fs::write(path, csv.as_bytes())
        .await
        .with_context(|| format!("write csv export to {}", path.display()))?;
    info!(path = %path.display(), rows = cars.len(), "csv export written");
    Ok(csv)
}
