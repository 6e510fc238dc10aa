//! Flat CSV export
//!
//! Each record becomes one row. Nested collections are joined with `"; "`
//! and only the first coordinated product is expanded into columns.

use super::traits::{OutputResult, OutputSink};
use crate::record::CanonicalRecord;
use serde::Serialize;
use std::path::PathBuf;

/// One CSV row
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct RecordRow {
    pub name: String,
    pub url: String,
    pub price_with_tax: String,
    pub price_without_tax: String,
    pub discount_type: String,
    pub images: String,
    pub breadcrumb: String,
    pub kws: String,
    pub available_size: String,
    pub sense_of_the_size: String,
    pub coordinates_product_name: String,
    pub coordinates_product_url: String,
    pub coordinates_product_image: String,
    pub coordinates_product_price_with_tax: String,
    pub coordinates_product_price_without_tax: String,
    pub coordinates_product_discount_type: String,
    pub description_title: String,
    pub general_description: String,
    pub general_itemization_description: String,
    pub size_charts: String,
    pub special_function: String,
    pub review_count: String,
    pub reviews: String,
    pub rating: String,
    pub recommended_rate: String,
    pub rating_senses: String,
}

impl From<&CanonicalRecord> for RecordRow {
    fn from(record: &CanonicalRecord) -> Self {
        let size_charts = record
            .size_charts
            .iter()
            .map(|chart| {
                let measurements = chart
                    .measurements
                    .iter()
                    .map(|m| format!("{}: {}", m.kind, m.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} ({})", chart.size, measurements)
            })
            .collect::<Vec<_>>()
            .join("; ");

        let technologies = record
            .technologies
            .iter()
            .map(|t| format!("{}: {}", t.name, t.desc))
            .collect::<Vec<_>>()
            .join("; ");

        let reviews = record
            .reviews
            .iter()
            .map(|r| {
                format!(
                    "{} ({}): {} [{}/{}]",
                    r.author_name, r.date_published, r.body, r.rating_value, r.best_rating
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        let rating_senses = record
            .rating_senses
            .iter()
            .map(|s| format!("{}: {}", s.kind, s.value))
            .collect::<Vec<_>>()
            .join("; ");

        let mut row = RecordRow {
            name: record.name.clone(),
            url: record.url.clone(),
            price_with_tax: record.price.with_tax.clone(),
            price_without_tax: record.price.without_tax.clone(),
            discount_type: record.price.discount_type.clone(),
            images: record.images.join("; "),
            breadcrumb: record.breadcrumb.clone(),
            kws: record.kws.clone(),
            available_size: record.size_choice.available_size.clone(),
            sense_of_the_size: record.size_choice.sense_of_the_size.clone(),
            description_title: record.description.title.clone(),
            general_description: record.description.general.clone(),
            general_itemization_description: record.description.breads.join("; "),
            size_charts,
            special_function: technologies,
            review_count: record.review_count.clone(),
            reviews,
            rating: record.rating.clone(),
            recommended_rate: record.recommended_rate.clone(),
            rating_senses,
            ..Default::default()
        };

        if let Some(first) = record.coordinates.first() {
            row.coordinates_product_name = first.product_name.clone();
            row.coordinates_product_url = first.product_url.clone();
            row.coordinates_product_image = first.product_image.clone();
            row.coordinates_product_price_with_tax = first.product_price.with_tax.clone();
            row.coordinates_product_price_without_tax = first.product_price.without_tax.clone();
            row.coordinates_product_discount_type = first.product_price.discount_type.clone();
        }

        row
    }
}

/// Writes records as a CSV file with a header row
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn write(&self, records: &[CanonicalRecord]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for record in records {
            writer.serialize(RecordRow::from(record))?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
