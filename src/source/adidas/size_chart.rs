//! Size chart auxiliary
//!
//! The size chart API returns one or more tables per model. Column names come
//! from the first header row of table `"0"`; every body row becomes one
//! [`SizeChart`] entry whose size label is the row's first cell.

use super::{Endpoints, Indexed};
use crate::crawler::FetchEngine;
use crate::record::{Measurement, SizeChart};
use crate::source::{AuxiliaryData, AuxiliaryError, AuxiliaryKey, AuxiliarySource};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Response of the size chart API
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SizeChartResponse {
    pub is_exact_flag: i64,
    pub size_chart: Indexed<SizeTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SizeTable {
    pub has_actual_size: bool,
    pub header: Indexed<Indexed<Cell>>,
    pub body: Indexed<Indexed<Cell>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Cell {
    pub value: String,
}

impl SizeChartResponse {
    /// Flattens every table's body rows into size chart entries
    pub fn into_size_charts(self) -> Vec<SizeChart> {
        let header = self
            .size_chart
            .get("0")
            .and_then(|table| table.header.get("0"));

        let mut charts = Vec::new();
        for (_, table) in self.size_chart.iter() {
            for (_, row) in table.body.iter() {
                let measurements = row
                    .iter()
                    .filter_map(|(column, cell)| {
                        let kind = header
                            .and_then(|h| h.get(column))
                            .map(|h| h.value.trim().to_string())
                            .unwrap_or_default();

                        if kind.is_empty() {
                            None
                        } else {
                            Some(Measurement {
                                kind,
                                value: cell.value.clone(),
                            })
                        }
                    })
                    .collect();

                charts.push(SizeChart {
                    size: row.get("0").map(|c| c.value.clone()).unwrap_or_default(),
                    measurements,
                });
            }
        }

        charts
    }
}

/// Fetches size charts keyed by model code
pub struct SizeChartSource {
    engine: Arc<FetchEngine>,
    endpoints: Arc<Endpoints>,
}

impl SizeChartSource {
    pub fn new(engine: Arc<FetchEngine>, endpoints: Arc<Endpoints>) -> Self {
        Self { engine, endpoints }
    }
}

#[async_trait]
impl AuxiliarySource for SizeChartSource {
    fn name(&self) -> &'static str {
        "size chart"
    }

    async fn fetch(&self, key: &AuxiliaryKey) -> Result<AuxiliaryData, AuxiliaryError> {
        let url = self.endpoints.size_chart(&key.model_key);
        let response: SizeChartResponse = self.engine.get_json(&url).await?;

        let charts = response.into_size_charts();
        if charts.is_empty() {
            return Err(AuxiliaryError::Missing {
                kind: "size chart",
                key: key.model_key.clone(),
            });
        }

        Ok(AuxiliaryData::SizeCharts(charts))
    }
}
