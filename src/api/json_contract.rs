use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

use super::{CategoryPlotConfig, PlotSnapshot, XyPlotConfig};

pub const PLOT_CONFIG_JSON_SCHEMA_V1: u32 = 1;
pub const PLOT_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfigJsonContractV1<C> {
    pub schema_version: u32,
    pub config: C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: PlotSnapshot,
}

macro_rules! impl_config_json_contract {
    ($config:ty, $name:literal) => {
        impl $config {
            pub fn to_json_contract_v1_pretty(&self) -> PlotResult<String> {
                let payload = PlotConfigJsonContractV1 {
                    schema_version: PLOT_CONFIG_JSON_SCHEMA_V1,
                    config: self.clone(),
                };
                serde_json::to_string_pretty(&payload).map_err(|e| {
                    PlotError::InvalidData(format!(
                        concat!("failed to serialize ", $name, " contract v1: {}"),
                        e
                    ))
                })
            }

            /// Parses either the bare config or the versioned payload, then validates it.
            pub fn from_json_compat_str(input: &str) -> PlotResult<Self> {
                if let Ok(config) = serde_json::from_str::<Self>(input) {
                    return config.validate();
                }
                let payload: PlotConfigJsonContractV1<Self> =
                    serde_json::from_str(input).map_err(|e| {
                        PlotError::InvalidData(format!(
                            concat!("failed to parse ", $name, " json payload: {}"),
                            e
                        ))
                    })?;
                if payload.schema_version != PLOT_CONFIG_JSON_SCHEMA_V1 {
                    return Err(PlotError::InvalidData(format!(
                        concat!("unsupported ", $name, " schema version: {}"),
                        payload.schema_version
                    )));
                }
                payload.config.validate()
            }
        }
    };
}

impl_config_json_contract!(XyPlotConfig, "xy plot config");
impl_config_json_contract!(CategoryPlotConfig, "category plot config");

impl PlotSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> PlotResult<String> {
        let payload = PlotSnapshotJsonContractV1 {
            schema_version: PLOT_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            PlotError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> PlotResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<PlotSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: PlotSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            PlotError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != PLOT_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(PlotError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlotOrientation;

    #[test]
    fn versioned_payload_round_trips() {
        let config = XyPlotConfig::default().with_orientation(PlotOrientation::Horizontal);
        let json = config.to_json_contract_v1_pretty().expect("serialize");
        assert!(json.contains("\"schema_version\": 1"));
        let parsed = XyPlotConfig::from_json_compat_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let json = r#"{"schema_version": 7, "config": {}}"#;
        let error = CategoryPlotConfig::from_json_compat_str(json).expect_err("version");
        assert!(error.to_string().contains("schema version: 7"));
    }
}
