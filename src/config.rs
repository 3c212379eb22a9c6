use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction in which parameter domains are ranked by node depth.
/// The first domain in the resulting order is the fastest-changing digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthOrder {
    /// Most upstream parameters change on every tick.
    #[default]
    Ascending,
    /// Most downstream parameters change on every tick.
    Descending,
}

impl FromStr for DepthOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(format!("unknown depth order `{}`", other)),
        }
    }
}

/// What happens to the result log when `run()` starts again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultRetention {
    #[default]
    PerRun,
    Accumulate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub depth_order: DepthOrder,
    pub retention: ResultRetention,
}

impl SweepConfig {
    pub fn depth_order(mut self, order: DepthOrder) -> Self {
        self.depth_order = order;
        self
    }

    pub fn retention(mut self, retention: ResultRetention) -> Self {
        self.retention = retention;
        self
    }
}
