//! Aggregate statistics over published result records.

use serde::{Deserialize, Serialize};

use crate::results::ResultRecord;

/// Counts of scores per band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    pub from_90: u32,
    pub from_80: u32,
    pub from_70: u32,
    pub from_60: u32,
    pub below_60: u32,
}

impl ScoreDistribution {
    /// Count one score into its band.
    pub fn add(&mut self, score: u8) {
        if score >= 90 {
            self.from_90 += 1;
        } else if score >= 80 {
            self.from_80 += 1;
        } else if score >= 70 {
            self.from_70 += 1;
        } else if score >= 60 {
            self.from_60 += 1;
        } else {
            self.below_60 += 1;
        }
    }

    /// The bands with their display labels, highest first.
    pub fn buckets(&self) -> [(&'static str, u32); 5] {
        [
            ("90-100%", self.from_90),
            ("80-89%", self.from_80),
            ("70-79%", self.from_70),
            ("60-69%", self.from_60),
            ("Below 60%", self.below_60),
        ]
    }
}

/// Summary of all attempts at a test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub attempts: u32,
    pub average_score: f64,
    pub highest_score: u8,
    pub lowest_score: u8,
    pub distribution: ScoreDistribution,
}

impl ResultsSummary {
    /// Summarize a set of result records. An empty set yields all zeros.
    pub fn from_records(records: &[ResultRecord]) -> Self {
        if records.is_empty() {
            return ResultsSummary::default();
        }

        let mut distribution = ScoreDistribution::default();
        let mut total = 0u64;
        let mut highest = 0u8;
        let mut lowest = 100u8;
        for record in records {
            distribution.add(record.score);
            total += u64::from(record.score);
            highest = highest.max(record.score);
            lowest = lowest.min(record.score);
        }

        ResultsSummary {
            attempts: records.len() as u32,
            average_score: total as f64 / records.len() as f64,
            highest_score: highest,
            lowest_score: lowest,
            distribution,
        }
    }
}
