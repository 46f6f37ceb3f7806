//! Standard-deviation anomaly flags over a daily metric series

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_THRESHOLD_STD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spike,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
}

/// Mean and population standard deviation; `None` when fewer than two
/// points or the series is flat
fn spread(data: &[f64]) -> Option<(f64, f64)> {
    if data.len() < 2 {
        return None;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 {
        return None;
    }
    Some((mean, std))
}

/// Indices of values above `mean + threshold_std * std`
pub fn detect_metric_spike(data: &[f64], threshold_std: f64) -> Vec<usize> {
    let Some((mean, std)) = spread(data) else {
        return Vec::new();
    };
    let limit = mean + threshold_std * std;
    data.iter()
        .enumerate()
        .filter(|(_, v)| **v > limit)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of values below `mean - threshold_std * std`
pub fn detect_metric_drop(data: &[f64], threshold_std: f64) -> Vec<usize> {
    let Some((mean, std)) = spread(data) else {
        return Vec::new();
    };
    let limit = mean - threshold_std * std;
    data.iter()
        .enumerate()
        .filter(|(_, v)| **v < limit)
        .map(|(i, _)| i)
        .collect()
}

/// Spikes then drops, at most one entry per (date, kind)
pub fn find_recent_anomalies(dates: &[String], values: &[f64], threshold_std: f64) -> Vec<Anomaly> {
    let flagged = detect_metric_spike(values, threshold_std)
        .into_iter()
        .map(|i| (i, AnomalyKind::Spike))
        .chain(
            detect_metric_drop(values, threshold_std)
                .into_iter()
                .map(|i| (i, AnomalyKind::Drop)),
        );

    let mut seen = HashSet::new();
    flagged
        .filter_map(|(i, kind)| {
            let date = dates.get(i)?;
            seen.insert((date.clone(), kind)).then(|| Anomaly {
                date: date.clone(),
                value: values[i],
                kind,
            })
        })
        .collect()
}
