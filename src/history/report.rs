use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A self-describing chart series, written as a compact postcard blob so an
/// external viewer can render it without re-running the episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub kind: ReportKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportKind {
    Simple {
        values: Vec<f32>,
    },
    Assets {
        total: Vec<f32>,
        cash: Vec<f32>,
        positioned: Vec<f32>,
    },
    BuySell {
        prices: Vec<f32>,
        buys: Vec<TradePoint>,
        sells: Vec<TradePoint>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePoint {
    pub index: u32,
    pub price: f32,
    pub quantity: u32,
}

pub fn write_report(path: &Path, report: &Report) -> io::Result<()> {
    let bytes = postcard::to_stdvec(report).map_err(io::Error::other)?;
    std::fs::write(path, bytes)
}

pub fn read_report(path: &Path) -> io::Result<Report> {
    let bytes = std::fs::read(path)?;
    postcard::from_bytes(&bytes).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_survives_a_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.report.bin");
        let report = Report {
            title: "Reward".to_string(),
            x_label: None,
            y_label: None,
            kind: ReportKind::BuySell {
                prices: vec![100.0, 101.5],
                buys: vec![TradePoint { index: 0, price: 100.0, quantity: 5 }],
                sells: vec![],
            },
        };

        write_report(&path, &report).unwrap();
        let back = read_report(&path).unwrap();
        match back.kind {
            ReportKind::BuySell { prices, buys, .. } => {
                assert_eq!(prices.len(), 2);
                assert_eq!(buys[0].quantity, 5);
            }
            _ => panic!("wrong report kind"),
        }
    }
}
