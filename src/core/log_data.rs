// Decoded, fully materialized log

use crate::core::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedLog {
    pub constants: Vec<(String, String)>,
    pub fieldnames: Vec<String>,
    pub version: i32,
    pub time_unit: f64,
    pub num_int: usize,
    pub num_float: usize,
    pub timestamps: Vec<i64>,
    pub int_data: Vec<Vec<i64>>,
    pub float_data: Vec<Vec<f64>>,
}

impl DecodedLog {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamps converted back to seconds.
    pub fn times(&self) -> Vec<f64> {
        self.timestamps
            .iter()
            .map(|&ticks| ticks as f64 * self.time_unit)
            .collect()
    }

    pub fn int_names(&self) -> &[String] {
        self.fieldnames.get(1..1 + self.num_int).unwrap_or(&[])
    }

    pub fn float_names(&self) -> &[String] {
        self.fieldnames.get(1 + self.num_int..).unwrap_or(&[])
    }

    /// All samples of one integer signal, in record order.
    pub fn int_column(&self, name: &str) -> Option<Vec<i64>> {
        let index = self.int_names().iter().position(|n| n == name)?;
        self.int_data.iter().map(|row| row.get(index).copied()).collect()
    }

    /// All samples of one float signal, in record order.
    pub fn float_column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.float_names().iter().position(|n| n == name)?;
        self.float_data.iter().map(|row| row.get(index).copied()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> DecodedLog {
        DecodedLog {
            constants: vec![],
            fieldnames: vec!["Global.Time".into(), "n".into(), "x".into(), "y".into()],
            version: 1,
            time_unit: 0.5,
            num_int: 1,
            num_float: 2,
            timestamps: vec![0, 1, 4],
            int_data: vec![vec![1], vec![2], vec![3]],
            float_data: vec![vec![0.1, 1.0], vec![0.2, 2.0], vec![0.3, 3.0]],
        }
    }

    #[test]
    fn test_columns() {
        let log = sample_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log.int_column("n"), Some(vec![1, 2, 3]));
        assert_eq!(log.float_column("y"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(log.float_column("n"), None);
        assert_eq!(log.int_column("missing"), None);
    }

    #[test]
    fn test_inconsistent_counts_do_not_panic() {
        let mut log = sample_log();
        log.num_int = 7;
        assert!(log.int_names().is_empty());
        assert!(log.float_names().is_empty());
        assert_eq!(log.int_column("n"), None);

        let mut log = sample_log();
        log.int_data[1].clear();
        assert_eq!(log.int_column("n"), None);
        assert_eq!(log.float_column("x"), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_times_in_seconds() {
        assert_eq!(sample_log().times(), vec![0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_json_export() {
        let json = sample_log().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["timestamps"], serde_json::json!([0, 1, 4]));
        assert_eq!(value["num_float"], 2);
    }
}
