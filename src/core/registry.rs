// Signal registry: named live values sampled by the recorder

use crate::core::error::{Result, TelemetryError};
use std::cell::Cell;

/// Ordered table of live integer and float signals.
///
/// Field order must stay stable for as long as a recorder holds the registry.
pub trait SignalRegistry {
    fn int_names(&self) -> Vec<String>;
    fn float_names(&self) -> Vec<String>;

    /// Current value of the `index`-th integer field.
    fn int_value(&self, index: usize) -> i64;

    /// Current value of the `index`-th float field.
    fn float_value(&self, index: usize) -> f64;

    /// Ordered key/value metadata copied into the log header.
    fn constants(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatHandle(usize);

/// In-process registry.
///
/// Registration takes `&mut self`, updates only `&self`: once a recorder
/// borrows it, the schema is frozen but values stay writable.
#[derive(Debug, Default)]
pub struct TelemetryData {
    constants: Vec<(String, String)>,
    ints: Vec<(String, Cell<i64>)>,
    floats: Vec<(String, Cell<f64>)>,
}

impl TelemetryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_constant(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if self.constants.iter().any(|(k, _)| k == key) {
            return Err(TelemetryError::DuplicateField(key.to_string()));
        }
        self.constants.push((key.to_string(), value.into()));
        Ok(())
    }

    pub fn register_int(&mut self, name: &str, initial: i64) -> Result<IntHandle> {
        self.check_unique(name)?;
        self.ints.push((name.to_string(), Cell::new(initial)));
        Ok(IntHandle(self.ints.len() - 1))
    }

    pub fn register_float(&mut self, name: &str, initial: f64) -> Result<FloatHandle> {
        self.check_unique(name)?;
        self.floats.push((name.to_string(), Cell::new(initial)));
        Ok(FloatHandle(self.floats.len() - 1))
    }

    pub fn set_int(&self, handle: IntHandle, value: i64) {
        self.ints[handle.0].1.set(value);
    }

    pub fn set_float(&self, handle: FloatHandle, value: f64) {
        self.floats[handle.0].1.set(value);
    }

    pub fn get_int(&self, handle: IntHandle) -> i64 {
        self.ints[handle.0].1.get()
    }

    pub fn get_float(&self, handle: FloatHandle) -> f64 {
        self.floats[handle.0].1.get()
    }

    fn check_unique(&self, name: &str) -> Result<()> {
        let taken = self.ints.iter().any(|(n, _)| n == name)
            || self.floats.iter().any(|(n, _)| n == name);
        if taken {
            return Err(TelemetryError::DuplicateField(name.to_string()));
        }
        Ok(())
    }
}

impl SignalRegistry for TelemetryData {
    fn int_names(&self) -> Vec<String> {
        self.ints.iter().map(|(name, _)| name.clone()).collect()
    }

    fn float_names(&self) -> Vec<String> {
        self.floats.iter().map(|(name, _)| name.clone()).collect()
    }

    fn int_value(&self, index: usize) -> i64 {
        self.ints[index].1.get()
    }

    fn float_value(&self, index: usize) -> f64 {
        self.floats[index].1.get()
    }

    fn constants(&self) -> Vec<(String, String)> {
        self.constants.clone()
    }
}
