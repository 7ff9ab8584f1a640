//! The fact store.
//!
//! Maps (parameter, instance) to the values established so far, each with its
//! cf. Asserting a value that is already present combines the two cfs with
//! [`combine_or`]; nothing is ever overwritten.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::confidence::{combine_or, validate_cf, UNKNOWN};
use crate::context::Instance;
use crate::error::EmycinResult;

/// Key shared by the fact store and the resolution cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactKey {
    /// Parameter name.
    pub parameter: String,
    /// Instance the parameter belongs to.
    pub instance: Instance,
}

impl FactKey {
    /// Creates a key.
    #[must_use]
    pub fn new(parameter: impl Into<String>, instance: &Instance) -> Self {
        Self {
            parameter: parameter.into(),
            instance: instance.clone(),
        }
    }
}

/// A value with the cf it is believed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// The value.
    pub value: String,
    /// Its cf.
    pub cf: f64,
}

/// Values established for each (parameter, instance).
#[derive(Debug, Default)]
pub struct FactStore {
    entries: HashMap<FactKey, Vec<Fact>>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All facts recorded for a key (empty if none).
    #[must_use]
    pub fn values(&self, parameter: &str, instance: &Instance) -> &[Fact] {
        self.entries
            .get(&FactKey::new(parameter, instance))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The cf of `value`, or [`UNKNOWN`] if it was never asserted.
    #[must_use]
    pub fn cf(&self, parameter: &str, instance: &Instance, value: &str) -> f64 {
        self.values(parameter, instance)
            .iter()
            .find(|f| f.value == value)
            .map_or(UNKNOWN, |f| f.cf)
    }

    /// Asserts `value` with `cf`, combining with any existing cf.
    ///
    /// Returns the cf now stored. On error the store is unchanged.
    ///
    /// # Errors
    ///
    /// Fails for an invalid cf or an undefined combination.
    pub fn update(
        &mut self,
        parameter: &str,
        instance: &Instance,
        value: &str,
        cf: f64,
    ) -> EmycinResult<f64> {
        let cf = validate_cf(cf)?;
        let facts = self.entries.entry(FactKey::new(parameter, instance)).or_default();
        if let Some(existing) = facts.iter_mut().find(|f| f.value == value) {
            existing.cf = combine_or(existing.cf, cf)?;
            return Ok(existing.cf);
        }
        facts.push(Fact {
            value: value.to_string(),
            cf,
        });
        Ok(cf)
    }

    /// Asserts several values for one key, all or nothing.
    ///
    /// Pairs are combined in order, with each other and with what is already
    /// stored. If any cf is invalid or any combination is undefined the
    /// store is left unchanged.
    ///
    /// # Errors
    ///
    /// Fails for an invalid cf or an undefined combination.
    pub fn update_all(
        &mut self,
        parameter: &str,
        instance: &Instance,
        pairs: &[(String, f64)],
    ) -> EmycinResult<()> {
        let key = FactKey::new(parameter, instance);
        let mut staged = self.entries.get(&key).cloned().unwrap_or_default();
        for (value, cf) in pairs {
            let cf = validate_cf(*cf)?;
            if let Some(existing) = staged.iter_mut().find(|f| &f.value == value) {
                existing.cf = combine_or(existing.cf, cf)?;
            } else {
                staged.push(Fact {
                    value: value.clone(),
                    cf,
                });
            }
        }
        self.entries.insert(key, staged);
        Ok(())
    }

    /// Number of keys with at least one fact.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }

    /// Returns true if no fact is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards every fact.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
