//! Enumerated option domains
//!
//! Commands register the closed set of values an option accepts and validate
//! user input against it. Matching is exact: no case folding, no trimming.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnumError {
    /// The command asked about an enum it never defined.
    #[error("Unknown enum {name}")]
    UnknownEnum { name: String },
    #[error("Value must be one of {} got \"{value}\"", allowed.join(", "))]
    InvalidValue {
        name: String,
        value: String,
        allowed: Vec<String>,
    },
}

/// Table of named enum definitions owned by a single command.
#[derive(Debug, Clone, Default)]
pub struct EnumValidator {
    definitions: HashMap<String, Vec<String>>,
}

impl EnumValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the allowed values for `name`. Duplicates are
    /// dropped, first occurrence wins the position.
    pub fn define<I, S>(&mut self, name: &str, allowed: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = Vec::new();
        for value in allowed.into_iter().map(Into::into) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        self.definitions.insert(name.to_string(), values);
        self
    }

    /// Allowed values in definition order.
    pub fn allowed(&self, name: &str) -> Result<&[String], EnumError> {
        self.definitions
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| EnumError::UnknownEnum { name: name.to_string() })
    }

    pub fn validate(&self, name: &str, value: &str) -> Result<(), EnumError> {
        let allowed = self.allowed(name)?;
        if allowed.iter().any(|candidate| candidate == value) {
            return Ok(());
        }

        Err(EnumError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            allowed: allowed.to_vec(),
        })
    }

    /// Help text for an option, e.g. `One of open, closed, all`.
    pub fn describe(&self, name: &str) -> Result<String, EnumError> {
        Ok(format!("One of {}", self.allowed(name)?.join(", ")))
    }
}
