//! Sampling parameters for the text backend.
//!
//! A single [`GenerationSettings`] is owned by the responder. Generation calls take
//! a snapshot at the start of the request, so an administrator update that lands
//! mid-call never produces a half-applied read.

use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 32,
            max_output_tokens: 4096,
        }
    }
}

impl fmt::Display for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature={}, top_p={}, top_k={}, max_output_tokens={}",
            self.temperature, self.top_p, self.top_k, self.max_output_tokens
        )
    }
}

/// A tunable field of [`GenerationConfig`], in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    TopP,
    TopK,
    MaxOutputTokens,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::TopP => "top_p",
            Field::TopK => "top_k",
            Field::MaxOutputTokens => "max_output_tokens",
        }
    }

    /// Inclusive bounds.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Field::Temperature | Field::TopP => (0.0, 1.0),
            Field::TopK => (1.0, 1000.0),
            Field::MaxOutputTokens => (1.0, 8192.0),
        }
    }

    fn accepts(self, value: f64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{field} must be between {min} and {max} (got {value})")]
pub struct ValidationError {
    pub field: Field,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigUpdate {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<i64>,
    pub max_output_tokens: Option<i64>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
            && self.max_output_tokens.is_none()
    }

    /// Produce the config that would result from applying this update to `base`.
    /// Fails on the first out-of-range field and leaves `base` untouched.
    pub fn apply_to(&self, base: GenerationConfig) -> Result<GenerationConfig, ValidationError> {
        let mut next = base;

        if let Some(value) = self.temperature {
            next.temperature = check(Field::Temperature, value as f64)? as f32;
        }
        if let Some(value) = self.top_p {
            next.top_p = check(Field::TopP, value as f64)? as f32;
        }
        if let Some(value) = self.top_k {
            next.top_k = check(Field::TopK, value as f64)? as u32;
        }
        if let Some(value) = self.max_output_tokens {
            next.max_output_tokens = check(Field::MaxOutputTokens, value as f64)? as u32;
        }

        Ok(next)
    }
}

fn check(field: Field, value: f64) -> Result<f64, ValidationError> {
    if field.accepts(value) {
        return Ok(value);
    }
    let (min, max) = field.bounds();
    Err(ValidationError {
        field,
        value,
        min,
        max,
    })
}

/// Shared, lock-guarded generation parameters. Resets to defaults on restart.
#[derive(Clone, Default)]
pub struct GenerationSettings {
    inner: Arc<RwLock<GenerationConfig>>,
}

impl GenerationSettings {
    pub fn new(initial: GenerationConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> GenerationConfig {
        *self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Validate and apply `update` under a single write lock.
    /// Returns the previous and resulting configs on success.
    pub fn apply(
        &self,
        update: &ConfigUpdate,
    ) -> Result<(GenerationConfig, GenerationConfig), ValidationError> {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = *guard;
        let next = update.apply_to(previous)?;
        *guard = next;
        Ok((previous, next))
    }
}
