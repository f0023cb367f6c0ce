//! Annotation function registry
//!
//! An explicit name → function table handed to the engine.

use std::collections::BTreeMap;
use std::fmt;

use crate::interval::Interval;

use super::errors::{AnnotationError, AnnotationResult};
use super::functions::{self, AnnotationContext};

/// Signature shared by all aggregators
pub type AnnotationFn = Box<
    dyn Fn(&[Vec<Interval>], &[f64], &AnnotationContext) -> AnnotationResult<Interval>
        + Send
        + Sync,
>;

/// Names registered by `AnnotationRegistry::with_builtins`
pub const BUILTIN_FUNCTIONS: [&str; 12] = [
    "average",
    "average_lower",
    "maximum",
    "minimum",
    "legal_burden_civil_051",
    "legal_burden_clear_075",
    "legal_burden_criminal_090",
    "legal_conservative_min",
    "precedent_weighted",
    "textualism_alpha",
    "purposivism_alpha",
    "lenity_alpha",
];

/// Registry of annotation functions, keyed by name
#[derive(Default)]
pub struct AnnotationRegistry {
    functions: BTreeMap<String, AnnotationFn>,
}

impl AnnotationRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in aggregator
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert("average", Box::new(functions::average));
        registry.insert("average_lower", Box::new(functions::average_lower));
        registry.insert("maximum", Box::new(functions::maximum));
        registry.insert("minimum", Box::new(functions::minimum));
        registry.insert("legal_burden_civil_051", Box::new(functions::legal_burden_civil_051));
        registry.insert("legal_burden_clear_075", Box::new(functions::legal_burden_clear_075));
        registry.insert(
            "legal_burden_criminal_090",
            Box::new(functions::legal_burden_criminal_090),
        );
        registry.insert("legal_conservative_min", Box::new(functions::legal_conservative_min));
        registry.insert("precedent_weighted", Box::new(functions::precedent_weighted));
        registry.insert("textualism_alpha", Box::new(functions::textualism_alpha));
        registry.insert("purposivism_alpha", Box::new(functions::purposivism_alpha));
        registry.insert("lenity_alpha", Box::new(functions::lenity_alpha));
        registry
    }

    fn insert(&mut self, name: &str, f: AnnotationFn) {
        self.functions.insert(name.to_string(), f);
    }

    /// Registers a new aggregator. Names are unique.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> AnnotationResult<()>
    where
        F: Fn(&[Vec<Interval>], &[f64], &AnnotationContext) -> AnnotationResult<Interval>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(AnnotationError::AlreadyRegistered(name));
        }
        self.functions.insert(name, Box::new(f));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, ascending
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Applies the named aggregator
    pub fn apply(
        &self,
        name: &str,
        annotations: &[Vec<Interval>],
        weights: &[f64],
        ctx: &AnnotationContext,
    ) -> AnnotationResult<Interval> {
        let f = self
            .functions
            .get(name)
            .ok_or_else(|| AnnotationError::UnknownFunction(name.to_string()))?;
        f(annotations, weights, ctx)
    }
}

impl fmt::Debug for AnnotationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
