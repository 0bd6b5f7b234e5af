use std::collections::{BTreeMap, HashMap};

static NO_VARIABLES: BTreeMap<String, f64> = BTreeMap::new();

/// Name resolution context for one query.
///
/// Layers, in lookup order:
/// 1. `local`: bare channel names published by the spline currently being resolved,
/// 2. `published`: `"<spline>.<channel>"` values resolved earlier in this query,
/// 3. `variables`: solver-level constants.
///
/// `@` is not a name; it reads [`Bindings::position`].
#[derive(Clone, Debug)]
pub struct Bindings<'v> {
    position: f64,
    variables: &'v BTreeMap<String, f64>,
    published: HashMap<String, f64>,
    local: HashMap<String, f64>,
}

impl Default for Bindings<'static> {
    fn default() -> Self {
        Self::new(&NO_VARIABLES)
    }
}

impl<'v> Bindings<'v> {
    /// Bindings over solver `variables` with `@ = 0`.
    pub fn new(variables: &'v BTreeMap<String, f64>) -> Self {
        Self {
            position: 0.0,
            variables,
            published: HashMap::new(),
            local: HashMap::new(),
        }
    }

    /// Builder form of [`Bindings::set_position`].
    pub fn at(mut self, position: f64) -> Self {
        self.position = position;
        self
    }

    /// Builder form of [`Bindings::set`].
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Current normalized query position, bound to `@`.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Rebind `@`.
    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Bind a bare name in the local layer.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.local.insert(name.into(), value);
    }

    /// Publish a resolved channel under `"<spline>.<channel>"` and its bare name.
    pub fn publish(&mut self, spline: &str, channel: &str, value: f64) {
        self.published.insert(format!("{spline}.{channel}"), value);
        self.local.insert(channel.to_owned(), value);
    }

    /// Drop the bare names of the previous spline; qualified names stay visible.
    pub fn enter_spline(&mut self) {
        self.local.clear();
    }

    /// Resolve a name through the layers.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.local
            .get(name)
            .or_else(|| self.published.get(name))
            .or_else(|| self.variables.get(name))
            .copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/bindings.rs"]
mod tests;
