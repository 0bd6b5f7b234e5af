use crate::expression::ast::Expr;
use crate::expression::parser::parse_expr;
use crate::foundation::error::SplinalResult;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Parse memoization keyed by trimmed source text.
///
/// Clones share the same table.
#[derive(Clone, Debug, Default)]
pub struct ExprCache {
    entries: Arc<RwLock<HashMap<String, Arc<Expr>>>>,
}

impl ExprCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tree for `text`, parsing and inserting it on a miss.
    pub fn get_or_parse(&self, text: &str) -> SplinalResult<Arc<Expr>> {
        let key = text.trim();
        {
            let guard = match self.entries.read() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(hit) = guard.get(key) {
                return Ok(Arc::clone(hit));
            }
        }

        let tree = Arc::new(parse_expr(key).map_err(|e| e.into_syntax(key))?);
        let mut guard = match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(Arc::clone(
            guard.entry(key.to_owned()).or_insert_with(|| tree),
        ))
    }

    /// Number of distinct expressions held.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(g) => g.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Return `true` when nothing has been parsed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/cache.rs"]
mod tests;
