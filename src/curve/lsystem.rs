//! L-System Expansion - Deterministic string rewriting
//!
//! Axiom: A, Rules: A → A+B, B → A-B, turns copied unchanged.
//! Each pass doubles the forward symbols and carries the turns over,
//! so pass n holds 2^n forward symbols and 2^(n+1) - 1 symbols overall.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::{CurveError, Symbol};

/// Deepest expansion accepted (2^25 symbols)
pub const MAX_ITERATIONS: u32 = 24;

pub const AXIOM: Symbol = Symbol::A;

/// Apply the rewrite rules to every symbol simultaneously
pub fn rewrite(current: &[Symbol]) -> Vec<Symbol> {
    let mut next = Vec::with_capacity(current.len() * 2 + 1);
    for &s in current {
        match s {
            Symbol::A => next.extend_from_slice(&[Symbol::A, Symbol::Left, Symbol::B]),
            Symbol::B => next.extend_from_slice(&[Symbol::A, Symbol::Right, Symbol::B]),
            other => next.push(other),
        }
    }
    next
}

/// Validate a raw iteration count coming from user input
pub fn check_iterations(n: i64) -> Result<u32, CurveError> {
    if (0..=MAX_ITERATIONS as i64).contains(&n) {
        Ok(n as u32)
    } else {
        Err(CurveError::InvalidIterations(n))
    }
}

/// Expand the axiom `n` times without caching
pub fn expand(n: u32) -> Result<Vec<Symbol>, CurveError> {
    check_iterations(n as i64)?;
    let mut s = vec![AXIOM];
    for _ in 0..n {
        s = rewrite(&s);
    }
    Ok(s)
}

/// Bounded memo of expanded strings keyed by iteration count
///
/// Owned by the explorer; evicts the oldest inserted entry once full.
#[derive(Debug)]
pub struct SymbolCache {
    capacity: usize,
    entries: HashMap<u32, Arc<[Symbol]>>,
    order: VecDeque<u32>,
}

impl SymbolCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Get the string for `n`, expanding from the deepest cached ancestor
    pub fn get(&mut self, n: u32) -> Result<Arc<[Symbol]>, CurveError> {
        check_iterations(n as i64)?;

        if let Some(hit) = self.entries.get(&n) {
            tracing::trace!("Symbol cache hit for n={}", n);
            return Ok(hit.clone());
        }

        let ancestor = self.entries.keys().copied().filter(|&k| k < n).max();
        let s = match ancestor {
            Some(k) => {
                tracing::debug!("Expanding symbol string from n={} to n={}", k, n);
                let mut s = self.entries[&k].to_vec();
                for _ in k..n {
                    s = rewrite(&s);
                }
                s
            }
            None => {
                tracing::debug!("Expanding symbol string from the axiom to n={}", n);
                expand(n)?
            }
        };

        let s: Arc<[Symbol]> = s.into();
        self.insert(n, s.clone());
        Ok(s)
    }

    fn insert(&mut self, n: u32, s: Arc<[Symbol]>) {
        while self.order.len() >= self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.entries.remove(&old);
                tracing::trace!("Evicted symbol string n={}", old);
            }
        }
        self.order.push_back(n);
        self.entries.insert(n, s);
    }

    #[cfg(test)]
    pub fn contains(&self, n: u32) -> bool {
        self.entries.contains_key(&n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for SymbolCache {
    fn default() -> Self {
        Self::new(8)
    }
}
