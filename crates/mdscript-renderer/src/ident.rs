//! Symbolic identifiers for emitted elements and text nodes.

use std::fmt;

/// Counter value before the first allocation; the first identifier is `el2`.
const COUNTER_SEED: u32 = 1;

/// Name bound to one creation statement, printed as `el{n}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(u32);

impl Ident {
    /// Numeric part of the identifier.
    #[must_use]
    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el{}", self.0)
    }
}

/// Strictly increasing identifier source, one per conversion.
#[derive(Debug)]
pub struct IdAllocator {
    counter: u32,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: COUNTER_SEED,
        }
    }

    /// Allocate the next identifier.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Ident {
        self.counter += 1;
        Ident(self.counter)
    }

    /// Number of identifiers handed out so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        (self.counter - COUNTER_SEED) as usize
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
