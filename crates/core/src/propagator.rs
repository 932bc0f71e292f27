// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context propagation across workflow boundaries.
//!
//! Propagators carry caller context (tenancy, tracing baggage) into headers
//! on outgoing starts and signals, and back out of headers at replay
//! boundaries. The core calls `inject` and `extract` symmetrically; what the
//! values mean is entirely up to the propagator.

use std::collections::HashMap;

/// Header map attached to starts, signals, and child workflows.
pub type Header = HashMap<String, String>;

/// Key-value context as seen by propagators.
pub type ContextMap = HashMap<String, String>;

pub trait ContextPropagator: Send + Sync {
    /// Propagator name, for logging.
    fn name(&self) -> &str;

    /// Copy context values into an outgoing header.
    fn inject(&self, context: &ContextMap, header: &mut Header);

    /// Recover context values from an incoming header.
    fn extract(&self, header: &Header, context: &mut ContextMap);
}

/// Propagator that forwards keys with a fixed prefix verbatim.
pub struct PrefixPropagator {
    prefix: String,
}

impl PrefixPropagator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl ContextPropagator for PrefixPropagator {
    fn name(&self) -> &str {
        "prefix"
    }

    fn inject(&self, context: &ContextMap, header: &mut Header) {
        for (k, v) in context {
            if k.starts_with(&self.prefix) {
                header.insert(k.clone(), v.clone());
            }
        }
    }

    fn extract(&self, header: &Header, context: &mut ContextMap) {
        for (k, v) in header {
            if k.starts_with(&self.prefix) {
                context.insert(k.clone(), v.clone());
            }
        }
    }
}
