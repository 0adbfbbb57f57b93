//! Ledger connection reuse.
//!
//! Connections are cached per endpoint in an explicit collaborator that
//! callers own and pass around, so separate caches never share state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClientConfig;
use crate::error::{ClaimsError, Result};

use super::{InMemoryLedger, Ledger};

type Connector = dyn Fn(&str) -> Result<Arc<dyn Ledger>> + Send + Sync;
type Connections = HashMap<String, Arc<dyn Ledger>>;

/// Endpoint-keyed cache of open ledger connections.
pub struct ConnectionCache {
    connector: Box<Connector>,
    connections: Mutex<Connections>,
}

fn lock_connections(mutex: &Mutex<Connections>) -> Result<MutexGuard<'_, Connections>> {
    mutex
        .lock()
        .map_err(|e| ClaimsError::Ledger(format!("lock poisoned: {e}")))
}

impl ConnectionCache {
    /// A cache that opens connections with `connector`.
    pub fn new<F>(connector: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn Ledger>> + Send + Sync + 'static,
    {
        Self {
            connector: Box::new(connector),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// A cache whose endpoints each get a fresh [`InMemoryLedger`].
    pub fn in_memory() -> Self {
        Self::new(|_| Ok(Arc::new(InMemoryLedger::new()) as Arc<dyn Ledger>))
    }

    /// The cached connection for `endpoint`, opening one if needed.
    pub fn connect(&self, endpoint: &str) -> Result<Arc<dyn Ledger>> {
        let mut connections = lock_connections(&self.connections)?;
        if let Some(ledger) = connections.get(endpoint) {
            return Ok(Arc::clone(ledger));
        }
        log::debug!("opening ledger connection to {endpoint}");
        let ledger = (self.connector)(endpoint)?;
        connections.insert(endpoint.to_string(), Arc::clone(&ledger));
        Ok(ledger)
    }

    /// Connect to the endpoint named in `config`.
    pub fn connect_configured(&self, config: &ClientConfig) -> Result<Arc<dyn Ledger>> {
        self.connect(&config.ledger_endpoint)
    }

    /// Drop the cached connection for `endpoint`. Returns whether one was
    /// cached. Handles already given out stay usable.
    pub fn disconnect(&self, endpoint: &str) -> Result<bool> {
        let removed = lock_connections(&self.connections)?
            .remove(endpoint)
            .is_some();
        if removed {
            log::debug!("closed ledger connection to {endpoint}");
        }
        Ok(removed)
    }

    /// Drop every cached connection.
    pub fn clear_cache(&self) -> Result<()> {
        lock_connections(&self.connections)?.clear();
        Ok(())
    }

    pub fn is_connected(&self, endpoint: &str) -> bool {
        lock_connections(&self.connections)
            .map(|c| c.contains_key(endpoint))
            .unwrap_or(false)
    }
}
