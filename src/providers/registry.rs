//! Provider registry with a switchable active provider.
//!
//! Providers are stored in registration order, which is also the order
//! reported by [`ProviderRegistry::list_available`]. The set of providers
//! is fixed once the gateway is built; the only mutable state is the
//! active-provider selector.
//!
//! # Snapshot Semantics
//!
//! [`ProviderRegistry::resolve`] reads the selector once and returns the
//! provider itself. A caller that resolves at request entry keeps talking
//! to that provider for its whole retry loop, even if
//! [`switch_active`](ProviderRegistry::switch_active) runs concurrently.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::traits::TextProvider;
use crate::{Result, VerbatimError};

/// Ordered provider registry.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn TextProvider>>,
    active: RwLock<String>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            active: RwLock::new(String::new()),
        }
    }
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    ///
    /// A provider with the same name replaces the earlier one in place,
    /// keeping its position. The first provider registered becomes active.
    pub fn register(&mut self, provider: Arc<dyn TextProvider>) {
        if let Some(idx) = self
            .providers
            .iter()
            .position(|p| p.name() == provider.name())
        {
            self.providers[idx] = provider;
            return;
        }
        if self.providers.is_empty() {
            *self.active.get_mut().unwrap_or_else(PoisonError::into_inner) =
                provider.name().to_owned();
        }
        self.providers.push(provider);
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }

    /// All registered provider names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_owned()).collect()
    }

    /// Names of providers with a configured credential, in registration order.
    pub fn list_available(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| p.has_credential())
            .map(|p| p.name().to_owned())
            .collect()
    }

    /// Name of the currently active provider.
    pub fn active(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `name` the active provider.
    ///
    /// Fails with [`VerbatimError::UnknownProvider`] if `name` is not
    /// registered; the previous selection is kept in that case.
    pub fn switch_active(&self, name: &str) -> Result<()> {
        if self.get(name).is_none() {
            return Err(VerbatimError::UnknownProvider(name.to_owned()));
        }
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if *active != name {
            info!(from = %*active, to = name, "switching active provider");
            *active = name.to_owned();
        }
        Ok(())
    }

    /// Resolve the provider for a request: `requested` if given, otherwise
    /// the active provider at the moment of the call.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Arc<dyn TextProvider>> {
        let name = match requested {
            Some(name) => name.to_owned(),
            None => self.active(),
        };
        self.get(&name)
            .ok_or(VerbatimError::UnknownProvider(name))
    }
}
