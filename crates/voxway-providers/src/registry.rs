//! Role + name → provider capability resolution.

use crate::{AiProvider, SttProvider, TtsProvider};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use voxway_types::ProviderRole;

/// Errors produced when resolving a provider.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested provider name is not registered for the role.
    #[error("unknown {role} provider: {name}")]
    UnknownProvider { role: ProviderRole, name: String },

    /// No provider at all is registered for the role.
    #[error("no {0} provider registered")]
    EmptyRole(ProviderRole),
}

/// Role → provider-name listing, as returned by `get_available_providers`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderCatalog {
    pub stt: Vec<String>,
    pub ai: Vec<String>,
    pub tts: Vec<String>,
    pub defaults: HashMap<String, String>,
}

/// Owns the role/name → capability mapping and per-role defaults.
///
/// The registry is built once at startup and shared read-only; the
/// orchestrator holds only transient `Arc` clones for the duration of one
/// request. The first provider registered for a role becomes that role's
/// default until overridden.
#[derive(Default)]
pub struct ProviderRegistry {
    stt: HashMap<String, Arc<dyn SttProvider>>,
    ai: HashMap<String, Arc<dyn AiProvider>>,
    tts: HashMap<String, Arc<dyn TtsProvider>>,
    default_stt: Option<String>,
    default_ai: Option<String>,
    default_tts: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an STT provider under its own reported name.
    pub fn register_stt(&mut self, provider: Arc<dyn SttProvider>) {
        let name = provider.name().to_string();
        if self.default_stt.is_none() {
            self.default_stt = Some(name.clone());
        }
        self.stt.insert(name, provider);
    }

    /// Registers an AI provider under its own reported name.
    pub fn register_ai(&mut self, provider: Arc<dyn AiProvider>) {
        let name = provider.name().to_string();
        if self.default_ai.is_none() {
            self.default_ai = Some(name.clone());
        }
        self.ai.insert(name, provider);
    }

    /// Registers a TTS provider under its own reported name.
    pub fn register_tts(&mut self, provider: Arc<dyn TtsProvider>) {
        let name = provider.name().to_string();
        if self.default_tts.is_none() {
            self.default_tts = Some(name.clone());
        }
        self.tts.insert(name, provider);
    }

    /// Changes the default provider for a role.
    ///
    /// The name must already be registered for that role.
    pub fn set_default(&mut self, role: ProviderRole, name: &str) -> Result<(), RegistryError> {
        let known = match role {
            ProviderRole::Stt => self.stt.contains_key(name),
            ProviderRole::Ai => self.ai.contains_key(name),
            ProviderRole::Tts => self.tts.contains_key(name),
        };
        if !known {
            return Err(RegistryError::UnknownProvider {
                role,
                name: name.to_string(),
            });
        }
        match role {
            ProviderRole::Stt => self.default_stt = Some(name.to_string()),
            ProviderRole::Ai => self.default_ai = Some(name.to_string()),
            ProviderRole::Tts => self.default_tts = Some(name.to_string()),
        }
        Ok(())
    }

    /// Resolves an STT capability: explicit name, or the role default.
    pub fn resolve_stt(
        &self,
        explicit: Option<&str>,
    ) -> Result<Arc<dyn SttProvider>, RegistryError> {
        let name = match explicit {
            Some(n) => n,
            None => self
                .default_stt
                .as_deref()
                .ok_or(RegistryError::EmptyRole(ProviderRole::Stt))?,
        };
        self.stt
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProvider {
                role: ProviderRole::Stt,
                name: name.to_string(),
            })
    }

    /// Resolves an AI capability: explicit name, or the role default.
    pub fn resolve_ai(&self, explicit: Option<&str>) -> Result<Arc<dyn AiProvider>, RegistryError> {
        let name = match explicit {
            Some(n) => n,
            None => self
                .default_ai
                .as_deref()
                .ok_or(RegistryError::EmptyRole(ProviderRole::Ai))?,
        };
        self.ai
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProvider {
                role: ProviderRole::Ai,
                name: name.to_string(),
            })
    }

    /// Resolves a TTS capability: explicit name, or the role default.
    pub fn resolve_tts(
        &self,
        explicit: Option<&str>,
    ) -> Result<Arc<dyn TtsProvider>, RegistryError> {
        let name = match explicit {
            Some(n) => n,
            None => self
                .default_tts
                .as_deref()
                .ok_or(RegistryError::EmptyRole(ProviderRole::Tts))?,
        };
        self.tts
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProvider {
                role: ProviderRole::Tts,
                name: name.to_string(),
            })
    }

    /// Returns the role → provider-name table for discovery.
    pub fn catalog(&self) -> ProviderCatalog {
        let sorted = |m: Vec<String>| {
            let mut v = m;
            v.sort();
            v
        };
        let mut defaults = HashMap::new();
        if let Some(n) = &self.default_stt {
            defaults.insert("stt".to_string(), n.clone());
        }
        if let Some(n) = &self.default_ai {
            defaults.insert("ai".to_string(), n.clone());
        }
        if let Some(n) = &self.default_tts {
            defaults.insert("tts".to_string(), n.clone());
        }
        ProviderCatalog {
            stt: sorted(self.stt.keys().cloned().collect()),
            ai: sorted(self.ai.keys().cloned().collect()),
            tts: sorted(self.tts.keys().cloned().collect()),
            defaults,
        }
    }
}
