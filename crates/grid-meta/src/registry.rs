//! Registro explícito de keys.
//!
//! Resuelve `(name, location)` → `KeyRef` para deserialización y tooling.
//! El registro es un objeto explícito con registración idempotente; no hay
//! dependencia del orden de inicialización estática. Un registro global de
//! proceso está disponible vía `global_registry()` para el caso común.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::key::KeyRef;

pub struct KeyRegistry {
    keys: RwLock<HashMap<(String, String), KeyRef>>,
}

impl KeyRegistry {
    pub fn new() -> KeyRegistry {
        KeyRegistry { keys: RwLock::new(HashMap::new()) }
    }

    /// Registra la key. Re-registrar la misma key es un no-op; una key
    /// distinta con la misma identidad se ignora con warn (gana la primera).
    pub fn register(&self, key: KeyRef) {
        let identity = (key.name().to_string(), key.location().to_string());
        let mut map = self.keys.write().expect("key registry lock poisoned");
        match map.get(&identity) {
            Some(existing) if std::ptr::eq(*existing, key) => {}
            Some(_) => {
                log::warn!("key '{key}' ya registrada con otra definición; se conserva la primera");
            }
            None => {
                map.insert(identity, key);
            }
        }
    }

    pub fn find(&self, name: &str, location: &str) -> Option<KeyRef> {
        let map = self.keys.read().expect("key registry lock poisoned");
        map.get(&(name.to_string(), location.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.read().expect("key registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot de todas las keys registradas.
    pub fn keys(&self) -> Vec<KeyRef> {
        self.keys.read().expect("key registry lock poisoned").values().copied().collect()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        KeyRegistry::new()
    }
}

static GLOBAL: Lazy<KeyRegistry> = Lazy::new(KeyRegistry::new);

/// Registro global del proceso.
pub fn global_registry() -> &'static KeyRegistry {
    &GLOBAL
}
