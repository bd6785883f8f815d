//! Store heterogéneo de metadatos.
//!
//! Mapa key→valor con:
//! - chequeo de kind en runtime sobre el conjunto cerrado `ValueKind`,
//! - lecturas infalibles (ausente ⇒ default del kind o `Option`),
//! - notificación de cambio sólo cuando el valor realmente cambia,
//! - copy/append superficial o profundo entre stores,
//! - iterador snapshot con invalidación por contador de generación,
//! - a lo sumo una `RequestKey` activa por store (campo marcador, no entrada).
//!
//! El store no es thread-safe por sí mismo: el protocolo del pipeline es
//! cooperativo y single-threaded, y el fan-out a workers pasa por clones
//! profundos (ver `RequestTriple` en grid-core).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::MetaError;
use crate::key::KeyRef;
use crate::value::{Value, ValueKind};

/// Callback notificado con la key cuyo valor cambió o fue removido.
pub type ChangeListener = Box<dyn Fn(KeyRef) + Send + Sync>;

pub struct MetadataStore {
    entries: IndexMap<KeyRef, Value>,
    /// Contador bump-on-mutation; los iteradores guardan un snapshot.
    generation: Arc<AtomicU64>,
    active_request: Option<KeyRef>,
    listeners: Vec<ChangeListener>,
}

impl MetadataStore {
    pub fn new() -> MetadataStore {
        MetadataStore { entries: IndexMap::new(),
                        generation: Arc::new(AtomicU64::new(0)),
                        active_request: None,
                        listeners: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserta o reemplaza el valor bajo `key`.
    ///
    /// - Kind distinto al declarado por la key ⇒ `Err(KindMismatch)`.
    /// - Vector de longitud distinta a la fija de la key ⇒ remueve la entrada,
    ///   loguea warn y devuelve `Ok(false)`.
    /// - Valor igual al existente ⇒ `Ok(false)` sin notificar.
    /// - Cambio real ⇒ notifica listeners y devuelve `Ok(true)`.
    pub fn set_value(&mut self, key: KeyRef, value: Value) -> Result<bool, MetaError> {
        if value.kind() != key.kind() {
            return Err(MetaError::KindMismatch { key: key.to_string(),
                                                 expected: key.kind(),
                                                 got: value.kind() });
        }
        if let Some(required) = key.fixed_length() {
            let len = value.length().unwrap_or(0);
            if len != required {
                log::warn!("key '{key}' requiere longitud {required}, recibió {len}; entrada removida");
                self.remove(key);
                return Ok(false);
            }
        }
        Ok(self.insert(key, value))
    }

    fn insert(&mut self, key: KeyRef, value: Value) -> bool {
        if self.entries.get(&key) == Some(&value) {
            return false;
        }
        self.entries.insert(key, value);
        self.touch(key);
        true
    }

    pub fn get_value(&self, key: KeyRef) -> Option<&Value> {
        self.entries.get(&key)
    }

    /// Lectura con default del kind si la key está ausente. Las keys de
    /// objeto opaco no tienen default: ausente es `None`.
    pub fn get_or_default(&self, key: KeyRef) -> Option<Value> {
        self.entries.get(&key).cloned().or_else(|| Value::default_for(key.kind()))
    }

    pub fn has(&self, key: KeyRef) -> bool {
        if key.kind() == ValueKind::Request {
            return self.active_request == Some(key);
        }
        self.entries.contains_key(&key)
    }

    /// Remueve la entrada; notifica sólo si existía.
    pub fn remove(&mut self, key: KeyRef) -> bool {
        if self.entries.shift_remove(&key).is_some() {
            self.touch(key);
            true
        } else {
            false
        }
    }

    /// Vacía el store y el marcador de request.
    pub fn clear(&mut self) {
        let keys = self.keys();
        self.entries.clear();
        self.active_request = None;
        for key in keys {
            self.touch(key);
        }
    }

    /// Reemplaza el contenido con el de `other` (clear + append).
    pub fn copy(&mut self, other: &MetadataStore, deep: bool) {
        self.clear();
        self.append(other, deep);
    }

    /// Fusiona las entradas de `other` sobre las propias. `deep` reconstruye
    /// stores anidados; los objetos opacos comparten referencia en ambos
    /// modos.
    pub fn append(&mut self, other: &MetadataStore, deep: bool) {
        for (key, value) in &other.entries {
            let copied = if deep { value.deep_clone() } else { value.shallow_clone() };
            self.insert(key, copied);
        }
        if let Some(marker) = other.active_request {
            self.set_request(marker);
        }
    }

    /// Copia una sola entrada desde `other` (ausente allá ⇒ remueve acá).
    pub fn copy_entry(&mut self, other: &MetadataStore, key: KeyRef, deep: bool) {
        match other.entries.get(&key) {
            Some(value) => {
                let copied = if deep { value.deep_clone() } else { value.shallow_clone() };
                self.insert(key, copied);
            }
            None => {
                self.remove(key);
            }
        }
    }

    /// Snapshot de las keys presentes, en orden de inserción.
    pub fn keys(&self) -> Vec<KeyRef> {
        self.entries.keys().copied().collect()
    }

    /// Iterador snapshot sobre las keys; ver `StoreIterator`.
    pub fn iter(&self) -> StoreIterator {
        StoreIterator { keys: self.keys(),
                        index: 0,
                        seen: self.generation.load(Ordering::Acquire),
                        generation: Arc::clone(&self.generation) }
    }

    pub fn add_listener(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Instala `key` como marcador de request activo. Si otra RequestKey ya
    /// estaba activa gana la última escritura y queda un warn en el log.
    pub fn set_request(&mut self, key: KeyRef) {
        match self.active_request {
            Some(current) if current == key => {}
            Some(current) => {
                log::warn!("request '{key}' reemplaza al marcador activo '{current}'");
                self.active_request = Some(key);
                self.touch(key);
            }
            None => {
                self.active_request = Some(key);
                self.touch(key);
            }
        }
    }

    /// Limpia el marcador sólo si `key` es el activo.
    pub fn clear_request(&mut self, key: KeyRef) {
        if self.active_request == Some(key) {
            self.active_request = None;
            self.touch(key);
        }
    }

    pub fn active_request(&self) -> Option<KeyRef> {
        self.active_request
    }

    /// Clon profundo: stores anidados reconstruidos, objetos compartidos,
    /// listeners no viajan.
    pub fn deep_clone(&self) -> MetadataStore {
        let mut out = MetadataStore::new();
        out.append(self, true);
        out
    }

    fn touch(&mut self, key: KeyRef) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        for listener in &self.listeners {
            listener(key);
        }
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        MetadataStore::new()
    }
}

impl Clone for MetadataStore {
    /// Clon superficial: valores compartidos comparten referencia, el
    /// contador de generación arranca de cero y los listeners no viajan.
    fn clone(&self) -> MetadataStore {
        let mut out = MetadataStore::new();
        out.append(self, false);
        out
    }
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            map.entry(&format_args!("{key}"), value);
        }
        map.finish()
    }
}

/// Iterador snapshot de keys de un store.
///
/// Cualquier mutación del store posterior al snapshot invalida el iterador:
/// `next()` devuelve `None` y `is_valid()` pasa a `false`. `restart()` toma
/// un snapshot fresco del mismo store (o de otro).
pub struct StoreIterator {
    keys: Vec<KeyRef>,
    index: usize,
    seen: u64,
    generation: Arc<AtomicU64>,
}

impl StoreIterator {
    /// `false` si el store mutó desde que se tomó el snapshot.
    pub fn is_valid(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.seen
    }

    /// Retoma desde el estado actual de `store`.
    pub fn restart(&mut self, store: &MetadataStore) {
        self.keys = store.keys();
        self.index = 0;
        self.seen = store.generation();
        self.generation = Arc::clone(&store.generation);
    }
}

impl Iterator for StoreIterator {
    type Item = KeyRef;

    fn next(&mut self) -> Option<KeyRef> {
        if !self.is_valid() {
            return None;
        }
        let key = self.keys.get(self.index).copied()?;
        self.index += 1;
        Some(key)
    }
}
