//! Keys tipadas del store.
//!
//! Cada `Key` es una identidad global `(name, location)` inmutable con un
//! `ValueKind` fijo. Las keys viven como singletons `&'static Key` (statics
//! `Lazy` o `leak()` para keys construidas dinámicamente) y se registran de
//! forma explícita en un `KeyRegistry` — sin trucos de inicialización
//! estática ordenada.
//!
//! Los wrappers tipados (`IntegerKey`, `DoubleVectorKey`, ...) dan accesores
//! infalibles por tipo nativo; el acceso genérico (`set_value`/`get_value`)
//! queda en el store con chequeo de kind en runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::store::MetadataStore;
use crate::value::{ObjectValue, Value, ValueKind};

/// Referencia a una key singleton de proceso.
pub type KeyRef = &'static Key;

/// Identificador global tipado de un campo de metadatos.
pub struct Key {
    name: String,
    location: String,
    kind: ValueKind,
    fixed_length: Option<usize>,
}

impl Key {
    pub fn new(name: impl Into<String>, location: impl Into<String>, kind: ValueKind) -> Key {
        Key { name: name.into(),
              location: location.into(),
              kind,
              fixed_length: None }
    }

    /// Key vectorial con longitud requerida fija. Un `Set` con longitud
    /// distinta remueve la key en lugar de guardar un valor malformado.
    pub fn with_length(name: impl Into<String>,
                       location: impl Into<String>,
                       kind: ValueKind,
                       length: usize)
                       -> Key {
        Key { name: name.into(),
              location: location.into(),
              kind,
              fixed_length: Some(length) }
    }

    /// Promueve una key construida dinámicamente a singleton de proceso.
    pub fn leak(self) -> KeyRef {
        Box::leak(Box::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn location(&self) -> &str {
        &self.location
    }
    pub fn kind(&self) -> ValueKind {
        self.kind
    }
    pub fn fixed_length(&self) -> Option<usize> {
        self.fixed_length
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        self.name == other.name && self.location == other.location
    }
}
impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.location.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}::{} {:?})", self.location, self.name, self.kind)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.location, self.name)
    }
}

// Wrappers escalares: mismo esqueleto, tipo nativo distinto.
macro_rules! scalar_key {
    ($(#[$doc:meta])* $wrapper:ident, $kind:ident, $native:ty, $variant:ident, $default:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $wrapper(Key);

        impl $wrapper {
            pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
                Self(Key::new(name, location, ValueKind::$kind))
            }

            pub fn leaked(name: impl Into<String>, location: impl Into<String>) -> &'static Self {
                Box::leak(Box::new(Self::new(name, location)))
            }

            pub fn key(&'static self) -> KeyRef {
                &self.0
            }

            /// Inserta o reemplaza; devuelve si el valor cambió.
            pub fn set(&'static self, store: &mut MetadataStore, v: $native) -> bool {
                store.set_value(self.key(), Value::$variant(v)).unwrap_or(false)
            }

            /// Lee el valor o el default del tipo si la key está ausente.
            pub fn get(&'static self, store: &MetadataStore) -> $native {
                match store.get_value(self.key()) {
                    Some(Value::$variant(v)) => v.clone(),
                    _ => $default,
                }
            }

            pub fn has(&'static self, store: &MetadataStore) -> bool {
                store.has(self.key())
            }

            pub fn remove(&'static self, store: &mut MetadataStore) {
                store.remove(self.key());
            }
        }
    };
}

scalar_key!(/// Key de entero con signo.
            IntegerKey, Integer, i64, Integer, 0);
scalar_key!(/// Key de entero sin signo.
            UnsignedIntegerKey, UnsignedInteger, u64, UnsignedInteger, 0);
scalar_key!(/// Key de identificador (ancho de índice del dataset).
            IdentifierKey, Identifier, i64, Identifier, 0);
scalar_key!(/// Key de doble precisión.
            DoubleKey, Double, f64, Double, 0.0);
scalar_key!(/// Key de cadena.
            StringKey, String, String, String, String::new());

// Wrappers vectoriales: agregan append (crecer de a uno) y length.
macro_rules! vector_key {
    ($(#[$doc:meta])* $wrapper:ident, $kind:ident, $elem:ty, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $wrapper(Key);

        impl $wrapper {
            pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
                Self(Key::new(name, location, ValueKind::$kind))
            }

            /// Variante con longitud requerida fija.
            pub fn with_length(name: impl Into<String>,
                               location: impl Into<String>,
                               length: usize)
                               -> Self {
                Self(Key::with_length(name, location, ValueKind::$kind, length))
            }

            pub fn leaked(name: impl Into<String>, location: impl Into<String>) -> &'static Self {
                Box::leak(Box::new(Self::new(name, location)))
            }

            pub fn key(&'static self) -> KeyRef {
                &self.0
            }

            pub fn set(&'static self, store: &mut MetadataStore, v: Vec<$elem>) -> bool {
                store.set_value(self.key(), Value::$variant(v)).unwrap_or(false)
            }

            pub fn get(&'static self, store: &MetadataStore) -> Vec<$elem> {
                match store.get_value(self.key()) {
                    Some(Value::$variant(v)) => v.clone(),
                    _ => Vec::new(),
                }
            }

            /// Crece el vector en un elemento (crea la key si está ausente).
            /// La política de longitud fija aplica sobre el vector resultante.
            pub fn append(&'static self, store: &mut MetadataStore, elem: $elem) {
                let mut v = self.get(store);
                v.push(elem);
                let _ = store.set_value(self.key(), Value::$variant(v));
            }

            pub fn length(&'static self, store: &MetadataStore) -> usize {
                store.get_value(self.key()).and_then(|v| v.length()).unwrap_or(0)
            }

            pub fn has(&'static self, store: &MetadataStore) -> bool {
                store.has(self.key())
            }

            pub fn remove(&'static self, store: &mut MetadataStore) {
                store.remove(self.key());
            }
        }
    };
}

vector_key!(/// Key de vector de enteros (opcionalmente de longitud fija).
            IntegerVectorKey, IntegerVector, i64, IntegerVector);
vector_key!(/// Key de vector de dobles.
            DoubleVectorKey, DoubleVector, f64, DoubleVector);
vector_key!(/// Key de vector de cadenas.
            StringVectorKey, StringVector, String, StringVector);
vector_key!(/// Key de vector de keys (listas de keys a copiar/propagar).
            KeyVectorKey, KeyVector, KeyRef, KeyVector);
vector_key!(/// Key de vector de objetos opacos compartidos.
            ObjectVectorKey, ObjectVector, Arc<dyn ObjectValue>, ObjectVector);

/// Key de objeto opaco compartido externamente.
#[derive(Debug)]
pub struct ObjectKey(Key);

impl ObjectKey {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self(Key::new(name, location, ValueKind::Object))
    }

    pub fn leaked(name: impl Into<String>, location: impl Into<String>) -> &'static Self {
        Box::leak(Box::new(Self::new(name, location)))
    }

    pub fn key(&'static self) -> KeyRef {
        &self.0
    }

    /// Retiene el objeto; la referencia del ocupante anterior se libera al
    /// sobreescribir.
    pub fn set(&'static self, store: &mut MetadataStore, obj: Arc<dyn ObjectValue>) -> bool {
        store.set_value(self.key(), Value::Object(obj)).unwrap_or(false)
    }

    pub fn get(&'static self, store: &MetadataStore) -> Option<Arc<dyn ObjectValue>> {
        match store.get_value(self.key()) {
            Some(Value::Object(o)) => Some(Arc::clone(o)),
            _ => None,
        }
    }

    /// Lectura con downcast al tipo concreto.
    pub fn get_downcast<T: ObjectValue>(&'static self, store: &MetadataStore) -> Option<Arc<dyn ObjectValue>>
        where T: Sized
    {
        self.get(store).filter(|o| o.as_any().is::<T>())
    }

    pub fn has(&'static self, store: &MetadataStore) -> bool {
        store.has(self.key())
    }

    pub fn remove(&'static self, store: &mut MetadataStore) {
        store.remove(self.key());
    }
}

/// Key de store anidado.
#[derive(Debug)]
pub struct StoreKey(Key);

impl StoreKey {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self(Key::new(name, location, ValueKind::Store))
    }

    pub fn leaked(name: impl Into<String>, location: impl Into<String>) -> &'static Self {
        Box::leak(Box::new(Self::new(name, location)))
    }

    pub fn key(&'static self) -> KeyRef {
        &self.0
    }

    pub fn set(&'static self, store: &mut MetadataStore, nested: Arc<MetadataStore>) -> bool {
        store.set_value(self.key(), Value::Store(nested)).unwrap_or(false)
    }

    pub fn get(&'static self, store: &MetadataStore) -> Option<Arc<MetadataStore>> {
        match store.get_value(self.key()) {
            Some(Value::Store(s)) => Some(Arc::clone(s)),
            _ => None,
        }
    }

    pub fn has(&'static self, store: &MetadataStore) -> bool {
        store.has(self.key())
    }

    pub fn remove(&'static self, store: &mut MetadataStore) {
        store.remove(self.key());
    }
}

/// Key marcadora de request.
///
/// `set()` instala esta key como el marcador de request activo del store; a
/// lo sumo una RequestKey puede estar activa por store. Un segundo `set()`
/// con otra key loguea un conflicto y gana la última escritura.
#[derive(Debug)]
pub struct RequestKey(Key);

impl RequestKey {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self(Key::new(name, location, ValueKind::Request))
    }

    pub fn leaked(name: impl Into<String>, location: impl Into<String>) -> &'static Self {
        Box::leak(Box::new(Self::new(name, location)))
    }

    pub fn key(&'static self) -> KeyRef {
        &self.0
    }

    pub fn set(&'static self, store: &mut MetadataStore) {
        store.set_request(self.key());
    }

    pub fn has(&'static self, store: &MetadataStore) -> bool {
        store.active_request() == Some(self.key())
    }

    pub fn remove(&'static self, store: &mut MetadataStore) {
        store.clear_request(self.key());
    }
}
