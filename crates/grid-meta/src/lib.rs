//! grid-meta: store heterogéneo tipado de metadatos.
//!
//! Piezas:
//! - `value`: conjunto cerrado de kinds (`ValueKind`) y variantes (`Value`).
//! - `key`: identidades globales `(name, location)` y wrappers tipados.
//! - `store`: `MetadataStore` con notificación de cambio e iterador snapshot.
//! - `registry`: resolución explícita `(name, location)` → key.
//! - `serial`: mapeo store ⇄ árbol JSON con tabla de funciones por kind.
//!
//! El store es el sustrato del protocolo de ejecución (grid-core); acá no
//! hay nada de pipelines, sólo datos tipados.

pub mod errors;
pub mod key;
pub mod registry;
pub mod serial;
pub mod store;
pub mod value;

pub use errors::MetaError;
pub use key::{DoubleKey, DoubleVectorKey, IdentifierKey, IntegerKey, IntegerVectorKey, Key,
              KeyRef, KeyVectorKey, ObjectKey, ObjectVectorKey, RequestKey, StoreKey, StringKey,
              StringVectorKey, UnsignedIntegerKey};
pub use registry::{global_registry, KeyRegistry};
pub use serial::SerializerRegistry;
pub use store::{ChangeListener, MetadataStore, StoreIterator};
pub use value::{ObjectValue, Value, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_mismatch_es_error_y_no_muta() {
        let k = IntegerKey::leaked("EJEMPLO", "tests");
        let mut store = MetadataStore::new();
        let err = store.set_value(k.key(), Value::Double(1.5)).unwrap_err();
        assert!(matches!(err, MetaError::KindMismatch { .. }));
        assert!(!store.has(k.key()));
    }

    #[test]
    fn lectura_ausente_devuelve_default() {
        let k = IntegerKey::leaked("AUSENTE", "tests");
        let store = MetadataStore::new();
        assert_eq!(k.get(&store), 0);
        assert_eq!(store.get_or_default(k.key()), Some(Value::Integer(0)));
    }

    #[test]
    fn objeto_ausente_no_tiene_default() {
        let k = ObjectKey::leaked("OPACO", "tests");
        let store = MetadataStore::new();
        assert_eq!(k.get(&store).map(|_| ()), None);
        assert!(store.get_or_default(k.key()).is_none());
    }

    #[test]
    fn set_igual_no_cambia() {
        let k = StringKey::leaked("NOMBRE", "tests");
        let mut store = MetadataStore::new();
        assert!(k.set(&mut store, "a".into()));
        assert!(!k.set(&mut store, "a".into()));
        assert!(k.set(&mut store, "b".into()));
    }
}
