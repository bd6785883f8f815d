//! Serialización de stores a árboles JSON neutrales.
//!
//! La persistencia real queda afuera del núcleo; lo que sí se provee es el
//! mapeo store ⇄ `serde_json::Value` con una tabla de funciones por kind,
//! reemplazable por el integrador. Los kinds no serializables por defecto
//! (Object, ObjectVector, Store como referencia compartida) se saltean con
//! warn; un integrador puede registrar su propia función para ellos.

use std::collections::HashMap;

use serde_json::{json, Value as JsonValue};

use crate::key::KeyRef;
use crate::registry::KeyRegistry;
use crate::store::MetadataStore;
use crate::value::{Value, ValueKind};

pub type SerializeFn = Box<dyn Fn(&MetadataStore, KeyRef) -> Option<JsonValue> + Send + Sync>;
pub type DeserializeFn = Box<dyn Fn(&JsonValue, KeyRef, &mut MetadataStore) -> bool + Send + Sync>;

pub struct SerializerRegistry {
    serializers: HashMap<ValueKind, SerializeFn>,
    deserializers: HashMap<ValueKind, DeserializeFn>,
}

impl SerializerRegistry {
    pub fn empty() -> SerializerRegistry {
        SerializerRegistry { serializers: HashMap::new(),
                             deserializers: HashMap::new() }
    }

    /// Tabla con los kinds de datos planos cubiertos. Object/ObjectVector/
    /// Store/Request quedan sin función y se saltean al serializar.
    pub fn with_defaults() -> SerializerRegistry {
        let mut reg = SerializerRegistry::empty();
        reg.set_pair(ValueKind::Integer,
                     |v| match v {
                         Value::Integer(n) => Some(json!(n)),
                         _ => None,
                     },
                     |tree| tree.as_i64().map(Value::Integer));
        reg.set_pair(ValueKind::UnsignedInteger,
                     |v| match v {
                         Value::UnsignedInteger(n) => Some(json!(n)),
                         _ => None,
                     },
                     |tree| tree.as_u64().map(Value::UnsignedInteger));
        reg.set_pair(ValueKind::Identifier,
                     |v| match v {
                         Value::Identifier(n) => Some(json!(n)),
                         _ => None,
                     },
                     |tree| tree.as_i64().map(Value::Identifier));
        reg.set_pair(ValueKind::Double,
                     |v| match v {
                         Value::Double(n) => Some(json!(n)),
                         _ => None,
                     },
                     |tree| tree.as_f64().map(Value::Double));
        reg.set_pair(ValueKind::String,
                     |v| match v {
                         Value::String(s) => Some(json!(s)),
                         _ => None,
                     },
                     |tree| tree.as_str().map(|s| Value::String(s.to_string())));
        reg.set_pair(ValueKind::IntegerVector,
                     |v| match v {
                         Value::IntegerVector(xs) => Some(json!(xs)),
                         _ => None,
                     },
                     |tree| {
                         let xs: Option<Vec<i64>> =
                             tree.as_array()?.iter().map(JsonValue::as_i64).collect();
                         xs.map(Value::IntegerVector)
                     });
        reg.set_pair(ValueKind::DoubleVector,
                     |v| match v {
                         Value::DoubleVector(xs) => Some(json!(xs)),
                         _ => None,
                     },
                     |tree| {
                         let xs: Option<Vec<f64>> =
                             tree.as_array()?.iter().map(JsonValue::as_f64).collect();
                         xs.map(Value::DoubleVector)
                     });
        reg.set_pair(ValueKind::StringVector,
                     |v| match v {
                         Value::StringVector(xs) => Some(json!(xs)),
                         _ => None,
                     },
                     |tree| {
                         let xs: Option<Vec<String>> = tree.as_array()?
                                                           .iter()
                                                           .map(|e| e.as_str().map(str::to_string))
                                                           .collect();
                         xs.map(Value::StringVector)
                     });
        reg
    }

    fn set_pair<S, D>(&mut self, kind: ValueKind, ser: S, de: D)
        where S: Fn(&Value) -> Option<JsonValue> + Send + Sync + 'static,
              D: Fn(&JsonValue) -> Option<Value> + Send + Sync + 'static
    {
        self.serializers.insert(kind,
                                Box::new(move |store, key| {
                                    store.get_value(key).and_then(&ser)
                                }));
        self.deserializers.insert(kind,
                                  Box::new(move |tree, key, store| match de(tree) {
                                      Some(value) => store.set_value(key, value).is_ok(),
                                      None => false,
                                  }));
    }

    /// Registra funciones custom para un kind (pisa las default).
    pub fn register(&mut self, kind: ValueKind, ser: SerializeFn, de: DeserializeFn) {
        self.serializers.insert(kind, ser);
        self.deserializers.insert(kind, de);
    }

    /// Serializa el store completo a un array `[{name, location, kind, value}]`.
    /// Entradas sin serializador se saltean con warn.
    pub fn store_to_json(&self, store: &MetadataStore) -> JsonValue {
        let mut out = Vec::new();
        for key in store.keys() {
            let Some(ser) = self.serializers.get(&key.kind()) else {
                log::warn!("sin serializador para el kind {:?} de '{key}'; entrada salteada",
                           key.kind());
                continue;
            };
            let Some(value) = ser(store, key) else {
                continue;
            };
            out.push(json!({
                "name": key.name(),
                "location": key.location(),
                "kind": key.kind(),
                "value": value,
            }));
        }
        JsonValue::Array(out)
    }

    /// Puebla `store` desde un árbol producido por `store_to_json`. Las keys
    /// se resuelven por `(name, location)` contra `registry`; las
    /// desconocidas se saltean con warn. Devuelve cuántas entradas cargó.
    pub fn store_from_json(&self,
                           tree: &JsonValue,
                           registry: &KeyRegistry,
                           store: &mut MetadataStore)
                           -> usize {
        let Some(items) = tree.as_array() else {
            log::warn!("árbol de store no es un array; nada que cargar");
            return 0;
        };
        let mut loaded = 0;
        for item in items {
            let (Some(name), Some(location)) =
                (item.get("name").and_then(JsonValue::as_str),
                 item.get("location").and_then(JsonValue::as_str))
            else {
                log::warn!("entrada sin name/location; salteada");
                continue;
            };
            let Some(key) = registry.find(name, location) else {
                log::warn!("key '{location}::{name}' no registrada; entrada salteada");
                continue;
            };
            let Some(de) = self.deserializers.get(&key.kind()) else {
                log::warn!("sin deserializador para el kind {:?} de '{key}'; entrada salteada",
                           key.kind());
                continue;
            };
            let Some(value) = item.get("value") else {
                continue;
            };
            if de(value, key, store) {
                loaded += 1;
            }
        }
        loaded
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        SerializerRegistry::with_defaults()
    }
}
