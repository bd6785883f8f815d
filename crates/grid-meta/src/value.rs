//! Valores heterogéneos del store.
//!
//! Rol en el núcleo:
//! - `ValueKind` es el conjunto cerrado de kinds soportados; el dispatch
//!   polimórfico por key (copy/print/default) se resuelve sobre este enum en
//!   lugar de una jerarquía de herencia.
//! - `Value` es la variante etiquetada que el `MetadataStore` mapea por key.
//! - Objetos opacos compartidos externamente se guardan como
//!   `Arc<dyn ObjectValue>`: el conteo atómico de referencias da la semántica
//!   retain/release, con liberación determinista al sobreescribir o remover.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::key::KeyRef;
use crate::store::MetadataStore;

/// Objeto opaco compartible referenciado desde un store.
///
/// El store retiene el objeto (clona el `Arc`) al guardarlo y suelta la
/// referencia anterior al sobreescribir o remover la entrada.
pub trait ObjectValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Conjunto cerrado de kinds de valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    UnsignedInteger,
    Identifier,
    Double,
    String,
    IntegerVector,
    DoubleVector,
    StringVector,
    KeyVector,
    ObjectVector,
    Store,
    Object,
    Request,
}

impl ValueKind {
    /// Kinds que representan vectores (soportan append/length).
    pub fn is_vector(&self) -> bool {
        matches!(self,
                 ValueKind::IntegerVector
                 | ValueKind::DoubleVector
                 | ValueKind::StringVector
                 | ValueKind::KeyVector
                 | ValueKind::ObjectVector)
    }
}

/// Valor heterogéneo almacenado bajo una key.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    UnsignedInteger(u64),
    Identifier(i64),
    Double(f64),
    String(String),
    IntegerVector(Vec<i64>),
    DoubleVector(Vec<f64>),
    StringVector(Vec<String>),
    KeyVector(Vec<KeyRef>),
    ObjectVector(Vec<Arc<dyn ObjectValue>>),
    Store(Arc<MetadataStore>),
    Object(Arc<dyn ObjectValue>),
    Request,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::UnsignedInteger(_) => ValueKind::UnsignedInteger,
            Value::Identifier(_) => ValueKind::Identifier,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::IntegerVector(_) => ValueKind::IntegerVector,
            Value::DoubleVector(_) => ValueKind::DoubleVector,
            Value::StringVector(_) => ValueKind::StringVector,
            Value::KeyVector(_) => ValueKind::KeyVector,
            Value::ObjectVector(_) => ValueKind::ObjectVector,
            Value::Store(_) => ValueKind::Store,
            Value::Object(_) => ValueKind::Object,
            Value::Request => ValueKind::Request,
        }
    }

    /// Valor por defecto de un kind. Leer una key escalar ausente devuelve
    /// este valor, nunca un error. Los objetos opacos no tienen default
    /// (`None`): el acceso tipado es vía `Option`.
    pub fn default_for(kind: ValueKind) -> Option<Value> {
        let value = match kind {
            ValueKind::Integer => Value::Integer(0),
            ValueKind::UnsignedInteger => Value::UnsignedInteger(0),
            ValueKind::Identifier => Value::Identifier(0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::IntegerVector => Value::IntegerVector(Vec::new()),
            ValueKind::DoubleVector => Value::DoubleVector(Vec::new()),
            ValueKind::StringVector => Value::StringVector(Vec::new()),
            ValueKind::KeyVector => Value::KeyVector(Vec::new()),
            ValueKind::ObjectVector => Value::ObjectVector(Vec::new()),
            ValueKind::Store => Value::Store(Arc::new(MetadataStore::new())),
            ValueKind::Object => return None,
            ValueKind::Request => Value::Request,
        };
        Some(value)
    }

    /// Copia superficial: los valores compartidos (objetos, stores anidados)
    /// comparten la referencia.
    pub fn shallow_clone(&self) -> Value {
        self.clone()
    }

    /// Copia profunda. Los stores anidados se reconstruyen entrada por
    /// entrada; los objetos opacos no son clonables desde aquí y conservan la
    /// referencia compartida.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Store(s) => Value::Store(Arc::new(s.deep_clone())),
            other => other.clone(),
        }
    }

    /// Longitud si el valor es vectorial.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::IntegerVector(v) => Some(v.len()),
            Value::DoubleVector(v) => Some(v.len()),
            Value::StringVector(v) => Some(v.len()),
            Value::KeyVector(v) => Some(v.len()),
            Value::ObjectVector(v) => Some(v.len()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::UnsignedInteger(a), Value::UnsignedInteger(b)) => a == b,
            (Value::Identifier(a), Value::Identifier(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::IntegerVector(a), Value::IntegerVector(b)) => a == b,
            (Value::DoubleVector(a), Value::DoubleVector(b)) => a == b,
            (Value::StringVector(a), Value::StringVector(b)) => a == b,
            (Value::KeyVector(a), Value::KeyVector(b)) => a == b,
            // Objetos y stores comparan por identidad de referencia.
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Store(a), Value::Store(b)) => Arc::ptr_eq(a, b),
            (Value::ObjectVector(a), Value::ObjectVector(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y))
            }
            (Value::Request, Value::Request) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "Integer({v})"),
            Value::UnsignedInteger(v) => write!(f, "UnsignedInteger({v})"),
            Value::Identifier(v) => write!(f, "Identifier({v})"),
            Value::Double(v) => write!(f, "Double({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::IntegerVector(v) => write!(f, "IntegerVector({v:?})"),
            Value::DoubleVector(v) => write!(f, "DoubleVector({v:?})"),
            Value::StringVector(v) => write!(f, "StringVector({v:?})"),
            Value::KeyVector(v) => {
                let names: Vec<&str> = v.iter().map(|k| k.name()).collect();
                write!(f, "KeyVector({names:?})")
            }
            Value::ObjectVector(v) => write!(f, "ObjectVector(len={})", v.len()),
            Value::Store(s) => write!(f, "Store(len={})", s.len()),
            Value::Object(o) => write!(f, "Object({o:?})"),
            Value::Request => write!(f, "Request"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Representación corta para diagnósticos (capacidad "print" por key).
        write!(f, "{self:?}")
    }
}
