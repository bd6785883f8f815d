//! Objetos de dato producidos por el pipeline.
//!
//! El payload es un árbol JSON neutral (el núcleo no interpreta la grilla en
//! sí); lo que el protocolo necesita vive en la información adjunta: los
//! sellos de ejecución `DATA_*` y el extent realmente producido.

use grid_meta::MetadataStore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::extent::Extent;
use crate::keys;

/// Clase estructural del dato, fijada por puerto de salida en la pasada de
/// objetos de dato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// Grilla estructurada 3D direccionable por extent.
    StructuredGrid,
    /// Colección no estructurada direccionable por pieza.
    UnstructuredPieces,
    /// Tabla plana (también por pieza).
    Table,
}

/// Modo de direccionamiento del subconjunto que el dato admite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentMode {
    ThreeD,
    Pieces,
}

impl DataKind {
    pub fn extent_mode(self) -> ExtentMode {
        match self {
            DataKind::StructuredGrid => ExtentMode::ThreeD,
            DataKind::UnstructuredPieces | DataKind::Table => ExtentMode::Pieces,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataObject {
    pub kind: DataKind,
    pub payload: JsonValue,
    pub information: MetadataStore,
}

impl DataObject {
    pub fn new(kind: DataKind) -> DataObject {
        DataObject { kind,
                     payload: JsonValue::Null,
                     information: MetadataStore::new() }
    }

    /// Extent estampado como producido, si lo hay.
    pub fn data_extent(&self) -> Extent {
        keys::get_extent(keys::data_extent(), &self.information)
    }

    /// Recorta el dato al extent pedido (modo exacto). El payload queda
    /// marcado con el recorte; el sello `DATA_EXTENT` pasa a ser el pedido.
    pub fn crop(&mut self, target: &Extent) {
        let produced = self.data_extent();
        if produced.contains(target) && produced != *target {
            let clipped = produced.intersect(target);
            if let JsonValue::Object(map) = &mut self.payload {
                map.insert("cropped_to".to_string(),
                           serde_json::json!(clipped.to_vec()));
            }
            keys::set_extent(keys::data_extent(), &mut self.information, &clipped);
        }
    }
}
