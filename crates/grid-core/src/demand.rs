//! Demand keys: demandas extensibles negociadas por el protocolo.
//!
//! Un algoritmo declara keys de demanda propias listándolas bajo
//! `DEMAND_KEYS` en la información de su puerto de salida. El executive les
//! aplica tres comportamientos genéricos sobre `Value`, sin subtipos por key:
//! - copiar el valor pedido aguas arriba al propagar extents,
//! - estampar el valor negociado en la información del dato al ejecutar,
//! - comparar sello contra negociado para decidir re-ejecución.

use grid_meta::{KeyRef, MetadataStore};

use crate::keys;

/// Keys de demanda declaradas en la información de un puerto.
pub fn demand_keys_of(info: &MetadataStore) -> Vec<KeyRef> {
    keys::demand_keys().get(info)
}

/// Propaga el valor demandado de `from` a `to` (ausente ⇒ remueve en `to`).
pub fn copy_demand(key: KeyRef, from: &MetadataStore, to: &mut MetadataStore) {
    to.copy_entry(from, key, false);
}

/// Estampa el valor negociado en la información del dato producido.
pub fn store_meta_data(key: KeyRef, pipeline_info: &MetadataStore, data_info: &mut MetadataStore) {
    data_info.copy_entry(pipeline_info, key, false);
}

/// `true` si el sello difiere de lo negociado (o no hay sello y hay demanda).
pub fn needs_execute(key: KeyRef, pipeline_info: &MetadataStore, data_info: &MetadataStore) -> bool {
    match (pipeline_info.get_value(key), data_info.get_value(key)) {
        (Some(wanted), Some(stamped)) => wanted != stamped,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
