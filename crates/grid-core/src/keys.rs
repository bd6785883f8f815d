//! Keys del protocolo de pipeline.
//!
//! Tres familias, separadas por `location`:
//! - `gridflow.request`: marcadores de pasada y routing del request.
//! - `gridflow.pipeline`: negociación (extents pedidos, piezas, tiempo,
//!   capacidades declaradas por el algoritmo).
//! - `gridflow.data`: sellos de ejecución estampados en la información del
//!   dato producido, comparados contra lo negociado para decidir re-ejecución.
//!
//! Cada key es un singleton `Lazy` accesible por función; `register_pipeline_keys`
//! las inscribe todas en un registro para deserialización y tooling.

use grid_meta::{DoubleKey, DoubleVectorKey, IntegerKey, IntegerVectorKey, KeyRegistry,
                KeyVectorKey, MetadataStore, RequestKey};
use once_cell::sync::Lazy;

use crate::extent::Extent;

const REQUEST_LOC: &str = "gridflow.request";
const PIPELINE_LOC: &str = "gridflow.pipeline";
const DATA_LOC: &str = "gridflow.data";

macro_rules! pipeline_key {
    ($fn_name:ident, $wrapper:ty, $ctor:expr) => {
        pub fn $fn_name() -> &'static $wrapper {
            static KEY: Lazy<$wrapper> = Lazy::new($ctor);
            &KEY
        }
    };
}

// -- marcadores de pasada -------------------------------------------------

pipeline_key!(request_data_object, RequestKey,
              || RequestKey::new("REQUEST_DATA_OBJECT", REQUEST_LOC));
pipeline_key!(request_information, RequestKey,
              || RequestKey::new("REQUEST_INFORMATION", REQUEST_LOC));
pipeline_key!(request_update_extent, RequestKey,
              || RequestKey::new("REQUEST_UPDATE_EXTENT", REQUEST_LOC));
pipeline_key!(request_update_time, RequestKey,
              || RequestKey::new("REQUEST_UPDATE_TIME", REQUEST_LOC));
pipeline_key!(request_time_dependent_information, RequestKey,
              || RequestKey::new("REQUEST_TIME_DEPENDENT_INFORMATION", REQUEST_LOC));
pipeline_key!(request_data, RequestKey,
              || RequestKey::new("REQUEST_DATA", REQUEST_LOC));

// -- routing dentro del request -------------------------------------------

pipeline_key!(from_output_port, IntegerKey,
              || IntegerKey::new("FROM_OUTPUT_PORT", REQUEST_LOC));
pipeline_key!(continue_executing, IntegerKey,
              || IntegerKey::new("CONTINUE_EXECUTING", REQUEST_LOC));

// -- negociación -----------------------------------------------------------

pipeline_key!(whole_extent, IntegerVectorKey,
              || IntegerVectorKey::with_length("WHOLE_EXTENT", PIPELINE_LOC, 6));
pipeline_key!(update_extent, IntegerVectorKey,
              || IntegerVectorKey::with_length("UPDATE_EXTENT", PIPELINE_LOC, 6));
pipeline_key!(combined_update_extent, IntegerVectorKey,
              || IntegerVectorKey::with_length("COMBINED_UPDATE_EXTENT", PIPELINE_LOC, 6));
pipeline_key!(update_extent_replace, IntegerKey,
              || IntegerKey::new("UPDATE_EXTENT_REPLACE", PIPELINE_LOC));
pipeline_key!(unrestricted_update_extent, IntegerKey,
              || IntegerKey::new("UNRESTRICTED_UPDATE_EXTENT", PIPELINE_LOC));
pipeline_key!(exact_extent, IntegerKey,
              || IntegerKey::new("EXACT_EXTENT", PIPELINE_LOC));
pipeline_key!(update_piece_number, IntegerKey,
              || IntegerKey::new("UPDATE_PIECE_NUMBER", PIPELINE_LOC));
pipeline_key!(update_number_of_pieces, IntegerKey,
              || IntegerKey::new("UPDATE_NUMBER_OF_PIECES", PIPELINE_LOC));
pipeline_key!(update_number_of_ghost_levels, IntegerKey,
              || IntegerKey::new("UPDATE_NUMBER_OF_GHOST_LEVELS", PIPELINE_LOC));
pipeline_key!(maximum_number_of_pieces, IntegerKey,
              || IntegerKey::new("MAXIMUM_NUMBER_OF_PIECES", PIPELINE_LOC));
pipeline_key!(bounds, DoubleVectorKey,
              || DoubleVectorKey::with_length("BOUNDS", PIPELINE_LOC, 6));
pipeline_key!(time_steps, DoubleVectorKey,
              || DoubleVectorKey::new("TIME_STEPS", PIPELINE_LOC));
pipeline_key!(time_range, DoubleVectorKey,
              || DoubleVectorKey::with_length("TIME_RANGE", PIPELINE_LOC, 2));
pipeline_key!(update_time_step, DoubleKey,
              || DoubleKey::new("UPDATE_TIME_STEP", PIPELINE_LOC));
pipeline_key!(time_dependent_information, IntegerKey,
              || IntegerKey::new("TIME_DEPENDENT_INFORMATION", PIPELINE_LOC));
pipeline_key!(update_resolution, DoubleKey,
              || DoubleKey::new("UPDATE_RESOLUTION", PIPELINE_LOC));
pipeline_key!(split_policy, IntegerKey,
              || IntegerKey::new("SPLIT_POLICY", PIPELINE_LOC));
pipeline_key!(can_handle_piece_request, IntegerKey,
              || IntegerKey::new("CAN_HANDLE_PIECE_REQUEST", PIPELINE_LOC));
pipeline_key!(can_produce_sub_extent, IntegerKey,
              || IntegerKey::new("CAN_PRODUCE_SUB_EXTENT", PIPELINE_LOC));
pipeline_key!(keys_to_copy, KeyVectorKey,
              || KeyVectorKey::new("KEYS_TO_COPY", PIPELINE_LOC));
pipeline_key!(demand_keys, KeyVectorKey,
              || KeyVectorKey::new("DEMAND_KEYS", PIPELINE_LOC));

// -- sellos de ejecución ----------------------------------------------------

pipeline_key!(data_piece_number, IntegerKey,
              || IntegerKey::new("DATA_PIECE_NUMBER", DATA_LOC));
pipeline_key!(data_number_of_pieces, IntegerKey,
              || IntegerKey::new("DATA_NUMBER_OF_PIECES", DATA_LOC));
pipeline_key!(data_number_of_ghost_levels, IntegerKey,
              || IntegerKey::new("DATA_NUMBER_OF_GHOST_LEVELS", DATA_LOC));
pipeline_key!(data_time_step, DoubleKey,
              || DoubleKey::new("DATA_TIME_STEP", DATA_LOC));
pipeline_key!(previous_update_time_step, DoubleKey,
              || DoubleKey::new("PREVIOUS_UPDATE_TIME_STEP", DATA_LOC));
pipeline_key!(data_extent, IntegerVectorKey,
              || IntegerVectorKey::with_length("DATA_EXTENT", DATA_LOC, 6));
pipeline_key!(all_pieces_extent, IntegerVectorKey,
              || IntegerVectorKey::with_length("ALL_PIECES_EXTENT", DATA_LOC, 6));

/// Inscribe todas las keys del protocolo en `registry`.
pub fn register_pipeline_keys(registry: &KeyRegistry) {
    registry.register(request_data_object().key());
    registry.register(request_information().key());
    registry.register(request_update_extent().key());
    registry.register(request_update_time().key());
    registry.register(request_time_dependent_information().key());
    registry.register(request_data().key());
    registry.register(from_output_port().key());
    registry.register(continue_executing().key());
    registry.register(whole_extent().key());
    registry.register(update_extent().key());
    registry.register(combined_update_extent().key());
    registry.register(update_extent_replace().key());
    registry.register(unrestricted_update_extent().key());
    registry.register(exact_extent().key());
    registry.register(update_piece_number().key());
    registry.register(update_number_of_pieces().key());
    registry.register(update_number_of_ghost_levels().key());
    registry.register(maximum_number_of_pieces().key());
    registry.register(bounds().key());
    registry.register(time_steps().key());
    registry.register(time_range().key());
    registry.register(update_time_step().key());
    registry.register(time_dependent_information().key());
    registry.register(update_resolution().key());
    registry.register(split_policy().key());
    registry.register(can_handle_piece_request().key());
    registry.register(can_produce_sub_extent().key());
    registry.register(keys_to_copy().key());
    registry.register(demand_keys().key());
    registry.register(data_piece_number().key());
    registry.register(data_number_of_pieces().key());
    registry.register(data_number_of_ghost_levels().key());
    registry.register(data_time_step().key());
    registry.register(previous_update_time_step().key());
    registry.register(data_extent().key());
    registry.register(all_pieces_extent().key());
}

// -- helpers con defaults del protocolo -------------------------------------

/// Lee un extent de 6 enteros; ausente o malformado ⇒ vacío.
pub fn get_extent(key: &'static IntegerVectorKey, store: &MetadataStore) -> Extent {
    Extent::from_slice(&key.get(store)).unwrap_or(Extent::EMPTY)
}

/// Escribe un extent; devuelve si el valor cambió.
pub fn set_extent(key: &'static IntegerVectorKey, store: &mut MetadataStore, ext: &Extent) -> bool {
    key.set(store, ext.to_vec())
}

pub fn get_whole_extent(store: &MetadataStore) -> Extent {
    get_extent(whole_extent(), store)
}

pub fn get_update_extent(store: &MetadataStore) -> Extent {
    get_extent(update_extent(), store)
}

pub fn set_update_extent(store: &mut MetadataStore, ext: &Extent) -> bool {
    set_extent(update_extent(), store, ext)
}

/// Pide todo el dato: extent completo y tupla pieza única sin fantasmas.
pub fn set_update_extent_to_whole_extent(store: &mut MetadataStore) -> bool {
    let whole = get_whole_extent(store);
    let mut changed = set_update_extent(store, &whole);
    changed |= update_piece_number().set(store, 0);
    changed |= update_number_of_pieces().set(store, 1);
    changed |= update_number_of_ghost_levels().set(store, 0);
    changed
}

/// Número de piezas pedido; ausente ⇒ 1.
pub fn get_update_number_of_pieces(store: &MetadataStore) -> i64 {
    if update_number_of_pieces().has(store) {
        update_number_of_pieces().get(store)
    } else {
        1
    }
}

pub fn get_update_piece(store: &MetadataStore) -> i64 {
    update_piece_number().get(store)
}

pub fn get_update_ghost_levels(store: &MetadataStore) -> i64 {
    update_number_of_ghost_levels().get(store)
}

/// Flag entero interpretado como booleano (ausente ⇒ false).
pub fn get_flag(key: &'static IntegerKey, store: &MetadataStore) -> bool {
    key.get(store) != 0
}

pub fn set_flag(key: &'static IntegerKey, store: &mut MetadataStore, value: bool) -> bool {
    key.set(store, i64::from(value))
}
