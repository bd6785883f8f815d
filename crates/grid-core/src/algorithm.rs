//! Seam entre el executive y los algoritmos.
//!
//! Un `Algorithm` no ve el grafo: recibe un `Request` y un contexto con las
//! vistas de información y dato de sus puertos, responde a la pasada marcada
//! y devuelve éxito. El executive es dueño de los stores; el algoritmo sólo
//! los muta a través del contexto.

use std::any::Any;
use std::fmt;

use grid_meta::MetadataStore;

use crate::data::{DataKind, DataObject};
use crate::request::Request;

/// Vista de una conexión de entrada durante una pasada.
///
/// `data` es un clon del dato aguas arriba tomado antes de entrar al nodo;
/// mutarlo no afecta el caché del productor.
pub struct InputSlot<'a> {
    pub info: &'a mut MetadataStore,
    pub data: Option<DataObject>,
}

/// Vista de un puerto de salida durante una pasada.
pub struct OutputSlot<'a> {
    pub info: &'a mut MetadataStore,
    pub data: &'a mut Option<DataObject>,
}

/// Puertos visibles del nodo durante `process_request`.
pub struct RequestContext<'a, 'b> {
    pub inputs: &'a mut [Vec<InputSlot<'b>>],
    pub outputs: &'a mut [OutputSlot<'b>],
}

pub trait Algorithm: fmt::Debug {
    fn num_input_ports(&self) -> usize {
        0
    }

    fn num_output_ports(&self) -> usize {
        1
    }

    /// Clase estructural del dato que produce cada puerto de salida.
    fn output_data_kind(&self, port: usize) -> DataKind;

    /// Tick de la última modificación de parámetros del algoritmo.
    fn modified_time(&self) -> u64;

    /// Responde a la pasada marcada en `request`. `false` aborta la
    /// actualización en curso.
    fn process_request(&mut self, request: &mut Request, ctx: &mut RequestContext<'_, '_>) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
