//! Requests de pasada.
//!
//! Un `Request` es un store propio con el marcador de la pasada instalado,
//! más el routing (puerto de origen, dirección, orden algoritmo/forward).
//! Cada pasada construye su request fresco; nunca se reutiliza entre pasadas.

use std::ops::{Deref, DerefMut};

use grid_meta::{MetadataStore, RequestKey};

use crate::keys;

/// Pasadas del protocolo, en el orden en que `update` las ejecuta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    DataObject,
    Information,
    UpdateExtent,
    UpdateTime,
    TimeDependentInformation,
    Data,
}

impl RequestKind {
    pub fn marker(self) -> &'static RequestKey {
        match self {
            RequestKind::DataObject => keys::request_data_object(),
            RequestKind::Information => keys::request_information(),
            RequestKind::UpdateExtent => keys::request_update_extent(),
            RequestKind::UpdateTime => keys::request_update_time(),
            RequestKind::TimeDependentInformation => {
                keys::request_time_dependent_information()
            }
            RequestKind::Data => keys::request_data(),
        }
    }

    /// Pasadas que viajan de consumidor a productor (la demanda sube); el
    /// resto baja con los metadatos producidos.
    pub fn is_upstream(self) -> bool {
        matches!(self, RequestKind::UpdateExtent | RequestKind::UpdateTime)
    }

    /// Pasadas donde el algoritmo corre antes de reenviar aguas arriba.
    pub fn algorithm_before_forward(self) -> bool {
        self.is_upstream()
    }
}

#[derive(Debug)]
pub struct Request {
    kind: RequestKind,
    store: MetadataStore,
}

impl Request {
    pub fn new(kind: RequestKind, from_output_port: usize) -> Request {
        let mut store = MetadataStore::new();
        kind.marker().set(&mut store);
        keys::from_output_port().set(&mut store, from_output_port as i64);
        Request { kind, store }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn from_output_port(&self) -> usize {
        keys::from_output_port().get(&self.store).max(0) as usize
    }

    /// El algoritmo lo activa durante REQUEST_DATA para pedir otra vuelta de
    /// ejecución con el mismo request (producción por partes).
    pub fn set_continue_executing(&mut self, on: bool) {
        keys::set_flag(keys::continue_executing(), &mut self.store, on);
    }

    pub fn continue_executing(&self) -> bool {
        keys::get_flag(keys::continue_executing(), &self.store)
    }
}

impl Deref for Request {
    type Target = MetadataStore;

    fn deref(&self) -> &MetadataStore {
        &self.store
    }
}

impl DerefMut for Request {
    fn deref_mut(&mut self) -> &mut MetadataStore {
        &mut self.store
    }
}
