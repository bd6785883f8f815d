//! Triple (request, información de entrada, información de salida).
//!
//! Unidad de trabajo auto-contenida para repartir entre workers: clones
//! profundos sin referencias a la arena del pipeline, así cada worker opera
//! sobre su copia sin sincronización.

use grid_meta::MetadataStore;

use crate::request::{Request, RequestKind};

#[derive(Debug)]
pub struct RequestTriple {
    pub kind: RequestKind,
    pub from_output_port: usize,
    pub input_info: Vec<Vec<MetadataStore>>,
    pub output_info: Vec<MetadataStore>,
}

impl RequestTriple {
    pub fn new(request: &Request,
               input_info: &[Vec<MetadataStore>],
               output_info: &[MetadataStore])
               -> RequestTriple {
        RequestTriple { kind: request.kind(),
                        from_output_port: request.from_output_port(),
                        input_info: input_info.iter()
                                              .map(|conns| {
                                                  conns.iter()
                                                       .map(MetadataStore::deep_clone)
                                                       .collect()
                                              })
                                              .collect(),
                        output_info: output_info.iter().map(MetadataStore::deep_clone).collect() }
    }

    /// Copia independiente para un worker.
    pub fn clone_for_worker(&self) -> RequestTriple {
        RequestTriple { kind: self.kind,
                        from_output_port: self.from_output_port,
                        input_info: self.input_info
                                        .iter()
                                        .map(|conns| {
                                            conns.iter()
                                                 .map(MetadataStore::deep_clone)
                                                 .collect()
                                        })
                                        .collect(),
                        output_info: self.output_info
                                         .iter()
                                         .map(MetadataStore::deep_clone)
                                         .collect() }
    }

    /// Request fresco equivalente al original.
    pub fn request(&self) -> Request {
        Request::new(self.kind, self.from_output_port)
    }
}
