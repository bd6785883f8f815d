//! Fuente que produce por partes.
//!
//! Cada vuelta de la fase de datos agrega un chunk y pide continuar hasta
//! completar `total_chunks`; el executive repite la fase mientras el pedido
//! de continuación siga activo.

use std::any::Any;

use grid_core::algorithm::{Algorithm, RequestContext};
use grid_core::data::DataKind;
use grid_core::keys;
use grid_core::mtime::next_mtime;
use grid_core::request::{Request, RequestKind};
use serde_json::json;

#[derive(Debug)]
pub struct ChunkedSource {
    total_chunks: usize,
    produced: usize,
    mtime: u64,
    executions: u64,
}

impl ChunkedSource {
    pub fn new(total_chunks: usize) -> ChunkedSource {
        ChunkedSource { total_chunks: total_chunks.max(1),
                        produced: 0,
                        mtime: next_mtime(),
                        executions: 0 }
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl Algorithm for ChunkedSource {
    fn output_data_kind(&self, _port: usize) -> DataKind {
        DataKind::Table
    }

    fn modified_time(&self) -> u64 {
        self.mtime
    }

    fn process_request(&mut self, request: &mut Request, ctx: &mut RequestContext<'_, '_>) -> bool {
        match request.kind() {
            RequestKind::Information => {
                let out = &mut ctx.outputs[0];
                keys::set_flag(keys::can_handle_piece_request(), out.info, true);
                true
            }
            RequestKind::Data => {
                self.executions += 1;
                let out = &mut ctx.outputs[0];
                let Some(data) = out.data.as_mut() else {
                    return false;
                };
                if self.produced == 0 {
                    data.payload = json!({ "chunks": [] });
                }
                if let Some(chunks) = data.payload
                                          .get_mut("chunks")
                                          .and_then(serde_json::Value::as_array_mut)
                {
                    chunks.push(json!({ "index": self.produced }));
                }
                self.produced += 1;
                log::debug!("chunk {} de {}", self.produced, self.total_chunks);

                if self.produced < self.total_chunks {
                    request.set_continue_executing(true);
                } else {
                    request.set_continue_executing(false);
                    // la próxima ejecución arranca de cero
                    self.produced = 0;
                }
                true
            }
            _ => true,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
