//! Filtro de paso con demanda de fantasmas opcional.
//!
//! Copia el payload de su entrada anotándolo; si `extra_ghost_levels` es
//! mayor que cero, infla la demanda de fantasmas que sube a su productor
//! durante la propagación de extents.

use std::any::Any;

use grid_core::algorithm::{Algorithm, RequestContext};
use grid_core::data::DataKind;
use grid_core::keys;
use grid_core::mtime::next_mtime;
use grid_core::request::{Request, RequestKind};
use serde_json::json;

#[derive(Debug)]
pub struct PassThroughFilter {
    kind: DataKind,
    extra_ghost_levels: i64,
    mtime: u64,
    executions: u64,
}

impl PassThroughFilter {
    pub fn new(kind: DataKind) -> PassThroughFilter {
        PassThroughFilter { kind,
                            extra_ghost_levels: 0,
                            mtime: next_mtime(),
                            executions: 0 }
    }

    pub fn set_extra_ghost_levels(&mut self, levels: i64) {
        if self.extra_ghost_levels != levels {
            self.extra_ghost_levels = levels;
            self.mtime = next_mtime();
        }
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl Algorithm for PassThroughFilter {
    fn num_input_ports(&self) -> usize {
        1
    }

    fn output_data_kind(&self, _port: usize) -> DataKind {
        self.kind
    }

    fn modified_time(&self) -> u64 {
        self.mtime
    }

    fn process_request(&mut self, request: &mut Request, ctx: &mut RequestContext<'_, '_>) -> bool {
        match request.kind() {
            RequestKind::UpdateExtent => {
                if self.extra_ghost_levels > 0 {
                    for slot in &mut ctx.inputs[0] {
                        let current = keys::get_update_ghost_levels(slot.info);
                        keys::update_number_of_ghost_levels().set(slot.info,
                                                                  current
                                                                  + self.extra_ghost_levels);
                    }
                }
                true
            }
            RequestKind::Data => {
                self.executions += 1;
                let upstream_payload = ctx.inputs[0]
                                          .first()
                                          .and_then(|slot| slot.data.as_ref())
                                          .map(|data| data.payload.clone())
                                          .unwrap_or(serde_json::Value::Null);
                let out = &mut ctx.outputs[0];
                if let Some(data) = out.data.as_mut() {
                    data.payload = json!({
                        "filtered": true,
                        "source": upstream_payload,
                    });
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
