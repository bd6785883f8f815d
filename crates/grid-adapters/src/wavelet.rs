//! Fuente estructurada sintética.
//!
//! Produce una grilla 3D determinista sobre un extent completo configurable.
//! Declara que sabe producir sub-extents, así el executive puede recortar la
//! demanda a la pieza pedida en vez de ejecutar el dato entero.

use std::any::Any;

use grid_core::algorithm::{Algorithm, RequestContext};
use grid_core::data::DataKind;
use grid_core::extent::Extent;
use grid_core::keys;
use grid_core::mtime::next_mtime;
use grid_core::request::{Request, RequestKind};
use serde_json::json;

#[derive(Debug)]
pub struct WaveletSource {
    whole_extent: Extent,
    sub_extents: bool,
    mtime: u64,
    executions: u64,
}

impl WaveletSource {
    pub fn new(whole_extent: Extent) -> WaveletSource {
        WaveletSource { whole_extent,
                        sub_extents: true,
                        mtime: next_mtime(),
                        executions: 0 }
    }

    pub fn set_whole_extent(&mut self, ext: Extent) {
        if self.whole_extent != ext {
            self.whole_extent = ext;
            self.mtime = next_mtime();
        }
    }

    pub fn set_sub_extents(&mut self, on: bool) {
        if self.sub_extents != on {
            self.sub_extents = on;
            self.mtime = next_mtime();
        }
    }

    /// Cuántas veces corrió la fase de datos.
    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl Algorithm for WaveletSource {
    fn output_data_kind(&self, _port: usize) -> DataKind {
        DataKind::StructuredGrid
    }

    fn modified_time(&self) -> u64 {
        self.mtime
    }

    fn process_request(&mut self, request: &mut Request, ctx: &mut RequestContext<'_, '_>) -> bool {
        match request.kind() {
            RequestKind::Information => {
                let out = &mut ctx.outputs[0];
                keys::set_extent(keys::whole_extent(), out.info, &self.whole_extent);
                let b: Vec<f64> = self.whole_extent.to_vec().iter().map(|&v| v as f64).collect();
                keys::bounds().set(out.info, b);
                keys::set_flag(keys::can_produce_sub_extent(), out.info, self.sub_extents);
                true
            }
            RequestKind::Data => {
                self.executions += 1;
                let out = &mut ctx.outputs[0];
                let produced = keys::get_update_extent(out.info);
                log::debug!("wavelet: produciendo {produced}");
                let size = produced.size();
                if let Some(data) = out.data.as_mut() {
                    data.payload = json!({
                        "extent": produced.to_vec(),
                        "dims": size,
                        "points": produced.num_points(),
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
