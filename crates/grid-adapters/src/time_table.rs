//! Fuente temporal con muestras discretas.
//!
//! Publica su eje temporal en la pasada de información y ajusta cualquier
//! tiempo pedido a la muestra más cercana, estampando el tiempo realmente
//! producido. La guarda de oscilación del executive evita que el ajuste
//! dispare re-ejecuciones infinitas.

use std::any::Any;

use grid_core::algorithm::{Algorithm, RequestContext};
use grid_core::data::DataKind;
use grid_core::keys;
use grid_core::mtime::next_mtime;
use grid_core::request::{Request, RequestKind};
use serde_json::json;

#[derive(Debug)]
pub struct TimeTableSource {
    time_steps: Vec<f64>,
    time_dependent_information: bool,
    mtime: u64,
    executions: u64,
    information_passes: u64,
}

impl TimeTableSource {
    pub fn new(time_steps: Vec<f64>) -> TimeTableSource {
        TimeTableSource { time_steps,
                          time_dependent_information: false,
                          mtime: next_mtime(),
                          executions: 0,
                          information_passes: 0 }
    }

    /// Marca que los metadatos dependen del tiempo pedido (dispara la pasada
    /// de información temporal).
    pub fn set_time_dependent_information(&mut self, on: bool) {
        if self.time_dependent_information != on {
            self.time_dependent_information = on;
            self.mtime = next_mtime();
        }
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn information_passes(&self) -> u64 {
        self.information_passes
    }

    fn nearest_sample(&self, requested: f64) -> f64 {
        let mut best = self.time_steps.first().copied().unwrap_or(0.0);
        for &t in &self.time_steps {
            if (t - requested).abs() < (best - requested).abs() {
                best = t;
            }
        }
        best
    }
}

impl Algorithm for TimeTableSource {
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
                keys::time_steps().set(out.info, self.time_steps.clone());
                let lo = self.time_steps.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = self.time_steps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                if lo.is_finite() && hi.is_finite() {
                    keys::time_range().set(out.info, vec![lo, hi]);
                }
                keys::set_flag(keys::time_dependent_information(),
                               out.info,
                               self.time_dependent_information);
                keys::set_flag(keys::can_handle_piece_request(), out.info, true);
                true
            }
            RequestKind::TimeDependentInformation => {
                self.information_passes += 1;
                true
            }
            RequestKind::Data => {
                self.executions += 1;
                let out = &mut ctx.outputs[0];
                let produced = if keys::update_time_step().has(out.info) {
                    self.nearest_sample(keys::update_time_step().get(out.info))
                } else {
                    self.time_steps.first().copied().unwrap_or(0.0)
                };
                if let Some(data) = out.data.as_mut() {
                    data.payload = json!({
                        "time": produced,
                        "rows": [{"t": produced, "value": produced.sin()}],
                    });
                    // tiempo realmente producido, no el pedido
                    keys::data_time_step().set(&mut data.information, produced);
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
