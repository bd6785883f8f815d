//! GridFlow Rust Library
//!
//! Este crate actúa como la fachada de GridFlow:
//! - Re-exporta los crates miembro (`grid_meta`, `grid_core`, `grid_adapters`).
//! - Expone `config` con los parámetros de los escenarios de demostración.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;

pub use grid_adapters as adapters;
pub use grid_core as core;
pub use grid_meta as meta;

#[cfg(test)]
mod tests {
    use grid_core::errors::PipelineError;

    #[test]
    fn pipeline_error_display() {
        let e = PipelineError::CycleDetected(3).to_string();
        assert_eq!(e, "ciclo detectado atravesando el nodo 3");

        let e = PipelineError::UnknownNode(7).to_string();
        assert_eq!(e, "nodo 7 inexistente");
    }
}
