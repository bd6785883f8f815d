//! grid-core: protocolo de ejecución bajo demanda.
//!
//! Sobre el store de grid-meta, este crate define:
//! - `extent` y `splitter`: cajas estructuradas y partición en piezas.
//! - `keys`: el vocabulario del protocolo (negociación, routing, sellos).
//! - `request` y `demand`: pasadas y demandas extensibles.
//! - `data`: objetos de dato con información adjunta.
//! - `executive`: el grafo de nodos y las pasadas de actualización.
//! - `triple`: unidades de trabajo clonables para fan-out.

pub mod algorithm;
pub mod data;
pub mod demand;
pub mod errors;
pub mod executive;
pub mod extent;
pub mod keys;
pub mod mtime;
pub mod request;
pub mod splitter;
pub mod triple;

pub use algorithm::{Algorithm, InputSlot, OutputSlot, RequestContext};
pub use data::{DataKind, DataObject, ExtentMode};
pub use errors::PipelineError;
pub use executive::{NodeId, OutputPort, Pipeline};
pub use extent::Extent;
pub use mtime::{current_mtime, next_mtime};
pub use request::{Request, RequestKind};
pub use splitter::{split, SplitPolicy};
pub use triple::RequestTriple;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn el_reloj_logico_es_monotono() {
        let a = next_mtime();
        let b = next_mtime();
        assert!(b > a);
        assert!(current_mtime() >= b);
    }

    #[test]
    fn pieza_fuera_de_rango_es_vacia() {
        let whole = Extent([0, 9, 0, 9, 0, 0]);
        assert!(split(&whole, 4, 4, 0, SplitPolicy::Block, false).is_empty());
        assert!(split(&whole, -1, 4, 0, SplitPolicy::Block, false).is_empty());
    }
}
