//! grid-adapters: algoritmos de ejemplo para el executive.
//!
//! Fuentes y filtros sintéticos, deterministas y sin IO externa, pensados
//! para ejercitar la negociación: extents, piezas, tiempo, fantasmas y
//! producción por partes.

pub mod chunked;
pub mod passthrough;
pub mod piece_source;
pub mod time_table;
pub mod wavelet;

pub use chunked::ChunkedSource;
pub use passthrough::PassThroughFilter;
pub use piece_source::PieceSource;
pub use time_table::TimeTableSource;
pub use wavelet::WaveletSource;
