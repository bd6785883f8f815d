//! Errores del protocolo de ejecución.

use thiserror::Error;

use crate::executive::NodeId;
use crate::extent::Extent;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("nodo {node} puerto {port}: sin objeto de dato tras la pasada de información")]
    MissingDataObject { node: NodeId, port: usize },
    #[error("nodo {node} puerto {port}: falta la key requerida '{key}'")]
    MissingKey { node: NodeId, port: usize, key: &'static str },
    #[error("nodo {node} puerto {port}: pedido {requested} fuera del extent completo {whole}")]
    ExtentOutsideWhole { node: NodeId, port: usize, requested: Extent, whole: Extent },
    #[error("nodo {node} puerto {port}: pieza {piece} fuera de rango (piezas pedidas {pieces})")]
    PieceOutOfRange { node: NodeId, port: usize, piece: i64, pieces: i64 },
    #[error("ciclo detectado atravesando el nodo {0}")]
    CycleDetected(NodeId),
    #[error("nodo {node}: puerto {port} inválido ({limit} disponibles)")]
    InvalidPort { node: NodeId, port: usize, limit: usize },
    #[error("nodo {0} inexistente")]
    UnknownNode(NodeId),
    #[error("interno: {0}")]
    Internal(String),
}
