//! Fuente no estructurada direccionable por pieza.

use std::any::Any;

use grid_core::algorithm::{Algorithm, RequestContext};
use grid_core::data::DataKind;
use grid_core::keys;
use grid_core::mtime::next_mtime;
use grid_core::request::{Request, RequestKind};
use serde_json::json;

/// Reparte `total_items` elementos sintéticos entre las piezas pedidas.
#[derive(Debug)]
pub struct PieceSource {
    total_items: i64,
    mtime: u64,
    executions: u64,
}

impl PieceSource {
    pub fn new(total_items: i64) -> PieceSource {
        PieceSource { total_items,
                      mtime: next_mtime(),
                      executions: 0 }
    }

    pub fn set_total_items(&mut self, total: i64) {
        if self.total_items != total {
            self.total_items = total;
            self.mtime = next_mtime();
        }
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl Algorithm for PieceSource {
    fn output_data_kind(&self, _port: usize) -> DataKind {
        DataKind::UnstructuredPieces
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
                let piece = keys::get_update_piece(out.info);
                let pieces = keys::get_update_number_of_pieces(out.info).max(1);
                let ghosts = keys::get_update_ghost_levels(out.info);

                // rango contiguo de items para esta pieza
                let per_piece = self.total_items / pieces;
                let start = piece * per_piece;
                let end = if piece == pieces - 1 { self.total_items } else { start + per_piece };
                if let Some(data) = out.data.as_mut() {
                    data.payload = json!({
                        "piece": piece,
                        "pieces": pieces,
                        "ghost_levels": ghosts,
                        "items": (start..end).collect::<Vec<i64>>(),
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
