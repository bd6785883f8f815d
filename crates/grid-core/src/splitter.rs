//! Partición de extents en piezas.
//!
//! Bisección binaria iterativa: en cada nivel se elige un eje, se corta la
//! caja en dos mitades con conteos de piezas proporcionales y se desciende a
//! la mitad que contiene la pieza pedida. Determinista y sin estado: todos
//! los parámetros entran por argumento, mismos argumentos ⇒ misma pieza.
//!
//! Las piezas resultantes son disjuntas de a pares y su unión cubre el
//! extent completo (antes de fantasmas). Los niveles de fantasma expanden la
//! pieza al final y se recortan contra la caja completa.

use serde::{Deserialize, Serialize};

use crate::extent::Extent;

/// Estrategia de elección de eje por nivel de bisección.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitPolicy {
    /// Corta siempre el eje más largo (empates resueltos z, y, x).
    Block,
    /// Corta sólo en x (cae a Block si x no admite más cortes).
    XSlab,
    /// Corta sólo en y (ídem).
    YSlab,
    /// Corta sólo en z (ídem).
    ZSlab,
}

impl SplitPolicy {
    pub fn from_code(code: i64) -> SplitPolicy {
        match code {
            1 => SplitPolicy::XSlab,
            2 => SplitPolicy::YSlab,
            3 => SplitPolicy::ZSlab,
            _ => SplitPolicy::Block,
        }
    }

    pub fn to_code(self) -> i64 {
        match self {
            SplitPolicy::Block => 0,
            SplitPolicy::XSlab => 1,
            SplitPolicy::YSlab => 2,
            SplitPolicy::ZSlab => 3,
        }
    }
}

/// Unidades cortables de un eje: celdas (max - min) o puntos (max - min + 1).
fn axis_units(ext: &Extent, axis: usize, by_points: bool) -> i64 {
    let span = i64::from(ext.0[2 * axis + 1]) - i64::from(ext.0[2 * axis]);
    if by_points {
        span + 1
    } else {
        span
    }
}

fn splittable(ext: &Extent, axis: usize, by_points: bool) -> bool {
    axis_units(ext, axis, by_points) >= 2
}

/// Eje más largo que admita corte, con preferencia z, y, x en empates.
fn pick_block_axis(ext: &Extent, by_points: bool) -> Option<usize> {
    let units = [axis_units(ext, 0, by_points),
                 axis_units(ext, 1, by_points),
                 axis_units(ext, 2, by_points)];
    if units[2] >= units[1] && units[2] >= units[0] && units[2] >= 2 {
        Some(2)
    } else if units[1] >= units[0] && units[1] >= 2 {
        Some(1)
    } else if units[0] >= 2 {
        Some(0)
    } else {
        None
    }
}

fn pick_axis(ext: &Extent, policy: SplitPolicy, by_points: bool) -> Option<usize> {
    let preferred = match policy {
        SplitPolicy::Block => return pick_block_axis(ext, by_points),
        SplitPolicy::XSlab => 0,
        SplitPolicy::YSlab => 1,
        SplitPolicy::ZSlab => 2,
    };
    if splittable(ext, preferred, by_points) {
        Some(preferred)
    } else {
        pick_block_axis(ext, by_points)
    }
}

/// Calcula el sub-extent de la pieza `piece` de `num_pieces` sobre `whole`.
///
/// - `by_points`: corta por conteo de puntos en lugar de celdas.
/// - `ghost_level`: expansión final recortada contra `whole`.
/// - Pieza fuera de rango o `num_pieces < 1` ⇒ extent vacío.
/// - Sin eje cortable con más piezas que cajas: la pieza 0 recibe lo que
///   queda y el resto colapsa a vacío.
pub fn split(whole: &Extent,
             piece: i64,
             num_pieces: i64,
             ghost_level: i32,
             policy: SplitPolicy,
             by_points: bool)
             -> Extent {
    if num_pieces < 1 || piece < 0 || piece >= num_pieces || whole.is_empty() {
        return Extent::EMPTY;
    }

    let mut ext = *whole;
    let mut piece = piece;
    let mut pieces_left = num_pieces;

    while pieces_left > 1 {
        let Some(axis) = pick_axis(&ext, policy, by_points) else {
            // no queda nada que cortar: la pieza 0 se queda con la caja
            if piece != 0 {
                return Extent::EMPTY;
            }
            break;
        };

        let first_count = pieces_left / 2;
        let units = axis_units(&ext, axis, by_points) as f64;
        let offset = (units * first_count as f64 / pieces_left as f64).round() as i32;
        let mid = ext.0[2 * axis] + offset;

        if piece < first_count {
            ext.0[2 * axis + 1] = mid - 1;
            pieces_left = first_count;
        } else {
            ext.0[2 * axis] = mid;
            piece -= first_count;
            pieces_left -= first_count;
        }
    }

    if ghost_level > 0 {
        ext = ext.grow(ghost_level).clamp(whole);
    }
    ext
}
