//! Contador global de modificación.
//!
//! Reloj lógico monótono de proceso: cada mutación relevante (parámetros de
//! un algoritmo, topología del pipeline, dato producido) toma un tick. Las
//! decisiones de vigencia comparan ticks, nunca tiempo de pared.

use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Tick fresco, estrictamente mayor que todos los anteriores.
pub fn next_mtime() -> u64 {
    COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Último tick emitido.
pub fn current_mtime() -> u64 {
    COUNTER.load(Ordering::Relaxed)
}
