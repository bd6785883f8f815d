//! Configuración central del binario de demostración.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`) con los parámetros de los escenarios.
use once_cell::sync::Lazy;
use std::env;

/// Configuración global (extensible para más secciones).
pub struct AppConfig {
    /// Parámetros de los escenarios de demostración.
    pub demo: DemoConfig,
}

/// Parámetros del pipeline sintético que corre `gridflow`.
pub struct DemoConfig {
    /// Lado de la grilla cuadrada de los escenarios (en puntos).
    pub grid_side: i32,
    /// Cantidad de piezas para el escenario de partición.
    pub pieces: i64,
    /// Chunks del escenario de producción por partes.
    pub chunks: usize,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let grid_side = env::var("GRIDFLOW_GRID_SIDE").ok()
        .and_then(|v| v.parse().ok()).unwrap_or(10);
    let pieces = env::var("GRIDFLOW_PIECES").ok()
        .and_then(|v| v.parse().ok()).unwrap_or(4);
    let chunks = env::var("GRIDFLOW_CHUNKS").ok()
        .and_then(|v| v.parse().ok()).unwrap_or(5);
    AppConfig {
        demo: DemoConfig { grid_side, pieces, chunks },
    }
});
