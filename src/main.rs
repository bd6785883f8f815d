//! Binario de demostración de GridFlow.
//!
//! Corre una serie de escenarios sobre pipelines sintéticos y reporta lo que
//! el protocolo negoció en cada uno: extents producidos, ejecuciones
//! evitadas por caché, partición en piezas, ajuste temporal, producción por
//! partes y sondeo de prioridad.

use std::error::Error;

use grid_adapters::{ChunkedSource, PassThroughFilter, PieceSource, TimeTableSource, WaveletSource};
use grid_core::data::DataKind;
use grid_core::executive::{OutputPort, Pipeline};
use grid_core::extent::Extent;
use grid_core::keys;
use grid_core::splitter::{split, SplitPolicy};
use grid_meta::{global_registry, MetadataStore, SerializerRegistry};
use gridflow_rust::config::CONFIG;

fn executions<T: 'static>(p: &Pipeline, node: usize, f: fn(&T) -> u64) -> u64 {
    p.algorithm(node)
     .and_then(|a| a.as_any().downcast_ref::<T>())
     .map(f)
     .unwrap_or(0)
}

fn scenario_extent(whole: Extent) -> Result<(), Box<dyn Error>> {
    println!("== negociación de extents ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));

    p.update_information(src)?;
    p.set_update_extent(src, 0, &Extent([0, whole.0[1] / 2, 0, whole.0[3] / 2, 0, 0]))?;
    p.update(src)?;
    let produced = p.output_data(src, 0).map(|d| d.data_extent()).unwrap_or(Extent::EMPTY);
    println!("  pedido parcial  -> producido {produced}");

    p.update(src)?;
    let execs = executions(&p, src, WaveletSource::executions);
    println!("  mismo pedido    -> ejecuciones totales: {execs} (caché)");
    Ok(())
}

fn scenario_pieces(whole: Extent, pieces: i64) -> Result<(), Box<dyn Error>> {
    println!("== partición en {pieces} piezas ==");
    for piece in 0..pieces {
        let sub = split(&whole, piece, pieces, 0, SplitPolicy::Block, false);
        println!("  pieza {piece}: {sub}");
    }

    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));
    p.update_information(src)?;
    p.set_update_piece(src, 0, 0, pieces, 1)?;
    p.update(src)?;
    let produced = p.output_data(src, 0).map(|d| d.data_extent()).unwrap_or(Extent::EMPTY);
    println!("  pieza 0 con 1 fantasma -> {produced}");
    Ok(())
}

fn scenario_union(whole: Extent) -> Result<(), Box<dyn Error>> {
    println!("== demandas combinadas de dos consumidores ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));
    let fa = p.add_node(Box::new(PassThroughFilter::new(DataKind::StructuredGrid)));
    let fb = p.add_node(Box::new(PassThroughFilter::new(DataKind::StructuredGrid)));
    p.connect(OutputPort { node: src, port: 0 }, fa, 0)?;
    p.connect(OutputPort { node: src, port: 0 }, fb, 0)?;

    p.update_information(fa)?;
    p.update_information(fb)?;
    let mid = whole.0[1] / 2;
    p.set_update_extent(fa, 0, &Extent([0, mid, 0, whole.0[3] / 2, 0, 0]))?;
    p.set_update_extent(fb, 0, &Extent([mid + 1, whole.0[1], 0, whole.0[3] / 2, 0, 0]))?;
    p.propagate_update_extent(fa, 0)?;
    p.propagate_update_extent(fb, 0)?;
    p.update_data(fa, 0)?;
    p.update_data(fb, 0)?;

    let produced = p.output_data(src, 0).map(|d| d.data_extent()).unwrap_or(Extent::EMPTY);
    let execs = executions(&p, src, WaveletSource::executions);
    println!("  la fuente corrió {execs} vez con la unión {produced}");
    Ok(())
}

fn scenario_time() -> Result<(), Box<dyn Error>> {
    println!("== ajuste temporal ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(TimeTableSource::new(vec![0.0, 0.5, 1.0, 1.5])));

    p.update_information(src)?;
    p.set_update_time_step(src, 0, 0.7)?;
    p.update(src)?;
    let produced = p.output_data(src, 0).map(|d| d.payload["time"].clone()).unwrap_or_default();
    println!("  pedido t=0.7 -> muestra producida t={produced}");

    p.set_update_time_step(src, 0, 0.7)?;
    p.update(src)?;
    let execs = executions(&p, src, TimeTableSource::executions);
    println!("  repetido     -> ejecuciones totales: {execs} (sin oscilar)");
    Ok(())
}

fn scenario_streaming(chunks: usize) -> Result<(), Box<dyn Error>> {
    println!("== producción por partes ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(ChunkedSource::new(chunks)));
    p.update(src)?;
    let got = p.output_data(src, 0)
               .and_then(|d| d.payload["chunks"].as_array().map(Vec::len))
               .unwrap_or(0);
    let execs = executions(&p, src, ChunkedSource::executions);
    println!("  {execs} vueltas de ejecución, {got} chunks acumulados");
    Ok(())
}

fn scenario_priority(whole: Extent) -> Result<(), Box<dyn Error>> {
    println!("== sondeo de prioridad ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));
    p.update_information(src)?;

    p.set_update_extent(src, 0, &Extent([0, whole.0[1] / 2, 0, whole.0[3] / 2, 0, 0]))?;
    let partial = p.compute_priority(src, 0)?;
    p.set_update_extent(src, 0, &whole)?;
    let full = p.compute_priority(src, 0)?;
    println!("  parcial: {partial:.2}, completo: {full:.2}");
    Ok(())
}

fn scenario_pieces_source() -> Result<(), Box<dyn Error>> {
    println!("== fuente por piezas ==");
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(PieceSource::new(100)));
    p.update_information(src)?;
    p.set_update_piece(src, 0, 1, 4, 0)?;
    p.update(src)?;
    if let Some(data) = p.output_data(src, 0) {
        println!("  pieza {} de {}: {} items",
                 data.payload["piece"],
                 data.payload["pieces"],
                 data.payload["items"].as_array().map(Vec::len).unwrap_or(0));
    }
    Ok(())
}

fn scenario_serialization(whole: Extent) -> Result<(), Box<dyn Error>> {
    println!("== serialización de información ==");
    keys::register_pipeline_keys(global_registry());

    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));
    p.update_information(src)?;

    let serial = SerializerRegistry::with_defaults();
    let info = p.output_information(src, 0)
                .ok_or("información de salida ausente")?;
    let tree = serial.store_to_json(info);
    let entries = tree.as_array().map(Vec::len).unwrap_or(0);

    let mut restored = MetadataStore::new();
    let loaded = serial.store_from_json(&tree, global_registry(), &mut restored);
    println!("  {entries} entradas serializadas, {loaded} restauradas");
    println!("  whole restaurado: {}", keys::get_whole_extent(&restored));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let side = CONFIG.demo.grid_side.max(2);
    let whole = Extent([0, side - 1, 0, side - 1, 0, 0]);
    println!("GridFlow: pipeline bajo demanda sobre la grilla {whole}\n");

    scenario_extent(whole)?;
    scenario_pieces(whole, CONFIG.demo.pieces.max(1))?;
    scenario_union(whole)?;
    scenario_time()?;
    scenario_streaming(CONFIG.demo.chunks.max(1))?;
    scenario_priority(whole)?;
    scenario_pieces_source()?;
    scenario_serialization(whole)?;

    println!("\nescenarios completados");
    Ok(())
}
