//! Ejecución por partes, sondeo de prioridad y fan-out de triples.

use grid_adapters::{ChunkedSource, WaveletSource};
use grid_core::executive::Pipeline;
use grid_core::extent::Extent;
use grid_core::request::{Request, RequestKind};
use grid_core::triple::RequestTriple;
use grid_meta::MetadataStore;
use rayon::prelude::*;

#[test]
fn la_fuente_por_partes_completa_todos_los_chunks() {
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(ChunkedSource::new(5)));

    p.update(src).unwrap();

    let execs = p.algorithm(src)
                 .and_then(|a| a.as_any().downcast_ref::<ChunkedSource>())
                 .map(ChunkedSource::executions)
                 .unwrap();
    // una vuelta de la fase de datos por chunk
    assert_eq!(execs, 5);
    let chunks = p.output_data(src, 0).unwrap().payload["chunks"].as_array().unwrap().len();
    assert_eq!(chunks, 5);

    // con todos los chunks producidos, el caché vale
    p.update(src).unwrap();
    let execs = p.algorithm(src)
                 .and_then(|a| a.as_any().downcast_ref::<ChunkedSource>())
                 .map(ChunkedSource::executions)
                 .unwrap();
    assert_eq!(execs, 5);
}

#[test]
fn la_prioridad_es_la_fraccion_cubierta() {
    let whole = Extent([0, 9, 0, 9, 0, 0]);
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));

    p.update_information(src).unwrap();

    p.set_update_extent(src, 0, &Extent([0, 4, 0, 4, 0, 0])).unwrap();
    let quarter = p.compute_priority(src, 0).unwrap();
    assert!((quarter - 0.25).abs() < 1e-9);

    p.set_update_extent(src, 0, &whole).unwrap();
    let full = p.compute_priority(src, 0).unwrap();
    assert!((full - 1.0).abs() < 1e-9);

    // el sondeo no ejecuta la fase de datos ni deja rastros
    let execs = p.algorithm(src)
                 .and_then(|a| a.as_any().downcast_ref::<WaveletSource>())
                 .map(WaveletSource::executions)
                 .unwrap();
    assert_eq!(execs, 0);
    assert!(p.output_data(src, 0).is_none() || p.output_data(src, 0).unwrap().payload.is_null());
}

#[test]
fn los_triples_se_reparten_entre_workers() {
    let mut base_out = MetadataStore::new();
    grid_core::keys::update_piece_number().set(&mut base_out, 0);
    grid_core::keys::update_number_of_pieces().set(&mut base_out, 8);

    let request = Request::new(RequestKind::UpdateExtent, 0);
    let triple = RequestTriple::new(&request, &[], std::slice::from_ref(&base_out));

    let results: Vec<i64> = (0..8i64).into_par_iter()
                                     .map(|piece| {
                                         let mut copy = triple.clone_for_worker();
                                         let info = &mut copy.output_info[0];
                                         grid_core::keys::update_piece_number().set(info, piece);
                                         grid_core::keys::update_piece_number().get(info)
                                     })
                                     .collect();

    assert_eq!(results, (0..8).collect::<Vec<i64>>());
    // el triple original no fue tocado por los workers
    assert_eq!(grid_core::keys::update_piece_number().get(&triple.output_info[0]), 0);
    assert_eq!(triple.request().kind(), RequestKind::UpdateExtent);
}
