use gridflow_rust::adapters::{PassThroughFilter, WaveletSource};
use gridflow_rust::core::data::DataKind;
use gridflow_rust::core::executive::{OutputPort, Pipeline};
use gridflow_rust::core::extent::Extent;

// Escenario de punta a punta: una fuente estructurada alimenta un filtro
// de paso y dos consumidores piden mitades distintas de la grilla.
#[test]
fn test_fuente_filtro_y_dos_consumidores() {
    let whole = Extent([0, 9, 0, 9, 0, 0]);
    let mut p = Pipeline::new();
    let src = p.add_node(Box::new(WaveletSource::new(whole)));
    let filter = p.add_node(Box::new(PassThroughFilter::new(DataKind::StructuredGrid)));
    let ca = p.add_node(Box::new(PassThroughFilter::new(DataKind::StructuredGrid)));
    let cb = p.add_node(Box::new(PassThroughFilter::new(DataKind::StructuredGrid)));
    p.connect(OutputPort { node: src, port: 0 }, filter, 0).unwrap();
    p.connect(OutputPort { node: filter, port: 0 }, ca, 0).unwrap();
    p.connect(OutputPort { node: filter, port: 0 }, cb, 0).unwrap();

    // 1. Pasada de información: el whole extent baja por toda la cadena
    p.update_information(ca).unwrap();
    p.update_information(cb).unwrap();
    assert_eq!(gridflow_rust::core::keys::get_whole_extent(p.output_information(cb, 0).unwrap()),
               whole);

    // 2. Cada consumidor demanda una mitad; la fuente ejecuta una sola vez
    //    con la unión de ambas demandas
    p.set_update_extent(ca, 0, &Extent([0, 4, 0, 9, 0, 0])).unwrap();
    p.set_update_extent(cb, 0, &Extent([5, 9, 0, 9, 0, 0])).unwrap();
    p.propagate_update_extent(ca, 0).unwrap();
    p.propagate_update_extent(cb, 0).unwrap();
    p.update_data(ca, 0).unwrap();
    p.update_data(cb, 0).unwrap();

    let execs = p.algorithm(src)
                 .and_then(|a| a.as_any().downcast_ref::<WaveletSource>())
                 .map(WaveletSource::executions)
                 .unwrap();
    assert_eq!(execs, 1);
    assert_eq!(p.output_data(src, 0).unwrap().data_extent(), whole);

    // 3. El dato filtrado conserva el payload de la fuente anidado
    let payload = &p.output_data(ca, 0).unwrap().payload;
    assert_eq!(payload["filtered"], true);
    assert!(payload["source"]["source"]["points"].is_number());

    // 4. Repetir la demanda no vuelve a ejecutar nada
    p.update(ca).unwrap();
    p.update(cb).unwrap();
    let execs = p.algorithm(src)
                 .and_then(|a| a.as_any().downcast_ref::<WaveletSource>())
                 .map(WaveletSource::executions)
                 .unwrap();
    assert_eq!(execs, 1);
}
