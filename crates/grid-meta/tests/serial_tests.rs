//! Round-trip store ⇄ JSON con el registro de serializadores default.

use std::sync::Arc;

use grid_meta::{DoubleKey, IntegerKey, IntegerVectorKey, KeyRegistry, MetadataStore, ObjectKey,
                ObjectValue, SerializerRegistry, StringVectorKey};

#[derive(Debug)]
struct Opaque;

impl ObjectValue for Opaque {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn round_trip_de_kinds_planos() {
    let entero = IntegerKey::leaked("ENTERO", "serial");
    let doble = DoubleKey::leaked("DOBLE", "serial");
    let extent = IntegerVectorKey::leaked("EXTENT", "serial");
    let nombres = StringVectorKey::leaked("NOMBRES", "serial");

    let registry = KeyRegistry::new();
    registry.register(entero.key());
    registry.register(doble.key());
    registry.register(extent.key());
    registry.register(nombres.key());

    let mut origen = MetadataStore::new();
    entero.set(&mut origen, -3);
    doble.set(&mut origen, 0.25);
    extent.set(&mut origen, vec![0, 9, 0, 9, 0, 0]);
    nombres.set(&mut origen, vec!["a".into(), "b".into()]);

    let serial = SerializerRegistry::with_defaults();
    let tree = serial.store_to_json(&origen);

    let mut destino = MetadataStore::new();
    let cargadas = serial.store_from_json(&tree, &registry, &mut destino);
    assert_eq!(cargadas, 4);
    assert_eq!(entero.get(&destino), -3);
    assert_eq!(doble.get(&destino), 0.25);
    assert_eq!(extent.get(&destino), vec![0, 9, 0, 9, 0, 0]);
    assert_eq!(nombres.get(&destino), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn objetos_se_saltean_sin_serializador() {
    let obj = ObjectKey::leaked("OPACO", "serial");
    let entero = IntegerKey::leaked("JUNTO", "serial");

    let mut store = MetadataStore::new();
    obj.set(&mut store, Arc::new(Opaque));
    entero.set(&mut store, 1);

    let serial = SerializerRegistry::with_defaults();
    let tree = serial.store_to_json(&store);
    let items = tree.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "JUNTO");
}

#[test]
fn keys_desconocidas_se_saltean_al_cargar() {
    let conocido = IntegerKey::leaked("CONOCIDO", "serial");
    let fantasma = IntegerKey::leaked("FANTASMA", "serial");

    let registry = KeyRegistry::new();
    registry.register(conocido.key());

    let mut origen = MetadataStore::new();
    conocido.set(&mut origen, 7);
    fantasma.set(&mut origen, 8);

    let serial = SerializerRegistry::with_defaults();
    let tree = serial.store_to_json(&origen);

    let mut destino = MetadataStore::new();
    let cargadas = serial.store_from_json(&tree, &registry, &mut destino);
    assert_eq!(cargadas, 1);
    assert!(conocido.has(&destino));
    assert!(!fantasma.has(&destino));
}
