//! Tests de integración del `MetadataStore`: semántica de set/get/remove,
//! notificación de cambio, política de longitud fija, copy/append, marcador
//! de request e invalidación de iteradores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use grid_meta::{DoubleVectorKey, IntegerKey, IntegerVectorKey, Key, KeyVectorKey, MetadataStore,
                ObjectKey, ObjectValue, RequestKey, StoreKey, StringVectorKey, Value, ValueKind};

#[derive(Debug)]
struct Marker(i32);

impl ObjectValue for Marker {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[test]
fn set_get_has_remove_por_kind() {
    let entero = IntegerKey::leaked("ENTERO", "tests");
    let vector = DoubleVectorKey::leaked("VECTOR", "tests");
    let mut store = MetadataStore::new();

    assert!(entero.set(&mut store, 42));
    assert_eq!(entero.get(&store), 42);
    assert!(entero.has(&store));

    assert!(vector.set(&mut store, vec![1.0, 2.0]));
    assert_eq!(vector.get(&store), vec![1.0, 2.0]);
    assert_eq!(vector.length(&store), 2);

    entero.remove(&mut store);
    assert!(!entero.has(&store));
    // remover ausente no notifica ni falla
    assert!(!store.remove(entero.key()));
}

#[test]
fn notifica_solo_en_cambio_real() {
    let k = IntegerKey::leaked("CONTADO", "tests");
    let mut store = MetadataStore::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits2 = Arc::clone(&hits);
    store.add_listener(Box::new(move |_| {
                           hits2.fetch_add(1, Ordering::SeqCst);
                       }));

    k.set(&mut store, 1); // cambio
    k.set(&mut store, 1); // sin cambio
    k.set(&mut store, 2); // cambio
    k.remove(&mut store); // cambio
    k.remove(&mut store); // ausente, sin cambio
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn longitud_fija_remueve_en_mismatch() {
    static EXTENT: once_cell::sync::Lazy<IntegerVectorKey> =
        once_cell::sync::Lazy::new(|| IntegerVectorKey::with_length("EXTENT", "tests", 6));
    let mut store = MetadataStore::new();

    assert!(EXTENT.set(&mut store, vec![0, 9, 0, 9, 0, 0]));
    assert!(EXTENT.has(&store));

    // longitud incorrecta: la entrada previa desaparece
    assert!(!EXTENT.set(&mut store, vec![0, 9]));
    assert!(!EXTENT.has(&store));
}

#[test]
fn longitud_fija_aplica_tambien_al_append() {
    static PAR: once_cell::sync::Lazy<IntegerVectorKey> =
        once_cell::sync::Lazy::new(|| IntegerVectorKey::with_length("PAR", "tests", 2));
    let mut store = MetadataStore::new();

    assert!(PAR.set(&mut store, vec![1, 2]));

    // crecer más allá de la longitud fija remueve la entrada
    PAR.append(&mut store, 3);
    assert!(!PAR.has(&store));
}

#[test]
fn append_crece_de_a_uno() {
    let k = StringVectorKey::leaked("NOMBRES", "tests");
    let mut store = MetadataStore::new();
    k.append(&mut store, "a".into());
    k.append(&mut store, "b".into());
    assert_eq!(k.get(&store), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn copia_superficial_comparte_objetos() {
    let obj = ObjectKey::leaked("OBJ", "tests");
    let mut origen = MetadataStore::new();
    let marker: Arc<dyn ObjectValue> = Arc::new(Marker(7));
    obj.set(&mut origen, Arc::clone(&marker));

    let mut destino = MetadataStore::new();
    destino.copy(&origen, false);
    let copiado = obj.get(&destino).unwrap();
    assert!(Arc::ptr_eq(&copiado, &marker));
}

#[test]
fn copia_profunda_reconstruye_stores_anidados() {
    let anidado = StoreKey::leaked("ANIDADO", "tests");
    let interno_k = IntegerKey::leaked("INTERNO", "tests");

    let mut interno = MetadataStore::new();
    interno_k.set(&mut interno, 5);
    let interno = Arc::new(interno);

    let mut origen = MetadataStore::new();
    anidado.set(&mut origen, Arc::clone(&interno));

    let mut superficial = MetadataStore::new();
    superficial.copy(&origen, false);
    assert!(Arc::ptr_eq(&anidado.get(&superficial).unwrap(), &interno));

    let mut profundo = MetadataStore::new();
    profundo.copy(&origen, true);
    let reconstruido = anidado.get(&profundo).unwrap();
    assert!(!Arc::ptr_eq(&reconstruido, &interno));
    assert_eq!(interno_k.get(&reconstruido), 5);
}

#[test]
fn copy_entry_ausente_remueve_en_destino() {
    let k = IntegerKey::leaked("PUNTUAL", "tests");
    let origen = MetadataStore::new();
    let mut destino = MetadataStore::new();
    k.set(&mut destino, 1);

    destino.copy_entry(&origen, k.key(), false);
    assert!(!k.has(&destino));
}

#[test]
fn marcador_de_request_unico() {
    let a = RequestKey::leaked("REQUEST_A", "tests");
    let b = RequestKey::leaked("REQUEST_B", "tests");
    let mut store = MetadataStore::new();

    a.set(&mut store);
    assert!(a.has(&store));
    assert!(!b.has(&store));

    // segunda escritura: gana la última
    b.set(&mut store);
    assert!(!a.has(&store));
    assert!(b.has(&store));

    // remove de la key no activa es no-op
    a.remove(&mut store);
    assert!(b.has(&store));
    b.remove(&mut store);
    assert!(store.active_request().is_none());
}

#[test]
fn iterador_se_invalida_con_mutacion() {
    let a = IntegerKey::leaked("ITER_A", "tests");
    let b = IntegerKey::leaked("ITER_B", "tests");
    let c = IntegerKey::leaked("ITER_C", "tests");
    let mut store = MetadataStore::new();
    a.set(&mut store, 1);
    b.set(&mut store, 2);

    let mut iter = store.iter();
    assert!(iter.is_valid());
    assert_eq!(iter.next(), Some(a.key()));

    c.set(&mut store, 3);
    assert!(!iter.is_valid());
    assert_eq!(iter.next(), None);

    iter.restart(&store);
    assert!(iter.is_valid());
    let restantes: Vec<_> = iter.collect();
    assert_eq!(restantes, vec![a.key(), b.key(), c.key()]);
}

#[test]
fn key_vector_guarda_referencias() {
    let lista = KeyVectorKey::leaked("A_COPIAR", "tests");
    let objetivo = IntegerKey::leaked("OBJETIVO", "tests");
    let mut store = MetadataStore::new();

    lista.append(&mut store, objetivo.key());
    let keys = lista.get(&store);
    assert_eq!(keys.len(), 1);
    assert!(std::ptr::eq(keys[0], objetivo.key()));
}

#[test]
fn keys_dinamicas_con_leak() {
    let key = Key::new("DINAMICA", "tests", ValueKind::Double).leak();
    let mut store = MetadataStore::new();
    assert!(store.set_value(key, Value::Double(2.5)).unwrap());
    assert_eq!(store.get_value(key), Some(&Value::Double(2.5)));
}
