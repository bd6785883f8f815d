//! Propiedades del splitter: partición disjunta que cubre el extent
//! completo, determinismo y el recorte de fantasmas.

use grid_core::extent::Extent;
use grid_core::splitter::{split, SplitPolicy};

fn disjoint(a: &Extent, b: &Extent) -> bool {
    a.intersect(b).is_empty()
}

fn covered_points(pieces: &[Extent]) -> i64 {
    pieces.iter().map(Extent::num_points).sum()
}

#[test]
fn cuatro_piezas_del_escenario_de_referencia() {
    let whole = Extent([0, 9, 0, 9, 0, 0]);
    let p: Vec<Extent> = (0..4).map(|i| split(&whole, i, 4, 0, SplitPolicy::Block, false))
                               .collect();
    assert_eq!(p[0], Extent([0, 4, 0, 4, 0, 0]));
    assert_eq!(p[1], Extent([5, 9, 0, 4, 0, 0]));
    assert_eq!(p[2], Extent([0, 4, 5, 9, 0, 0]));
    assert_eq!(p[3], Extent([5, 9, 5, 9, 0, 0]));
}

#[test]
fn particion_disjunta_y_completa_para_todo_n() {
    let whole = Extent([0, 19, 0, 14, 0, 4]);
    for n in 1..=64 {
        let pieces: Vec<Extent> = (0..n).map(|i| split(&whole, i, n, 0, SplitPolicy::Block, false))
                                        .collect();
        for (i, a) in pieces.iter().enumerate() {
            for b in pieces.iter().skip(i + 1) {
                assert!(disjoint(a, b), "piezas solapadas con n={n}");
            }
        }
        let union = pieces.iter().fold(Extent::EMPTY, |acc, p| acc.union(p));
        assert_eq!(union, whole, "la union no cubre el whole con n={n}");
        assert_eq!(covered_points(&pieces), whole.num_points(),
                   "puntos perdidos o duplicados con n={n}");
    }
}

#[test]
fn fantasmas_expanden_y_recortan() {
    let whole = Extent([0, 9, 0, 9, 0, 0]);
    let p0 = split(&whole, 0, 4, 1, SplitPolicy::Block, false);
    assert_eq!(p0, Extent([0, 5, 0, 5, 0, 0]));
    // la pieza del rincón opuesto también queda dentro del whole
    let p3 = split(&whole, 3, 4, 1, SplitPolicy::Block, false);
    assert_eq!(p3, Extent([4, 9, 4, 9, 0, 0]));
}

#[test]
fn determinismo() {
    let whole = Extent([0, 99, 0, 49, 0, 24]);
    for i in 0..16 {
        let a = split(&whole, i, 16, 2, SplitPolicy::Block, false);
        let b = split(&whole, i, 16, 2, SplitPolicy::Block, false);
        assert_eq!(a, b);
    }
}

#[test]
fn fuera_de_rango_y_degenerados() {
    let whole = Extent([0, 9, 0, 9, 0, 0]);
    assert!(split(&whole, 4, 4, 0, SplitPolicy::Block, false).is_empty());
    assert!(split(&whole, 0, 0, 0, SplitPolicy::Block, false).is_empty());
    assert!(split(&Extent::EMPTY, 0, 2, 0, SplitPolicy::Block, false).is_empty());

    // una sola celda no admite cortes: la pieza 0 se la queda
    let unit = Extent([3, 4, 3, 4, 0, 0]);
    assert_eq!(split(&unit, 0, 8, 0, SplitPolicy::Block, false), unit);
    assert!(split(&unit, 7, 8, 0, SplitPolicy::Block, false).is_empty());
}

#[test]
fn politicas_de_slab() {
    let whole = Extent([0, 9, 0, 9, 0, 9]);
    for i in 0..4 {
        let p = split(&whole, i, 4, 0, SplitPolicy::XSlab, false);
        // sólo se corta x: y y z quedan completos
        assert_eq!([p.0[2], p.0[3], p.0[4], p.0[5]], [0, 9, 0, 9]);
    }
    for i in 0..4 {
        let p = split(&whole, i, 4, 0, SplitPolicy::ZSlab, false);
        assert_eq!([p.0[0], p.0[1], p.0[2], p.0[3]], [0, 9, 0, 9]);
    }
}

#[test]
fn corte_por_puntos() {
    let whole = Extent([0, 9, 0, 0, 0, 0]);
    let a = split(&whole, 0, 2, 0, SplitPolicy::Block, true);
    let b = split(&whole, 1, 2, 0, SplitPolicy::Block, true);
    assert_eq!(a, Extent([0, 4, 0, 0, 0, 0]));
    assert_eq!(b, Extent([5, 9, 0, 0, 0, 0]));
    assert!(disjoint(&a, &b));
    assert_eq!(a.union(&b), whole);
}
