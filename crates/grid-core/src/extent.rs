//! Extents estructurados 3D.
//!
//! Caja `[x_min, x_max, y_min, y_max, z_min, z_max]` de índices inclusivos.
//! El sentinel vacío tiene min > max por eje; cualquier eje invertido hace al
//! extent vacío completo.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent(pub [i32; 6]);

impl Extent {
    /// Extent vacío canónico.
    pub const EMPTY: Extent = Extent([0, -1, 0, -1, 0, -1]);

    pub fn new(bounds: [i32; 6]) -> Extent {
        Extent(bounds)
    }

    pub fn from_slice(v: &[i64]) -> Option<Extent> {
        if v.len() != 6 {
            return None;
        }
        let mut out = [0i32; 6];
        for (dst, src) in out.iter_mut().zip(v) {
            *dst = *src as i32;
        }
        Some(Extent(out))
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.0.iter().map(|&v| v as i64).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] > self.0[1] || self.0[2] > self.0[3] || self.0[4] > self.0[5]
    }

    /// Tamaño por eje en puntos (inclusive ⇒ max - min + 1).
    pub fn size(&self) -> [i64; 3] {
        if self.is_empty() {
            return [0, 0, 0];
        }
        [i64::from(self.0[1]) - i64::from(self.0[0]) + 1,
         i64::from(self.0[3]) - i64::from(self.0[2]) + 1,
         i64::from(self.0[5]) - i64::from(self.0[4]) + 1]
    }

    pub fn num_points(&self) -> i64 {
        let s = self.size();
        s[0] * s[1] * s[2]
    }

    /// `true` si `other` cae completamente dentro de `self`. Un extent vacío
    /// está contenido en cualquiera.
    pub fn contains(&self, other: &Extent) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
        && self.0[0] <= other.0[0]
        && self.0[1] >= other.0[1]
        && self.0[2] <= other.0[2]
        && self.0[3] >= other.0[3]
        && self.0[4] <= other.0[4]
        && self.0[5] >= other.0[5]
    }

    /// Caja envolvente de ambos. Vacío es neutro.
    pub fn union(&self, other: &Extent) -> Extent {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Extent([self.0[0].min(other.0[0]),
                self.0[1].max(other.0[1]),
                self.0[2].min(other.0[2]),
                self.0[3].max(other.0[3]),
                self.0[4].min(other.0[4]),
                self.0[5].max(other.0[5])])
    }

    pub fn intersect(&self, other: &Extent) -> Extent {
        if self.is_empty() || other.is_empty() {
            return Extent::EMPTY;
        }
        let out = Extent([self.0[0].max(other.0[0]),
                          self.0[1].min(other.0[1]),
                          self.0[2].max(other.0[2]),
                          self.0[3].min(other.0[3]),
                          self.0[4].max(other.0[4]),
                          self.0[5].min(other.0[5])]);
        if out.is_empty() {
            Extent::EMPTY
        } else {
            out
        }
    }

    /// Expande `levels` unidades hacia afuera en los tres ejes.
    pub fn grow(&self, levels: i32) -> Extent {
        if self.is_empty() || levels == 0 {
            return *self;
        }
        Extent([self.0[0] - levels,
                self.0[1] + levels,
                self.0[2] - levels,
                self.0[3] + levels,
                self.0[4] - levels,
                self.0[5] + levels])
    }

    /// Recorta a los límites de `bounds`.
    pub fn clamp(&self, bounds: &Extent) -> Extent {
        self.intersect(bounds)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Extent::EMPTY
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let e = &self.0;
        write!(f, "[{},{} {},{} {},{}]", e[0], e[1], e[2], e[3], e[4], e[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacio_es_neutro_en_union() {
        let a = Extent([0, 4, 0, 4, 0, 0]);
        assert_eq!(Extent::EMPTY.union(&a), a);
        assert_eq!(a.union(&Extent::EMPTY), a);
    }

    #[test]
    fn contencion_con_vacio() {
        let a = Extent([0, 9, 0, 9, 0, 0]);
        assert!(a.contains(&Extent::EMPTY));
        assert!(!Extent::EMPTY.contains(&a));
        assert!(a.contains(&Extent([2, 5, 0, 9, 0, 0])));
        assert!(!a.contains(&Extent([2, 10, 0, 9, 0, 0])));
    }

    #[test]
    fn grow_y_clamp() {
        let whole = Extent([0, 9, 0, 9, 0, 0]);
        let piece = Extent([0, 4, 0, 4, 0, 0]);
        assert_eq!(piece.grow(1).clamp(&whole), Extent([0, 5, 0, 5, 0, 0]));
    }

    #[test]
    fn conteo_de_puntos() {
        assert_eq!(Extent([0, 9, 0, 9, 0, 0]).num_points(), 100);
        assert_eq!(Extent::EMPTY.num_points(), 0);
    }
}
