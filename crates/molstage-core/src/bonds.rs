/// Bond
///
/// A covalent bond between two atoms of an [`AtomStore`], by atom index.
///
/// [`AtomStore`]: crate::AtomStore
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bond {
    atom1: u32,
    atom2: u32,
    order: BondOrder,
}

impl Bond {
    pub fn new(atom1: u32, atom2: u32, order: BondOrder) -> Self {
        Bond {
            atom1,
            atom2,
            order,
        }
    }

    pub fn atom_indices(&self) -> (usize, usize) {
        (self.atom1 as usize, self.atom2 as usize)
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }
}

/// BondOrder
///
/// Distance-inferred bonds only distinguish single from short (likely
/// double) contacts; anything else stays `Unset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BondOrder {
    Unset,
    Single,
    Double,
}

/// Single-bond covalent radius in Angstrom, for distance-based bond
/// inference. Values follow the Cordero compilation; unknown elements get a
/// carbon-like fallback.
#[rustfmt::skip]
pub(crate) fn covalent_radius(element: pdbtbx::Element) -> f32 {
    use pdbtbx::Element;
    match element {
        Element::H  => 0.31,
        Element::B  => 0.84,
        Element::C  => 0.76,
        Element::N  => 0.71,
        Element::O  => 0.66,
        Element::F  => 0.57,
        Element::Na => 1.66,
        Element::Mg => 1.41,
        Element::Si => 1.11,
        Element::P  => 1.07,
        Element::S  => 1.05,
        Element::Cl => 1.02,
        Element::K  => 2.03,
        Element::Ca => 1.76,
        Element::Mn => 1.39,
        Element::Fe => 1.32,
        Element::Co => 1.26,
        Element::Ni => 1.24,
        Element::Cu => 1.32,
        Element::Zn => 1.22,
        Element::Se => 1.20,
        Element::Br => 1.20,
        Element::I  => 1.39,
        _ => 0.75,
    }
}
