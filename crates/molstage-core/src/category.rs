//! # Categories
//!
//! Every residue is sorted into one of five viewer categories. The category
//! decides which representation toggle controls the residue's atoms and
//! which default style renders them.
//!
//! Classification is by residue name:
//!
//! - `is_amino_acid()` - canonical amino acids and common variants
//! - `is_water()` - crystallographic and force-field water names
//! - `is_ion()` - monoatomic ion residues
//! - `is_lipid()` - common membrane lipid residues
//!
//! Anything unmatched falls through to [`Category::Ligand`], so cofactors,
//! small molecules and modified residues stay reachable through the ligand
//! selection expression.

use std::collections::HashSet;
use std::sync::OnceLock;

/// The five representation categories, in toggle order.
///
/// The discriminants are stable: external toggle state addresses categories
/// by index 0-4 in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Category {
    Protein,
    Ligand,
    Water,
    Lipid,
    Ion,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 5;

    /// Stable toggle index of this category.
    pub fn index(&self) -> usize {
        match self {
            Category::Protein => 0,
            Category::Ligand => 1,
            Category::Water => 2,
            Category::Lipid => 3,
            Category::Ion => 4,
        }
    }

    /// Category at a toggle index, if in range.
    pub fn from_index(index: usize) -> Option<Category> {
        match index {
            0 => Some(Category::Protein),
            1 => Some(Category::Ligand),
            2 => Some(Category::Water),
            3 => Some(Category::Lipid),
            4 => Some(Category::Ion),
            _ => None,
        }
    }

    /// Classify a residue by name. The name is matched case-insensitively.
    pub fn of_residue(res_name: &str) -> Category {
        let name = res_name.trim().to_ascii_uppercase();
        if is_amino_acid(&name) {
            Category::Protein
        } else if is_water(&name) {
            Category::Water
        } else if is_ion(&name) {
            Category::Ion
        } else if is_lipid(&name) {
            Category::Lipid
        } else {
            Category::Ligand
        }
    }
}

static AMINO_ACIDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
static WATERS: OnceLock<HashSet<&'static str>> = OnceLock::new();
static IONS: OnceLock<HashSet<&'static str>> = OnceLock::new();
static LIPIDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

#[rustfmt::skip]
pub(crate) fn is_amino_acid(name: &str) -> bool {
    AMINO_ACIDS
        .get_or_init(|| {
            HashSet::from([
                // canonical 20
                "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS",
                "ILE", "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP",
                "TYR", "VAL",
                // protonation variants and common modifications
                "ASH", "GLH", "HID", "HIE", "HIP", "CYX", "CYM", "LYN", "HYP",
                "MSE", "SEC", "PYL",
            ])
        })
        .contains(name)
}

#[rustfmt::skip]
pub(crate) fn is_water(name: &str) -> bool {
    WATERS
        .get_or_init(|| {
            HashSet::from([
                "HOH", "WAT", "H2O", "DOD", "SOL", "TIP", "TIP3", "TIP4", "SPC",
            ])
        })
        .contains(name)
}

#[rustfmt::skip]
pub(crate) fn is_ion(name: &str) -> bool {
    IONS.get_or_init(|| {
            HashSet::from([
                "NA", "CL", "K", "MG", "CA", "ZN", "MN", "FE", "FE2", "CU",
                "CU1", "NI", "CO", "CD", "HG", "SR", "BA", "LI", "RB", "CS",
                "F", "BR", "IOD", "YB", "AL", "AU", "AG", "PT", "PB",
            ])
        })
        .contains(name)
}

#[rustfmt::skip]
pub(crate) fn is_lipid(name: &str) -> bool {
    LIPIDS
        .get_or_init(|| {
            HashSet::from([
                "POPC", "POPE", "POPS", "POPG", "DOPC", "DOPE", "DOPS", "DPPC",
                "DPPE", "DMPC", "DLPC", "DLPE", "CHL1", "CLR", "PLM", "OLA",
                "OLB", "MYR", "STE", "PEE", "PCW",
            ])
        })
        .contains(name)
}
