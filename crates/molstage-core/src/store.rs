use crate::bonds::{covalent_radius, Bond, BondOrder};
use crate::category::Category;
use pdbtbx::Element;

/// Extra reach beyond the summed covalent radii when deciding whether two
/// atoms are bonded, in Angstrom.
const BOND_TOLERANCE: f32 = 0.45;

/// Contacts shorter than this are overlapping records, not bonds.
const MIN_BOND_DISTANCE: f32 = 0.4;

/// Longest accepted peptide C-N link. Normal peptide bonds sit near 1.33 A;
/// anything past this is a chain break.
const MAX_PEPTIDE_DISTANCE: f32 = 2.0;

/// Columnar snapshot of one loaded structure.
///
/// All per-atom annotations live in parallel vectors indexed by atom. The
/// store is immutable once built: a reload replaces the whole snapshot, it
/// never patches one in place.
pub struct AtomStore {
    coords: Vec<[f32; 3]>,
    elements: Vec<Element>,
    atom_names: Vec<String>,
    res_ids: Vec<i32>,
    res_names: Vec<String>,
    chain_ids: Vec<String>,
    is_hetero: Vec<bool>,
    categories: Vec<Category>,
    // residue run boundaries, terminated by a len() sentinel
    residue_starts: Vec<usize>,
    bonds: Vec<Bond>,
}

/// One contiguous residue: atom range plus shared annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueRun {
    pub start: usize,
    pub end: usize,
    pub res_id: i32,
    pub res_name: String,
    pub chain_id: String,
    pub category: Category,
}

impl AtomStore {
    pub fn new(
        coords: Vec<[f32; 3]>,
        elements: Vec<Element>,
        atom_names: Vec<String>,
        res_ids: Vec<i32>,
        res_names: Vec<String>,
        chain_ids: Vec<String>,
        is_hetero: Vec<bool>,
    ) -> Self {
        let atom_names: Vec<String> = atom_names
            .into_iter()
            .map(|n| n.trim().to_ascii_uppercase())
            .collect();
        let res_names: Vec<String> = res_names
            .into_iter()
            .map(|n| n.trim().to_ascii_uppercase())
            .collect();
        let categories: Vec<Category> = res_names
            .iter()
            .map(|name| Category::of_residue(name))
            .collect();

        let mut store = AtomStore {
            residue_starts: residue_starts(&res_ids, &res_names, &chain_ids),
            bonds: Vec::new(),
            coords,
            elements,
            atom_names,
            res_ids,
            res_names,
            chain_ids,
            is_hetero,
            categories,
        };
        store.bonds = store.infer_bonds();
        store
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[[f32; 3]] {
        &self.coords
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn atom_names(&self) -> &[String] {
        &self.atom_names
    }

    pub fn res_ids(&self) -> &[i32] {
        &self.res_ids
    }

    pub fn res_names(&self) -> &[String] {
        &self.res_names
    }

    pub fn chain_ids(&self) -> &[String] {
        &self.chain_ids
    }

    pub fn hetero_flags(&self) -> &[bool] {
        &self.is_hetero
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Iterate residues as contiguous atom runs, in file order.
    pub fn residues(&self) -> impl Iterator<Item = ResidueRun> + '_ {
        self.residue_starts.windows(2).map(|window| {
            let (start, end) = (window[0], window[1]);
            ResidueRun {
                start,
                end,
                res_id: self.res_ids[start],
                res_name: self.res_names[start].clone(),
                chain_id: self.chain_ids[start].clone(),
                category: self.categories[start],
            }
        })
    }

    /// Center and radius of the smallest axis-aligned sphere around all
    /// atoms. Used to frame the camera after a load.
    pub fn bounding_sphere(&self) -> ([f32; 3], f32) {
        if self.coords.is_empty() {
            return ([0.0; 3], 0.0);
        }
        let mut min = self.coords[0];
        let mut max = self.coords[0];
        for coord in &self.coords {
            for axis in 0..3 {
                min[axis] = min[axis].min(coord[axis]);
                max[axis] = max[axis].max(coord[axis]);
            }
        }
        let center = [
            (min[0] + max[0]) / 2.0,
            (min[1] + max[1]) / 2.0,
            (min[2] + max[2]) / 2.0,
        ];
        let radius = self
            .coords
            .iter()
            .map(|c| distance(c, &center))
            .fold(0.0_f32, f32::max);
        (center, radius)
    }

    // Pairwise covalent-radius check inside each residue, plus explicit
    // peptide C-N links between consecutive amino-acid residues of the same
    // chain. Inter-residue contacts are otherwise ignored.
    fn infer_bonds(&self) -> Vec<Bond> {
        let mut bonds = Vec::new();
        for residue in self.residues() {
            for i in residue.start..residue.end {
                for j in (i + 1)..residue.end {
                    let dist = distance(&self.coords[i], &self.coords[j]);
                    let reach = covalent_radius(self.elements[i]) + covalent_radius(self.elements[j]);
                    if dist > MIN_BOND_DISTANCE && dist <= reach + BOND_TOLERANCE {
                        let order = if dist < reach * 0.9 {
                            BondOrder::Double
                        } else {
                            BondOrder::Single
                        };
                        bonds.push(Bond::new(i as u32, j as u32, order));
                    }
                }
            }
        }
        let runs: Vec<ResidueRun> = self.residues().collect();
        for pair in runs.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.category != Category::Protein
                || next.category != Category::Protein
                || prev.chain_id != next.chain_id
            {
                continue;
            }
            let carbonyl = (prev.start..prev.end).find(|&i| self.atom_names[i] == "C");
            let amide = (next.start..next.end).find(|&i| self.atom_names[i] == "N");
            if let (Some(c), Some(n)) = (carbonyl, amide) {
                if distance(&self.coords[c], &self.coords[n]) <= MAX_PEPTIDE_DISTANCE {
                    bonds.push(Bond::new(c as u32, n as u32, BondOrder::Single));
                }
            }
        }
        bonds
    }
}

fn residue_starts(res_ids: &[i32], res_names: &[String], chain_ids: &[String]) -> Vec<usize> {
    let mut starts = Vec::new();
    for i in 0..res_ids.len() {
        let new_run = i == 0
            || res_ids[i] != res_ids[i - 1]
            || res_names[i] != res_names[i - 1]
            || chain_ids[i] != chain_ids[i - 1];
        if new_run {
            starts.push(i);
        }
    }
    starts.push(res_ids.len());
    starts
}

fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;
    use molstage_test_data::TestFile;

    fn fixture() -> AtomStore {
        AtomStore::from_pdb_text(TestFile::complex_01().text()).unwrap()
    }

    #[test]
    fn test_residue_runs() {
        let store = fixture();
        let runs: Vec<ResidueRun> = store.residues().collect();
        // ALA, GLY, SER, LIG, PLM, NA, HOH x2
        assert_eq!(runs.len(), 8);
        let by_name = |name: &str| runs.iter().find(|r| r.res_name == name).unwrap();
        assert_eq!(by_name("ALA").category, Category::Protein);
        assert_eq!(by_name("LIG").category, Category::Ligand);
        assert_eq!(by_name("PLM").category, Category::Lipid);
        assert_eq!(by_name("NA").category, Category::Ion);
        assert_eq!(by_name("HOH").category, Category::Water);
        // runs partition the store
        assert_eq!(runs.iter().map(|r| r.end - r.start).sum::<usize>(), store.len());
    }

    #[test]
    fn test_bond_inference() {
        let store = fixture();
        let names = store.atom_names();

        let has_bond = |a: &str, b: &str, res_id: i32| {
            store.bonds().iter().any(|bond| {
                let (i, j) = bond.atom_indices();
                let pair = (names[i].as_str(), names[j].as_str());
                store.res_ids()[i] == res_id
                    && ((pair == (a, b)) || (pair == (b, a)))
            })
        };

        assert!(has_bond("N", "CA", 1));
        assert!(has_bond("CA", "CB", 1));
        assert!(has_bond("C1", "C2", 101));
        assert!(has_bond("C1", "O1", 401));
        // peptide links across residues 1-2 and 2-3
        let peptide_links = store
            .bonds()
            .iter()
            .filter(|bond| {
                let (i, j) = bond.atom_indices();
                store.res_ids()[i] != store.res_ids()[j]
            })
            .count();
        assert_eq!(peptide_links, 2);
        // bare water oxygens and the ion stay unbonded
        for (idx, category) in store.categories().iter().enumerate() {
            if matches!(category, Category::Water | Category::Ion) {
                assert!(!store
                    .bonds()
                    .iter()
                    .any(|bond| bond.atom_indices().0 == idx || bond.atom_indices().1 == idx));
            }
        }
    }

    #[test]
    fn test_bounding_sphere_contains_all_atoms() {
        let store = fixture();
        let (center, radius) = store.bounding_sphere();
        assert!(radius > 0.0);
        for coord in store.coords() {
            assert!(distance(coord, &center) <= radius + 1e-4);
        }
    }

    #[test]
    fn test_empty_store_bounds() {
        let store = AtomStore::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert!(store.is_empty());
        assert_eq!(store.bounding_sphere(), ([0.0; 3], 0.0));
    }
}
