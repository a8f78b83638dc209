use crate::error::LoadError;
use crate::store::AtomStore;
use itertools::Itertools;
use pdbtbx::{Element, Format, ReadOptions, StrictnessLevel, PDB};
use std::io::BufReader;

impl AtomStore {
    /// Parse a structure delivered as plain PDB text.
    ///
    /// Structures arrive as inline text blobs rather than files, so this
    /// reads from memory. Parsing is lenient: real-world viewer input is
    /// frequently missing the strict-format niceties.
    pub fn from_pdb_text(text: &str) -> Result<AtomStore, LoadError> {
        if text.trim().is_empty() {
            return Err(LoadError::EmptyInput);
        }
        let reader = BufReader::new(text.as_bytes());
        let (pdb, _discarded) = ReadOptions::default()
            .set_format(Format::Pdb)
            .set_level(StrictnessLevel::Loose)
            .read_raw(reader)
            .map_err(|errors| {
                LoadError::Parse(errors.iter().map(|e| e.to_string()).collect())
            })?;
        Ok(AtomStore::from(&pdb))
    }
}

impl From<&PDB> for AtomStore {
    // the PDB API requires us to iterate:
    // PDB --> Chain --> Residue --> Atom if we want data from all.
    // Here we collect all the data in one go and build the columnar store.
    fn from(pdb_data: &PDB) -> Self {
        let (coords, is_hetero, atom_names, res_ids, res_names, elements, chain_ids): (
            Vec<[f32; 3]>,
            Vec<bool>,
            Vec<String>,
            Vec<i32>,
            Vec<String>,
            Vec<Element>,
            Vec<String>,
        ) = pdb_data
            .chains()
            .flat_map(|chain| {
                let chain_id = chain.id().to_string();
                chain.residues().flat_map(move |residue| {
                    let (res_number, _insertion_code) = residue.id();
                    let res_id = res_number as i32;
                    let res_name = residue.name().unwrap_or_default().to_string();
                    let chain_id = chain_id.clone();
                    residue.atoms().filter_map(move |atom| {
                        atom.element().map(|element| {
                            let (x, y, z) = atom.pos();
                            (
                                [x as f32, y as f32, z as f32],
                                atom.hetero(),
                                atom.name().to_string(),
                                res_id,
                                res_name.clone(),
                                element,
                                chain_id.clone(),
                            )
                        })
                    })
                })
            })
            .multiunzip();

        AtomStore::new(
            coords, elements, atom_names, res_ids, res_names, chain_ids, is_hetero,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{AtomStore, Category, LoadError};
    use itertools::Itertools;
    use molstage_test_data::TestFile;

    #[test]
    fn test_from_pdb_text() {
        let store = AtomStore::from_pdb_text(TestFile::complex_01().text()).unwrap();
        assert_eq!(store.len(), 30);

        let counts = category_counts(&store);
        assert_eq!(counts, [15, 7, 2, 5, 1]);

        let chains: Vec<String> = store
            .chain_ids()
            .iter()
            .cloned()
            .unique()
            .sorted()
            .collect();
        assert_eq!(chains, ["A", "B", "I", "L", "W"]);

        // HETATM records keep their hetero flag, polymer atoms do not
        assert!(!store.hetero_flags()[0]);
        assert!(store.hetero_flags()[store.len() - 1]);
    }

    #[test]
    fn test_from_pdb_file() {
        let (path, _temp) = TestFile::complex_01().create_temp().unwrap();
        let (pdb, _errors) = pdbtbx::open(&path).unwrap();
        let store = AtomStore::from(&pdb);
        assert_eq!(store.len(), 30);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            AtomStore::from_pdb_text("   \n"),
            Err(LoadError::EmptyInput)
        ));
    }

    #[test]
    fn test_garbage_input() {
        let result = AtomStore::from_pdb_text("this is not a structure");
        match result {
            // Loose parsing may reject outright or yield an empty model
            Err(LoadError::Parse(messages)) => assert!(!messages.is_empty()),
            Ok(store) => assert!(store.is_empty()),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    fn category_counts(store: &AtomStore) -> [usize; Category::COUNT] {
        let mut counts = [0usize; Category::COUNT];
        for category in store.categories() {
            counts[category.index()] += 1;
        }
        counts
    }
}
