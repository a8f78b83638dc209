//! molstage-test-data
//!
//! Structure fixtures embedded in the crate for use in testing. Each fixture
//! is a `TestFile` packaging the raw file data; it can be materialized as a
//! temporary file for code that reads from disk, or borrowed as text for code
//! that ingests inline structure blobs.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use molstage_test_data::TestFile;
/// let (pdb_file, _temp) = TestFile::complex_01().create_temp().unwrap();
/// let text = TestFile::complex_01().text();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Small protein-ligand complex: a three-residue chain, an aromatic
    /// ligand, a palmitate fragment, a sodium ion and two waters. Exercises
    /// all five viewer categories.
    pub fn complex_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/structures/complex.pdb"),
            suffix: "pdb",
        }
    }

    /// The fixture as borrowed text, for APIs that take structure blobs
    /// rather than paths.
    pub fn text(&self) -> &'static str {
        std::str::from_utf8(self.filebinary).unwrap()
    }

    /// Write the fixture to a temporary file and return its path along with
    /// the handle keeping it alive.
    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let suffix = format!(".{}", self.suffix);
        let temp = Builder::new().suffix(&suffix).tempfile()?;
        fs::write(temp.path(), self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();
        Ok((path, temp))
    }
}
