//! # molstage-core
//!
//! Structure model and selection evaluation for the molstage viewer crates.
//!
//! __molstage-core__ provides functionality for:
//! * Ingesting structures delivered as plain PDB text
//! * Classifying residues into the five viewer categories
//!   (protein, ligand, water, lipid, ion)
//! * Evaluating selection expressions such as `ligand and not hydrogen`
//! * Inferring covalent bonds for stick-style rendering
//!
//! The main entry point is the [`AtomStore`] struct, a columnar snapshot of
//! one loaded structure. Rendering itself lives in `molstage-bevy`; this
//! crate only prepares the data those representations are built from.
//!
mod bonds;
mod category;
mod conversions;
mod error;
mod selection;
mod store;
mod toggles;

pub use self::bonds::{Bond, BondOrder};
pub use self::category::Category;
pub use self::error::{LoadError, SelectionParseError};
pub use self::selection::{Selection, SelectionExpr};
pub use self::store::{AtomStore, ResidueRun};
pub use self::toggles::{RepresentationToggles, ViewRequest};
