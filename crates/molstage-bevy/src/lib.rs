//! # Molstage-Bevy
//!
//! A plugin for viewing protein-ligand complexes from molstage-core using
//! the Bevy game engine.
//!
//! This crate is a thin orchestration layer: it marshals parsed structures
//! into Bevy entities with one mesh per representation, and drives the
//! load/reload lifecycle the viewer exposes. All rendering is the engine's.
//!
//! ## Features
//! - Stage bootstrap with camera and light rig bound to the primary window
//! - Cartoon, licorice, spacefill, ball-and-stick and line representations
//!   scoped by selection expressions
//! - Category toggles applied wholesale on reload
//! - Camera auto-fit plus orientation capture/restore across reloads
//!
pub mod colors;
pub mod plugin;
pub mod representation;
pub mod stage;
pub use colors::ColorScheme;
pub use plugin::{
    LoadStructure, ReloadStructure, RepresentationOf, StagePlugin, StageSettings,
    StructureComponent,
};
pub use representation::{Representation, RepresentationKind, RepresentationStyle};
pub use stage::{Orientation, Stage, StageCamera};
