//! Representation toggle state.
//!
//! Which of the five categories should be rendered after a reload. The
//! toggle state comes from outside the viewer (a widget, a request payload)
//! as a list of active category indices and is re-derived on every reload,
//! never diffed against the previous one.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Per-category on/off bits, indexed in [`Category`] toggle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationToggles {
    active: [bool; Category::COUNT],
}

impl RepresentationToggles {
    pub fn all() -> Self {
        RepresentationToggles {
            active: [true; Category::COUNT],
        }
    }

    pub fn none() -> Self {
        RepresentationToggles {
            active: [false; Category::COUNT],
        }
    }

    /// Build from an external list of active category indices. Out-of-range
    /// indices are ignored.
    pub fn from_active_indices(indices: &[usize]) -> Self {
        let mut toggles = RepresentationToggles::none();
        for &index in indices {
            if let Some(category) = Category::from_index(index) {
                toggles.active[category.index()] = true;
            }
        }
        toggles
    }

    pub fn with(mut self, category: Category, on: bool) -> Self {
        self.active[category.index()] = on;
        self
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.active[category.index()]
    }

    /// Active categories in toggle order.
    pub fn active_categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::iter().filter(|category| self.is_active(*category))
    }
}

impl Default for RepresentationToggles {
    fn default() -> Self {
        RepresentationToggles::all()
    }
}

/// The externally supplied reload payload: active toggle indices plus the
/// ligand selection expression used to filter candidate ligands at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub active: Vec<usize>,
    #[serde(default = "default_ligand_selection")]
    pub ligand_selection: String,
}

impl ViewRequest {
    pub fn toggles(&self) -> RepresentationToggles {
        RepresentationToggles::from_active_indices(&self.active)
    }
}

fn default_ligand_selection() -> String {
    "ligand and not hydrogen".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_active_indices() {
        let toggles = RepresentationToggles::from_active_indices(&[0, 2, 9]);
        assert!(toggles.is_active(Category::Protein));
        assert!(toggles.is_active(Category::Water));
        assert!(!toggles.is_active(Category::Ligand));
        assert!(!toggles.is_active(Category::Lipid));
        assert!(!toggles.is_active(Category::Ion));
        assert_eq!(
            toggles.active_categories().collect::<Vec<_>>(),
            [Category::Protein, Category::Water]
        );
    }

    #[test]
    fn test_with() {
        let toggles = RepresentationToggles::none().with(Category::Ion, true);
        assert_eq!(
            toggles.active_categories().collect::<Vec<_>>(),
            [Category::Ion]
        );
    }

    #[test]
    fn test_view_request_json() {
        let request: ViewRequest =
            serde_json::from_str(r#"{"active": [0, 2], "ligand_selection": "resname LIG"}"#)
                .unwrap();
        assert_eq!(request.ligand_selection, "resname LIG");
        let toggles = request.toggles();
        assert!(toggles.is_active(Category::Protein));
        assert!(!toggles.is_active(Category::Ligand));

        // omitted fields fall back to defaults
        let bare: ViewRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.ligand_selection, "ligand and not hydrogen");
        assert!(bare.toggles().active_categories().next().is_none());
    }
}
