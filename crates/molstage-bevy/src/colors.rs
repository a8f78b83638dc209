//! Colors
//!
//! This module defines the color mapping used for rendering.
use bevy::prelude::Color;
use molstage_core::{AtomStore, SelectionExpr};

/// Represents different color schemes for rendering atoms.
#[derive(Clone)]
pub enum ColorScheme {
    /// A solid, single color for all atoms.
    Solid(Color),
    /// Colors atoms based on their element type (CPK-style).
    ByElement,
    /// Ordered selection rules. The first rule whose selection contains the
    /// atom wins; unmatched atoms get the fallback color.
    BySelection {
        rules: Vec<(SelectionExpr, Color)>,
        fallback: Color,
    },
}

impl ColorScheme {
    /// The protein scheme of the initial viewer load: everything matching
    /// `protein` in signal green, the rest neutral.
    pub fn protein_green() -> Self {
        ColorScheme::BySelection {
            rules: vec![(
                SelectionExpr::Category(molstage_core::Category::Protein),
                Color::srgb_u8(0x59, 0xe5, 0x00),
            )],
            fallback: Color::srgb(0.8, 0.8, 0.8),
        }
    }

    /// Resolve one color per atom of the store.
    pub fn atom_colors(&self, store: &AtomStore) -> Vec<Color> {
        match self {
            ColorScheme::Solid(color) => vec![*color; store.len()],
            ColorScheme::ByElement => store
                .elements()
                .iter()
                .map(|element| element_color(*element))
                .collect(),
            ColorScheme::BySelection { rules, fallback } => {
                let mut colors = vec![*fallback; store.len()];
                for (expr, color) in rules.iter().rev() {
                    for index in expr.eval(store).iter() {
                        colors[index] = *color;
                    }
                }
                colors
            }
        }
    }
}

/// CPK-style element colors.
fn element_color(element: pdbtbx::Element) -> Color {
    use pdbtbx::Element;
    match element {
        Element::H => Color::srgb(1.0, 1.0, 1.0),
        Element::C => Color::srgb(0.5, 0.5, 0.5),
        Element::N => Color::srgb(0.0, 0.0, 1.0),
        Element::O => Color::srgb(1.0, 0.0, 0.0),
        Element::S => Color::srgb(1.0, 1.0, 0.0),
        Element::P => Color::srgb(1.0, 0.5, 0.0),
        Element::Na | Element::K => Color::srgb(0.5, 0.0, 1.0),
        Element::Mg | Element::Ca => Color::srgb(0.0, 0.5, 0.0),
        Element::Cl => Color::srgb(0.0, 1.0, 0.0),
        Element::Fe | Element::Zn | Element::Mn | Element::Cu => Color::srgb(0.8, 0.5, 0.2),
        Element::F => Color::srgb(0.6, 0.9, 0.6),
        Element::Br => Color::srgb(0.6, 0.2, 0.1),
        Element::I => Color::srgb(0.4, 0.0, 0.6),
        _ => Color::srgb(1.0, 0.6, 0.8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molstage_test_data::TestFile;

    fn fixture() -> AtomStore {
        AtomStore::from_pdb_text(TestFile::complex_01().text()).unwrap()
    }

    #[test]
    fn test_solid_scheme() {
        let store = fixture();
        let colors = ColorScheme::Solid(Color::WHITE).atom_colors(&store);
        assert_eq!(colors.len(), store.len());
        assert!(colors.iter().all(|c| *c == Color::WHITE));
    }

    #[test]
    fn test_element_scheme() {
        let store = fixture();
        let colors = ColorScheme::ByElement.atom_colors(&store);
        // first fixture atom is the ALA backbone nitrogen
        assert_eq!(colors[0], Color::srgb(0.0, 0.0, 1.0));
        assert_eq!(colors[1], Color::srgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_selection_scheme() {
        let store = fixture();
        let colors = ColorScheme::protein_green().atom_colors(&store);
        let green = Color::srgb_u8(0x59, 0xe5, 0x00);
        for (index, color) in colors.iter().enumerate() {
            if store.categories()[index] == molstage_core::Category::Protein {
                assert_eq!(*color, green);
            } else {
                assert_eq!(*color, Color::srgb(0.8, 0.8, 0.8));
            }
        }
    }
}
