//! Interactive viewer demo: loads a structure (a path passed on the command
//! line, or the bundled complex), then rebuilds the scene from the current
//! toggle state on every press of `R`. Keys 1-5 flip the protein, ligand,
//! water, lipid and ion toggles.
use anyhow::Result;
use bevy::prelude::*;
use molstage_bevy::{ReloadStructure, StagePlugin};
use molstage_core::{Category, RepresentationToggles};
use molstage_test_data::TestFile;

#[derive(Resource)]
struct ViewState {
    text: String,
    toggles: RepresentationToggles,
    ligand_selection: String,
}

fn main() -> Result<()> {
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => TestFile::complex_01().text().to_string(),
    };

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(StagePlugin::new().with_structure(text.clone()))
        .insert_resource(ViewState {
            text,
            toggles: RepresentationToggles::all(),
            ligand_selection: "ligand and not hydrogen".to_string(),
        })
        .add_systems(Update, keyboard_controls)
        .run();
    Ok(())
}

fn keyboard_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ViewState>,
    mut reloads: EventWriter<ReloadStructure>,
) {
    let bindings = [
        (KeyCode::Digit1, Category::Protein),
        (KeyCode::Digit2, Category::Ligand),
        (KeyCode::Digit3, Category::Water),
        (KeyCode::Digit4, Category::Lipid),
        (KeyCode::Digit5, Category::Ion),
    ];
    for (key, category) in bindings {
        if keys.just_pressed(key) {
            let flipped = !state.toggles.is_active(category);
            state.toggles = state.toggles.with(category, flipped);
            info!("{category} toggled {}", if flipped { "on" } else { "off" });
        }
    }

    if keys.just_pressed(KeyCode::KeyR) {
        reloads.send(ReloadStructure {
            text: state.text.clone(),
            toggles: state.toggles,
            ligand_selection: state.ligand_selection.clone(),
        });
    }
}
