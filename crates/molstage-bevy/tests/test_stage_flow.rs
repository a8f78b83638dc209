//! Headless exercises of the load/reload lifecycle. No render backend:
//! meshes and materials live in plain asset collections, the camera is just
//! a transform, and the app is ticked until pending parses resolve.

use bevy::prelude::*;
use molstage_bevy::{
    LoadStructure, ReloadStructure, RepresentationOf, StageCamera, StagePlugin, StageSettings,
    StructureComponent,
};
use molstage_core::{Category, RepresentationToggles};
use molstage_test_data::TestFile;
use std::time::Duration;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(Assets::<Mesh>::default());
    app.insert_resource(Assets::<StandardMaterial>::default());
    app.add_plugins(StagePlugin::new());
    // run Startup so the camera rig exists
    app.update();
    app
}

fn component_count(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<(), With<StructureComponent>>()
        .iter(app.world())
        .count()
}

fn representation_categories(app: &mut App) -> Vec<Category> {
    let mut categories: Vec<Category> = app
        .world_mut()
        .query::<&RepresentationOf>()
        .iter(app.world())
        .map(|r| r.0)
        .collect();
    categories.sort_by_key(|c| c.index());
    categories
}

fn load_and_settle(app: &mut App, text: &str) {
    app.world_mut().send_event(LoadStructure {
        text: text.to_string(),
    });
    run_until_loaded(app, 1);
}

fn reload_and_settle(app: &mut App, toggles: RepresentationToggles, ligand_selection: &str) {
    app.world_mut().send_event(ReloadStructure {
        text: TestFile::complex_01().text().to_string(),
        toggles,
        ligand_selection: ligand_selection.to_string(),
    });
    run_until_loaded(app, 1);
}

/// Tick until `expected` structure components exist (or fail loudly).
fn run_until_loaded(app: &mut App, expected: usize) {
    for _ in 0..500 {
        app.update();
        if component_count(app) == expected {
            // extra frame so child spawns are flushed
            app.update();
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!(
        "expected {expected} structure component(s), found {}",
        component_count(app)
    );
}

#[test]
fn test_initial_load_applies_four_representations() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    assert_eq!(component_count(&mut app), 1);
    assert_eq!(
        representation_categories(&mut app),
        [
            Category::Protein,
            Category::Ligand,
            Category::Water,
            Category::Ion,
        ]
    );
}

#[test]
fn test_bootstrap_spawns_camera_once() {
    let mut app = test_app();
    // force the bootstrap to run every frame on top of its Startup run;
    // it must still only ever create one camera rig
    app.add_systems(Update, molstage_bevy::plugin::setup_stage);
    app.update();
    app.update();
    app.update();
    let cameras = app
        .world_mut()
        .query_filtered::<(), With<StageCamera>>()
        .iter(app.world())
        .count();
    assert_eq!(cameras, 1);
}

#[test]
fn test_reload_honors_toggles() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    let toggles = RepresentationToggles::from_active_indices(&[0, 2]);
    reload_and_settle(&mut app, toggles, "ligand and not hydrogen");

    assert_eq!(component_count(&mut app), 1);
    assert_eq!(
        representation_categories(&mut app),
        [Category::Protein, Category::Water]
    );
}

#[test]
fn test_reload_with_all_toggles_and_custom_ligand_selection() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    reload_and_settle(&mut app, RepresentationToggles::all(), "resname LIG");

    assert_eq!(
        representation_categories(&mut app),
        [
            Category::Protein,
            Category::Ligand,
            Category::Water,
            Category::Lipid,
            Category::Ion,
        ]
    );
}

#[test]
fn test_reload_skips_bad_ligand_selection() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    let toggles = RepresentationToggles::none()
        .with(Category::Ligand, true)
        .with(Category::Ion, true);
    reload_and_settle(&mut app, toggles, "resname ((");

    // the malformed ligand expression drops only the ligand representation
    assert_eq!(representation_categories(&mut app), [Category::Ion]);
}

#[test]
fn test_repeated_reloads_do_not_accumulate_components() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    for _ in 0..3 {
        reload_and_settle(
            &mut app,
            RepresentationToggles::all(),
            "ligand and not hydrogen",
        );
        assert_eq!(component_count(&mut app), 1);
    }
}

#[test]
fn test_orientation_survives_reload() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    let viewpoint = Transform::from_xyz(12.0, -3.0, 40.0).looking_at(Vec3::new(8.0, 8.0, 7.0), Vec3::Y);
    {
        let mut query = app.world_mut().query_filtered::<&mut Transform, With<StageCamera>>();
        let mut transform = query.single_mut(app.world_mut());
        *transform = viewpoint;
    }

    reload_and_settle(
        &mut app,
        RepresentationToggles::all(),
        "ligand and not hydrogen",
    );

    let mut query = app.world_mut().query_filtered::<&Transform, With<StageCamera>>();
    let after = *query.single(app.world());
    assert!(after.translation.abs_diff_eq(viewpoint.translation, 1e-5));
    assert!(after.rotation.angle_between(viewpoint.rotation) < 1e-5);
}

#[test]
fn test_initial_load_fits_camera_to_structure() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    let (center, radius) = {
        let stage = app.world().resource::<molstage_bevy::Stage>();
        stage.bounds().expect("bounds recorded after load")
    };
    assert!(radius > 0.0);

    let mut query = app.world_mut().query_filtered::<&Transform, With<StageCamera>>();
    let camera = *query.single(app.world());
    let settings = StageSettings::default();
    let distance = (center - camera.translation).length();
    // at least far enough away to frame the bounding sphere
    assert!(distance >= radius / (settings.fovy / 2.0).sin() * 0.99);
}

#[test]
fn test_reload_from_json_view_request() {
    let mut app = test_app();
    load_and_settle(&mut app, TestFile::complex_01().text());

    let request: molstage_core::ViewRequest =
        serde_json::from_str(r#"{"active": [1, 4], "ligand_selection": "resname LIG"}"#).unwrap();
    app.world_mut().send_event(ReloadStructure::from_request(
        TestFile::complex_01().text(),
        &request,
    ));
    run_until_loaded(&mut app, 1);

    assert_eq!(
        representation_categories(&mut app),
        [Category::Ligand, Category::Ion]
    );
}

#[test]
fn test_failed_load_leaves_stage_empty() {
    let mut app = test_app();
    app.world_mut().send_event(LoadStructure {
        text: "   ".to_string(),
    });
    for _ in 0..50 {
        app.update();
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(component_count(&mut app), 0);
}
