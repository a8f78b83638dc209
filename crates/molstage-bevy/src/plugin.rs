//! Stage plugin.
//!
//! Wires the viewer lifecycle into a Bevy app: bootstrap of the camera and
//! light rig, window-resize forwarding, and the load/reload flow. Structure
//! text is parsed off the main thread on the async compute pool; the
//! continuation that spawns representations and frames the camera runs once
//! the parse task completes.

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use bevy::tasks::futures_lite::future;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};
use bevy::window::WindowResized;
use molstage_core::{
    AtomStore, Category, LoadError, RepresentationToggles, SelectionExpr, ViewRequest,
};
use strum::IntoEnumIterator;

use crate::representation::Representation;
use crate::stage::{fit_transform, Orientation, Stage, StageCamera};

/// Load a structure into an empty stage and apply the fixed initial
/// representations (protein cartoon, ligand licorice, ion spacefill, water
/// licorice).
#[derive(Event)]
pub struct LoadStructure {
    pub text: String,
}

/// Replace everything on the stage with a new structure, applying only the
/// representations whose category toggle is set. The ligand selection
/// expression is supplied by the caller; the captured camera orientation is
/// reapplied once loading completes.
#[derive(Event)]
pub struct ReloadStructure {
    pub text: String,
    pub toggles: RepresentationToggles,
    pub ligand_selection: String,
}

impl ReloadStructure {
    /// Build a reload from an externally supplied view request (active
    /// toggle indices plus ligand selection, e.g. deserialized from JSON).
    pub fn from_request(text: impl Into<String>, request: &ViewRequest) -> Self {
        ReloadStructure {
            text: text.into(),
            toggles: request.toggles(),
            ligand_selection: request.ligand_selection.clone(),
        }
    }
}

/// Marker on the root entity of one loaded structure.
#[derive(Component)]
pub struct StructureComponent;

/// Marker on each spawned representation mesh, tagged with its category.
#[derive(Component)]
pub struct RepresentationOf(pub Category);

/// Stage tuning knobs.
#[derive(Resource, Clone)]
pub struct StageSettings {
    /// Vertical field of view of the stage camera, radians.
    pub fovy: f32,
    /// Extra margin applied when auto-fitting the camera.
    pub fit_padding: f32,
    /// Spawn the default key/fill/back light rig on bootstrap.
    pub spawn_lights: bool,
}

impl Default for StageSettings {
    fn default() -> Self {
        StageSettings {
            fovy: std::f32::consts::FRAC_PI_4,
            fit_padding: 1.1,
            spawn_lights: true,
        }
    }
}

#[derive(Clone)]
enum LoadMode {
    Initial,
    Reload {
        toggles: RepresentationToggles,
        ligand_selection: String,
        orientation: Option<Orientation>,
    },
}

/// An in-flight parse. Despawned either when the task finishes or when a
/// newer reload cancels it.
#[derive(Component)]
struct PendingLoad {
    task: Task<Result<AtomStore, LoadError>>,
    mode: LoadMode,
}

/// Plugin wiring the stage into an app.
///
/// ```ignore
/// use bevy::prelude::*;
/// use molstage_bevy::StagePlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(StagePlugin::new().with_structure(pdb_text))
///     .run();
/// ```
pub struct StagePlugin {
    settings: StageSettings,
    initial_structure: Option<String>,
}

impl StagePlugin {
    pub fn new() -> Self {
        StagePlugin {
            settings: StageSettings::default(),
            initial_structure: None,
        }
    }

    /// Queue a structure to load on startup.
    pub fn with_structure(mut self, text: impl Into<String>) -> Self {
        self.initial_structure = Some(text.into());
        self
    }

    pub fn with_settings(mut self, settings: StageSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Default for StagePlugin {
    fn default() -> Self {
        StagePlugin::new()
    }
}

#[derive(Resource)]
struct InitialStructure(Option<String>);

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .insert_resource(InitialStructure(self.initial_structure.clone()))
            .init_resource::<Stage>()
            .add_event::<LoadStructure>()
            .add_event::<ReloadStructure>()
            // present already under DefaultPlugins; required for windowless runs
            .add_event::<WindowResized>()
            .add_systems(Startup, (setup_stage, queue_initial_load).chain())
            .add_systems(
                Update,
                (handle_resize, dispatch_loads, finish_loads).chain(),
            );
    }
}

/// Spawn the camera and light rig, once. Safe to run repeatedly: if a stage
/// camera already exists this is a no-op.
pub fn setup_stage(
    mut commands: Commands,
    settings: Res<StageSettings>,
    existing: Query<(), With<StageCamera>>,
) {
    if !existing.is_empty() {
        return;
    }
    debug!("bootstrapping stage camera and lights");
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fovy,
            ..default()
        }),
        Transform::from_xyz(0.0, 50.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        StageCamera,
    ));

    if !settings.spawn_lights {
        return;
    }
    // Key light
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 0.9, 0.9),
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.5, 0.5, 0.0)),
    ));
    // Fill light
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.8, 0.8, 1.0),
            illuminance: 5000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, 0.5, -0.5, 0.0)),
    ));
    // Back light
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(0.9, 0.9, 1.0),
            illuminance: 3000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            0.0,
            std::f32::consts::PI,
            0.0,
        )),
    ));
}

fn queue_initial_load(
    mut initial: ResMut<InitialStructure>,
    mut events: EventWriter<LoadStructure>,
) {
    if let Some(text) = initial.0.take() {
        events.send(LoadStructure { text });
    }
}

/// Forward window resizes to the stage bookkeeping. Projection aspect is
/// handled by the engine itself.
fn handle_resize(mut stage: ResMut<Stage>, mut events: EventReader<WindowResized>) {
    for event in events.read() {
        stage.set_viewport(Vec2::new(event.width, event.height));
        debug!("stage viewport resized to {}x{}", event.width, event.height);
    }
}

/// Turn load/reload events into parse tasks. A reload first captures the
/// camera orientation, then clears every component and any pending load
/// before dispatching the new parse: the stage is always full-replace.
fn dispatch_loads(
    mut commands: Commands,
    mut stage: ResMut<Stage>,
    mut loads: EventReader<LoadStructure>,
    mut reloads: EventReader<ReloadStructure>,
    camera: Query<&Transform, With<StageCamera>>,
    pending: Query<Entity, With<PendingLoad>>,
) {
    let pool = AsyncComputeTaskPool::get();

    for event in loads.read() {
        let text = event.text.clone();
        let task = pool.spawn(async move { AtomStore::from_pdb_text(&text) });
        commands.spawn(PendingLoad {
            task,
            mode: LoadMode::Initial,
        });
    }

    // several reloads in one frame collapse to the last; the stage is
    // wholesale-replaced either way
    if let Some(event) = reloads.read().last() {
        let orientation = camera.get_single().ok().map(Orientation::capture);
        for entity in stage.take_components() {
            commands.entity(entity).despawn_recursive();
        }
        for entity in &pending {
            commands.entity(entity).despawn();
        }
        let text = event.text.clone();
        let task = pool.spawn(async move { AtomStore::from_pdb_text(&text) });
        commands.spawn(PendingLoad {
            task,
            mode: LoadMode::Reload {
                toggles: event.toggles,
                ligand_selection: event.ligand_selection.clone(),
                orientation,
            },
        });
    }
}

/// Poll pending parses and run the continuation for any that finished:
/// spawn the component with its representations, refit the camera and, on
/// reload, reapply the captured orientation on top of the fit.
fn finish_loads(
    mut commands: Commands,
    mut stage: ResMut<Stage>,
    settings: Res<StageSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pending: Query<(Entity, &mut PendingLoad)>,
    mut camera: Query<&mut Transform, With<StageCamera>>,
) {
    for (task_entity, mut load) in &mut pending {
        let Some(result) = block_on(future::poll_once(&mut load.task)) else {
            continue;
        };
        let mode = load.mode.clone();
        commands.entity(task_entity).despawn();

        let store = match result {
            Ok(store) => store,
            Err(err) => {
                warn!("structure load failed: {err}");
                continue;
            }
        };

        let root = commands
            .spawn((StructureComponent, Transform::default(), Visibility::default()))
            .id();
        let mut spawned = 0;
        for (category, representation) in representations_for(&mode) {
            let Some(mesh) = representation.build_mesh(&store) else {
                continue;
            };
            let child = commands
                .spawn((
                    Mesh3d(meshes.add(mesh)),
                    MeshMaterial3d(materials.add(representation.material())),
                    RepresentationOf(category),
                ))
                .id();
            commands.entity(root).add_child(child);
            spawned += 1;
        }
        stage.register_component(root);

        let (center, radius) = store.bounding_sphere();
        let center = Vec3::from_array(center);
        stage.set_bounds(center, radius);
        if let Ok(mut transform) = camera.get_single_mut() {
            // fit first to establish scene bounds, then put the saved
            // orientation back on top so the viewpoint survives the reload
            *transform = fit_transform(
                &transform,
                center,
                radius,
                settings.fovy,
                settings.fit_padding,
            );
            if let LoadMode::Reload {
                orientation: Some(orientation),
                ..
            } = &mode
            {
                orientation.restore(&mut transform);
            }
        }
        info!(
            "loaded structure: {} atoms, {} representations",
            store.len(),
            spawned
        );
    }
}

/// The representation set for a load: the fixed initial four, or the toggled
/// categories with the external ligand selection swapped in.
fn representations_for(mode: &LoadMode) -> Vec<(Category, Representation)> {
    match mode {
        LoadMode::Initial => [
            Category::Protein,
            Category::Ligand,
            Category::Ion,
            Category::Water,
        ]
        .into_iter()
        .map(|category| (category, Representation::for_category(category)))
        .collect(),
        LoadMode::Reload {
            toggles,
            ligand_selection,
            ..
        } => Category::iter()
            .filter(|category| toggles.is_active(*category))
            .filter_map(|category| {
                let mut representation = Representation::for_category(category);
                if category == Category::Ligand {
                    match ligand_selection.parse::<SelectionExpr>() {
                        Ok(expr) => representation = representation.with_selection(expr),
                        Err(err) => {
                            warn!("skipping ligand representation, bad selection '{ligand_selection}': {err}");
                            return None;
                        }
                    }
                }
                Some((category, representation))
            })
            .collect(),
    }
}
