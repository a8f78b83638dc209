//! Representations.
//!
//! Builders that marshal a selected subset of an [`AtomStore`] into one Bevy
//! mesh per representation.
//!

use crate::colors::ColorScheme;
use bevy::math::Vec4;
use bevy::prelude::{
    default, AlphaMode, Color, Cylinder, Mesh, MeshBuilder, Meshable, Quat, Sphere,
    StandardMaterial, Transform, Vec3,
};
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bon::Builder;
use molstage_core::{AtomStore, Category, Selection, SelectionExpr};

/// Enum representing the available rendering styles.
///
/// Each of these maps the selected atoms to a different mesh shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepresentationKind {
    Cartoon,
    Licorice,
    Spacefill,
    BallAndStick,
    Line,
}

/// Style parameters shared by all representation kinds. Kinds ignore the
/// parameters that do not apply to them.
#[derive(Builder, Clone, Debug)]
pub struct RepresentationStyle {
    /// Mesh opacity; anything below 1.0 renders alpha-blended.
    #[builder(default = 1.0)]
    pub opacity: f32,
    /// Width-to-thickness ratio of the cartoon cross-section.
    #[builder(default = 1.5)]
    pub aspect_ratio: f32,
    /// Base radius for tubes, sticks and licorice spheres, in Angstrom.
    #[builder(default = 0.2)]
    pub radius: f32,
}

impl Default for RepresentationStyle {
    fn default() -> Self {
        RepresentationStyle::builder().build()
    }
}

/// A visual style scoped to a selection, with its colors and parameters.
#[derive(Clone)]
pub struct Representation {
    pub kind: RepresentationKind,
    pub selection: SelectionExpr,
    pub color_scheme: ColorScheme,
    pub style: RepresentationStyle,
}

impl Representation {
    /// The fixed default representation of a category:
    /// protein cartoon, ligand licorice, water licorice, lipid ball+stick,
    /// ion spacefill.
    pub fn for_category(category: Category) -> Representation {
        match category {
            Category::Protein => Representation {
                kind: RepresentationKind::Cartoon,
                selection: SelectionExpr::Category(Category::Protein),
                color_scheme: ColorScheme::protein_green(),
                style: RepresentationStyle::builder()
                    .aspect_ratio(8.0)
                    .radius(0.3)
                    .build(),
            },
            Category::Ligand => Representation {
                kind: RepresentationKind::Licorice,
                selection: without_hydrogen(Category::Ligand),
                color_scheme: ColorScheme::ByElement,
                style: RepresentationStyle::builder().opacity(0.8).build(),
            },
            Category::Water => Representation {
                kind: RepresentationKind::Licorice,
                selection: without_hydrogen(Category::Water),
                color_scheme: ColorScheme::ByElement,
                style: RepresentationStyle::builder().opacity(0.5).build(),
            },
            Category::Lipid => Representation {
                kind: RepresentationKind::BallAndStick,
                selection: without_hydrogen(Category::Lipid),
                color_scheme: ColorScheme::ByElement,
                style: RepresentationStyle::builder().radius(0.15).build(),
            },
            Category::Ion => Representation {
                kind: RepresentationKind::Spacefill,
                selection: SelectionExpr::Category(Category::Ion),
                color_scheme: ColorScheme::ByElement,
                style: RepresentationStyle::default(),
            },
        }
    }

    /// Replace the selection, keeping kind, colors and style. Used for the
    /// externally supplied ligand expression on reload.
    pub fn with_selection(mut self, selection: SelectionExpr) -> Self {
        self.selection = selection;
        self
    }

    /// Build the mesh for this representation, or `None` when the selection
    /// matches nothing renderable in the store.
    pub fn build_mesh(&self, store: &AtomStore) -> Option<Mesh> {
        let selection = self.selection.eval(store);
        if selection.is_empty() {
            return None;
        }
        let colors = atom_colors_srgba(&self.color_scheme, store);
        match self.kind {
            RepresentationKind::Cartoon => self.cartoon_mesh(store, &selection, &colors),
            RepresentationKind::Licorice => {
                self.stick_mesh(store, &selection, &colors, self.style.radius, self.style.radius)
            }
            RepresentationKind::BallAndStick => self.stick_mesh(
                store,
                &selection,
                &colors,
                self.style.radius * 2.0,
                self.style.radius * 0.6,
            ),
            RepresentationKind::Spacefill => self.spacefill_mesh(store, &selection, &colors),
            RepresentationKind::Line => self.line_mesh(store, &selection, &colors),
        }
    }

    /// Material shared by the whole representation. Per-atom color rides on
    /// the mesh vertices; the material only carries opacity.
    pub fn material(&self) -> StandardMaterial {
        StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, self.style.opacity),
            perceptual_roughness: 0.9,
            alpha_mode: if self.style.opacity < 1.0 {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        }
    }

    // Spheres at every selected atom plus cylinders for bonds with both
    // endpoints selected.
    fn stick_mesh(
        &self,
        store: &AtomStore,
        selection: &Selection,
        colors: &[Vec4],
        sphere_radius: f32,
        bond_radius: f32,
    ) -> Option<Mesh> {
        let mut combined = selection
            .iter()
            .map(|index| {
                sphere_mesh(
                    Vec3::from_array(store.coords()[index]),
                    sphere_radius,
                    colors[index],
                )
            })
            .reduce(|mut acc, mesh| {
                acc.merge(&mesh);
                acc
            })?;

        for bond in store.bonds() {
            let (a, b) = bond.atom_indices();
            if !selection.contains(a) || !selection.contains(b) {
                continue;
            }
            let blend = (colors[a] + colors[b]) / 2.0;
            if let Some(cylinder) = bond_mesh(
                Vec3::from_array(store.coords()[a]),
                Vec3::from_array(store.coords()[b]),
                bond_radius,
                blend,
            ) {
                combined.merge(&cylinder);
            }
        }
        Some(combined)
    }

    // Van-der-Waals spheres.
    fn spacefill_mesh(
        &self,
        store: &AtomStore,
        selection: &Selection,
        colors: &[Vec4],
    ) -> Option<Mesh> {
        selection
            .iter()
            .map(|index| {
                let radius = store.elements()[index]
                    .atomic_radius()
                    .van_der_waals
                    .map_or(1.5, |r| r as f32);
                sphere_mesh(Vec3::from_array(store.coords()[index]), radius, colors[index])
            })
            .reduce(|mut acc, mesh| {
                acc.merge(&mesh);
                acc
            })
    }

    // Bond segments with line-list topology. The engine draws these as
    // one-pixel lines regardless of distance.
    fn line_mesh(&self, store: &AtomStore, selection: &Selection, colors: &[Vec4]) -> Option<Mesh> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut vertex_colors: Vec<Vec4> = Vec::new();
        for bond in store.bonds() {
            let (a, b) = bond.atom_indices();
            if !selection.contains(a) || !selection.contains(b) {
                continue;
            }
            positions.push(store.coords()[a]);
            positions.push(store.coords()[b]);
            vertex_colors.push(colors[a]);
            vertex_colors.push(colors[b]);
        }
        if positions.is_empty() {
            return None;
        }
        let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
        let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::all());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vertex_colors);
        Some(mesh)
    }

    // Smooth tube through the selected CA trace, one segment per contiguous
    // stretch of selected protein residues. Lone residues degrade to a
    // sphere so a single-residue selection stays visible.
    fn cartoon_mesh(
        &self,
        store: &AtomStore,
        selection: &Selection,
        colors: &[Vec4],
    ) -> Option<Mesh> {
        let segments = trace_segments(store, selection, colors);
        let mut meshes = Vec::new();
        for segment in &segments {
            if segment.len() == 1 {
                meshes.push(sphere_mesh(segment[0].0, self.style.radius, segment[0].1));
                continue;
            }
            let curve = smooth_curve(segment, 6);
            meshes.push(tube_mesh(
                &curve,
                self.style.radius * self.style.aspect_ratio,
                self.style.radius,
                12,
            ));
        }
        meshes.into_iter().reduce(|mut acc, mesh| {
            acc.merge(&mesh);
            acc
        })
    }
}

fn without_hydrogen(category: Category) -> SelectionExpr {
    SelectionExpr::And(
        Box::new(SelectionExpr::Category(category)),
        Box::new(SelectionExpr::Not(Box::new(SelectionExpr::Hydrogen))),
    )
}

fn atom_colors_srgba(scheme: &ColorScheme, store: &AtomStore) -> Vec<Vec4> {
    scheme
        .atom_colors(store)
        .iter()
        .map(|color| {
            let c = color.to_srgba();
            Vec4::new(c.red, c.green, c.blue, c.alpha)
        })
        .collect()
}

fn sphere_mesh(center: Vec3, radius: f32, color: Vec4) -> Mesh {
    let mut mesh = Sphere::new(radius).mesh().build();
    let vertex_count = mesh.count_vertices();
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vec![color; vertex_count]);
    let mut mesh = mesh.translated_by(center);
    mesh.compute_smooth_normals();
    mesh
}

fn bond_mesh(pos1: Vec3, pos2: Vec3, radius: f32, color: Vec4) -> Option<Mesh> {
    let direction = pos2 - pos1;
    let height = direction.length();
    if height < 1e-4 {
        return None;
    }
    let center = (pos1 + pos2) / 2.0;
    let rotation = Quat::from_rotation_arc(Vec3::Y, direction / height);
    let mut mesh = Cylinder {
        radius,
        half_height: height / 2.0,
    }
    .mesh()
    .build();
    mesh = mesh.transformed_by(Transform {
        translation: center,
        rotation,
        ..default()
    });
    let vertex_count = mesh.count_vertices();
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vec![color; vertex_count]);
    Some(mesh)
}

// Contiguous stretches of selected protein CA atoms, broken at chain
// boundaries and at residues without a selected CA.
fn trace_segments(
    store: &AtomStore,
    selection: &Selection,
    colors: &[Vec4],
) -> Vec<Vec<(Vec3, Vec4)>> {
    let mut segments: Vec<Vec<(Vec3, Vec4)>> = Vec::new();
    let mut current: Vec<(Vec3, Vec4)> = Vec::new();
    let mut current_chain: Option<String> = None;

    for residue in store.residues() {
        let ca = if residue.category == Category::Protein {
            (residue.start..residue.end)
                .find(|&i| store.atom_names()[i] == "CA" && selection.contains(i))
        } else {
            None
        };
        match ca {
            Some(index) => {
                if current_chain.as_deref() != Some(residue.chain_id.as_str())
                    && !current.is_empty()
                {
                    segments.push(std::mem::take(&mut current));
                }
                current_chain = Some(residue.chain_id.clone());
                current.push((Vec3::from_array(store.coords()[index]), colors[index]));
            }
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                current_chain = None;
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn smooth_curve(points: &[(Vec3, Vec4)], steps: usize) -> Vec<(Vec3, Vec4)> {
    let mut curve = Vec::new();
    for i in 0..points.len() - 1 {
        let p0 = if i == 0 { points[0].0 } else { points[i - 1].0 };
        let p1 = points[i].0;
        let p2 = points[i + 1].0;
        let p3 = if i + 2 >= points.len() {
            points[points.len() - 1].0
        } else {
            points[i + 2].0
        };
        for step in 0..steps {
            let t = step as f32 / steps as f32;
            let color = if t < 0.5 { points[i].1 } else { points[i + 1].1 };
            curve.push((catmull_rom(p0, p1, p2, p3, t), color));
        }
    }
    if let Some(last) = points.last() {
        curve.push(*last);
    }
    curve
}

/// Catmull-Rom spline interpolation
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;

    (2.0 * p1 - 2.0 * p2 + v0 + v1) * t3
        + (-3.0 * p1 + 3.0 * p2 - 2.0 * v0 - v1) * t2
        + v0 * t
        + p1
}

// Elliptical tube around the curve. `rx`/`ry` are the cross-section radii;
// equal radii give a round tube, a wide `rx` a flattened ribbon.
fn tube_mesh(curve: &[(Vec3, Vec4)], rx: f32, ry: f32, ring_segments: usize) -> Mesh {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut vertex_colors = Vec::new();
    let mut indices = Vec::new();

    for (i, &(center, color)) in curve.iter().enumerate() {
        let forward = if i < curve.len() - 1 {
            (curve[i + 1].0 - center).normalize_or_zero()
        } else {
            (center - curve[i - 1].0).normalize_or_zero()
        };
        let right = if forward.abs_diff_eq(Vec3::Y, 0.01) || forward == Vec3::ZERO {
            Vec3::X
        } else {
            forward.cross(Vec3::Y).normalize()
        };
        let up = forward.cross(right).normalize_or_zero();
        for j in 0..ring_segments {
            let angle = (j as f32 / ring_segments as f32) * std::f32::consts::TAU;
            let (x, y) = (angle.cos(), angle.sin());
            let pos = center + right * (x * rx) + up * (y * ry);
            // true ellipse normal, not the radial direction
            let normal = (right * (x / rx) + up * (y / ry)).normalize_or_zero();
            positions.push([pos.x, pos.y, pos.z]);
            normals.push([normal.x, normal.y, normal.z]);
            uvs.push([
                i as f32 / (curve.len() - 1) as f32,
                j as f32 / ring_segments as f32,
            ]);
            vertex_colors.push(color);
        }
    }

    for i in 0..curve.len() - 1 {
        for j in 0..ring_segments {
            let next_j = (j + 1) % ring_segments;
            let current_ring = i * ring_segments;
            let next_ring = (i + 1) * ring_segments;
            indices.push((current_ring + j) as u32);
            indices.push((next_ring + j) as u32);
            indices.push((current_ring + next_j) as u32);
            indices.push((current_ring + next_j) as u32);
            indices.push((next_ring + j) as u32);
            indices.push((next_ring + next_j) as u32);
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::all());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vertex_colors);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use molstage_test_data::TestFile;

    fn fixture() -> AtomStore {
        AtomStore::from_pdb_text(TestFile::complex_01().text()).unwrap()
    }

    #[test]
    fn test_category_defaults() {
        let protein = Representation::for_category(Category::Protein);
        assert_eq!(protein.kind, RepresentationKind::Cartoon);
        assert_eq!(protein.style.aspect_ratio, 8.0);

        let ligand = Representation::for_category(Category::Ligand);
        assert_eq!(ligand.kind, RepresentationKind::Licorice);
        assert_eq!(ligand.style.opacity, 0.8);

        let water = Representation::for_category(Category::Water);
        assert_eq!(water.style.opacity, 0.5);

        assert_eq!(
            Representation::for_category(Category::Lipid).kind,
            RepresentationKind::BallAndStick
        );
        assert_eq!(
            Representation::for_category(Category::Ion).kind,
            RepresentationKind::Spacefill
        );
    }

    #[test]
    fn test_ligand_licorice_mesh() {
        let store = fixture();
        let mesh = Representation::for_category(Category::Ligand)
            .build_mesh(&store)
            .unwrap();
        assert!(mesh.count_vertices() > 0);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }

    #[test]
    fn test_water_licorice_without_bonds() {
        // bare water oxygens produce spheres only, still a valid mesh
        let store = fixture();
        let mesh = Representation::for_category(Category::Water)
            .build_mesh(&store)
            .unwrap();
        assert!(mesh.count_vertices() > 0);
    }

    #[test]
    fn test_ion_spacefill_single_sphere() {
        let store = fixture();
        let mesh = Representation::for_category(Category::Ion)
            .build_mesh(&store)
            .unwrap();
        let radius = 2.27;
        let reference = Sphere::new(radius).mesh().build();
        assert_eq!(mesh.count_vertices(), reference.count_vertices());
    }

    #[test]
    fn test_protein_cartoon_mesh() {
        let store = fixture();
        let mesh = Representation::for_category(Category::Protein)
            .build_mesh(&store)
            .unwrap();
        assert!(mesh.count_vertices() > 0);
        assert!(mesh.indices().is_some());
    }

    #[test]
    fn test_empty_selection_yields_no_mesh() {
        let store = fixture();
        let rep = Representation::for_category(Category::Ligand)
            .with_selection("resname ZZZ".parse().unwrap());
        assert!(rep.build_mesh(&store).is_none());
    }

    #[test]
    fn test_line_mesh_pairs() {
        let store = fixture();
        let rep = Representation {
            kind: RepresentationKind::Line,
            selection: SelectionExpr::Category(Category::Ligand),
            color_scheme: ColorScheme::ByElement,
            style: RepresentationStyle::default(),
        };
        let mesh = rep.build_mesh(&store).unwrap();
        // seven ligand bonds, two vertices each
        assert_eq!(mesh.count_vertices(), 14);
    }

    #[test]
    fn test_opacity_material() {
        let water = Representation::for_category(Category::Water);
        assert_eq!(water.material().alpha_mode, AlphaMode::Blend);
        let ion = Representation::for_category(Category::Ion);
        assert_eq!(ion.material().alpha_mode, AlphaMode::Opaque);
    }
}
