//! Node-level ROI resolution for ex-search (spec §4.4 step 3: "Extract the
//! ROI (mesh nodes inside the ROI)"). This is deliberately node-granular,
//! unlike `ti-analyze`'s element-granular mesh ROI (§4.2 analyzes
//! per-element, volume-weighted statistics) — ex-search's leadfield and
//! TI envelope are both nodal quantities, so selecting at node
//! granularity avoids an unnecessary nodal-to-elemental averaging step on
//! every one of the (potentially very many) candidates evaluated.

use std::collections::{BTreeSet, HashMap};

use ti_core::atlas::Atlas;
use ti_core::error::Result;
use ti_core::geometry::{Affine, CoordinateSpace};
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;

use ti_coords::convert::to_space;
use ti_coords::resolve::resolve_mesh;

/// Node indices selected by `roi`. For a sphere, nodes within `radius_mm`
/// of the (space-converted) center. For an atlas, the union of nodes
/// belonging to any element the atlas assigns to the region — atlases in
/// this workspace carry per-element labels, not per-node ones.
pub fn roi_node_indices(roi: &Roi, mesh: &TetMesh, subject_to_mni: &Affine, atlases: &HashMap<String, Atlas>) -> Result<Vec<usize>> {
    match roi {
        Roi::Sphere { center, radius_mm, space } => {
            let center_subject = to_space(*center, *space, CoordinateSpace::Subject, subject_to_mni)?;
            Ok((0..mesh.node_count()).filter(|&i| mesh.nodes[i].distance(&center_subject) <= *radius_mm).collect())
        }
        Roi::Atlas { .. } => {
            let mask = resolve_mesh(roi, mesh, subject_to_mni, atlases)?;
            let mut nodes = BTreeSet::new();
            for &element_idx in &mask.indices {
                for &node in &mesh.elements[element_idx] {
                    nodes.insert(node as usize);
                }
            }
            Ok(nodes.into_iter().collect())
        }
    }
}
