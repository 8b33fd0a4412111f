//! Node-level ROI resolution for flex-search evaluation, mirroring
//! ex-search's own node-granular resolver (spec §4.5 step 3: "restrict to
//! ROI") — not reused directly since `ti-flexsearch` and `ti-exsearch` are
//! sibling crates with no dependency between them (spec §1.1 dependency
//! order puts both one level above `ti-analyze`, neither above the
//! other).

use std::collections::{BTreeSet, HashMap};

use ti_core::atlas::Atlas;
use ti_core::error::Result;
use ti_core::geometry::{Affine, CoordinateSpace};
use ti_core::mesh::TetMesh;
use ti_core::roi::Roi;

use ti_coords::convert::to_space;
use ti_coords::resolve::resolve_mesh;

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

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::geometry::Point3;
    use ti_core::mesh::GREY_MATTER_TAG;

    fn mesh() -> TetMesh {
        TetMesh {
            nodes: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 0.0, 1.0)],
            elements: vec![[0, 1, 2, 3]],
            tissue_tags: vec![GREY_MATTER_TAG],
        }
    }

    #[test]
    fn sphere_selects_nearby_nodes_only() {
        let m = mesh();
        let roi = Roi::Sphere { center: Point3::ORIGIN, radius_mm: 1.5, space: CoordinateSpace::Subject };
        let nodes = roi_node_indices(&roi, &m, &Affine::IDENTITY, &HashMap::new()).unwrap();
        assert_eq!(nodes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_sphere_selection_is_not_an_error() {
        let m = mesh();
        let roi = Roi::Sphere { center: Point3::new(1000.0, 1000.0, 1000.0), radius_mm: 1.0, space: CoordinateSpace::Subject };
        let nodes = roi_node_indices(&roi, &m, &Affine::IDENTITY, &HashMap::new()).unwrap();
        assert!(nodes.is_empty());
    }
}
