//! Tetrahedral volume mesh: the primary domain for simulation and
//! mesh-space analysis.

use crate::geometry::Point3;

/// A tetrahedral volume mesh with per-element tissue tags.
///
/// Nodes and elements are stored in parallel arrays; every other array in
/// the workspace that is "aligned with the mesh" (field samples, ROI
/// masks) has the same length and ordering as either [`TetMesh::nodes`] or
/// [`TetMesh::elements`], per the invariant in the specification's data
/// model.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TetMesh {
    /// Node coordinates, in subject space, millimeters.
    pub nodes: Vec<Point3>,
    /// Tetrahedral elements as quadruples of node indices.
    pub elements: Vec<[u32; 4]>,
    /// Tissue tag per element (e.g. scalp, skull, CSF, grey matter, white
    /// matter), an opaque integer whose meaning is defined by the subject
    /// model's segmentation.
    pub tissue_tags: Vec<u16>,
}

/// Tissue tag used by the mock solver and tests for grey matter; real
/// subject models may use a different numbering, in which case the grey
/// matter submesh extraction takes the tag as a parameter.
pub const GREY_MATTER_TAG: u16 = 2;

impl TetMesh {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Barycenter of element `i`.
    pub fn element_barycenter(&self, i: usize) -> Point3 {
        let e = self.elements[i];
        let mut sum = Point3::ORIGIN;
        for idx in e {
            sum = sum.add(&self.nodes[idx as usize]);
        }
        sum.scale(0.25)
    }

    /// Volume of tetrahedral element `i`, in mm^3.
    pub fn element_volume(&self, i: usize) -> f64 {
        let e = self.elements[i];
        let a = self.nodes[e[0] as usize];
        let b = self.nodes[e[1] as usize];
        let c = self.nodes[e[2] as usize];
        let d = self.nodes[e[3] as usize];
        let ab = b.sub(&a);
        let ac = c.sub(&a);
        let ad = d.sub(&a);
        (ab.cross(&ac).dot(&ad) / 6.0).abs()
    }

    /// Per-element volumes for all elements, in mesh order.
    pub fn element_volumes(&self) -> Vec<f64> {
        (0..self.element_count()).map(|i| self.element_volume(i)).collect()
    }

    /// Indices of elements whose tissue tag equals `tag`, in mesh order —
    /// used to build the grey-matter-only submesh for output (spec §4.1).
    pub fn elements_with_tag(&self, tag: u16) -> Vec<usize> {
        self.tissue_tags
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t == tag)
            .map(|(i, _)| i)
            .collect()
    }

    /// Averages per-node values onto each element (mean of its four
    /// corner values) — used when a field is stored nodally but the
    /// analyzer needs per-element values (spec §4.2 step 2).
    pub fn nodal_to_elemental(&self, nodal: &[f64]) -> Vec<f64> {
        self.elements
            .iter()
            .map(|e| e.iter().map(|&n| nodal[n as usize]).sum::<f64>() / 4.0)
            .collect()
    }

    /// Extracts the submesh covering exactly `element_indices`, remapping
    /// node and element indices to a dense `0..n` range. Returns the
    /// submesh and, for each of its nodes, the index of the corresponding
    /// node in `self` — used to restrict a nodal field onto the submesh
    /// (spec §4.1 "grey-matter-only submesh").
    pub fn submesh(&self, element_indices: &[usize]) -> (TetMesh, Vec<usize>) {
        let mut old_to_new = std::collections::HashMap::new();
        let mut new_to_old = Vec::new();
        let mut elements = Vec::with_capacity(element_indices.len());
        let mut tissue_tags = Vec::with_capacity(element_indices.len());

        for &ei in element_indices {
            let mut remapped = [0u32; 4];
            for (k, &old_node) in self.elements[ei].iter().enumerate() {
                let new_idx = *old_to_new.entry(old_node).or_insert_with(|| {
                    new_to_old.push(old_node as usize);
                    (new_to_old.len() - 1) as u32
                });
                remapped[k] = new_idx;
            }
            elements.push(remapped);
            tissue_tags.push(self.tissue_tags[ei]);
        }

        let nodes = new_to_old.iter().map(|&old| self.nodes[old]).collect();
        (TetMesh { nodes, elements, tissue_tags }, new_to_old)
    }
}
