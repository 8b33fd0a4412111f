//! Builds a full [`Leadfield`] from a [`ForwardSolver`]: one channel solve
//! per electrode against a fixed reference electrode (spec §4.3 "Leadfield
//! construction"). Nothing in `ti-cache` or `ti-simulate` does this —
//! `ti-cache` only ever reads or writes an already-built tensor, and
//! `ti-simulate::run` solves a single two-electrode montage, not every
//! electrode in a net.

use std::collections::HashMap;
use std::time::Duration;

use ti_cache::Leadfield;
use ti_core::config::ConductivityProfile;
use ti_core::electrode::{ElectrodePlacement, ElectrodeSpec};
use ti_core::error::{Result, TiError};
use ti_core::field::{Domain, FieldSample};
use ti_core::geometry::Point3;
use ti_core::mesh::TetMesh;
use ti_core::net::ElectrodeNet;
use ti_core::simulation::VectorField;
use ti_simulate::solver::{ForwardSolver, SolveRequest};

fn zero_field(domain: Domain) -> Result<VectorField> {
    let len = domain.len();
    Ok(VectorField {
        x: FieldSample::new_nodal(domain, vec![0.0; len])?,
        y: FieldSample::new_nodal(domain, vec![0.0; len])?,
        z: FieldSample::new_nodal(domain, vec![0.0; len])?,
    })
}

/// Solves one row per electrode in `net`, each against `reference`
/// carrying the opposite current, and assembles them into a
/// [`Leadfield`] in the net's stable electrode order. The reference
/// electrode's own row is the zero field by construction, skipping the
/// solver entirely rather than solving a degenerate self-referencing
/// channel.
pub fn build_leadfield(
    mesh: &TetMesh,
    net: &ElectrodeNet,
    electrode_spec: &ElectrodeSpec,
    conductivity_profile: ConductivityProfile,
    solver: &dyn ForwardSolver,
    reference: &str,
    timeout: Option<Duration>,
) -> Result<Leadfield> {
    if net.index_of(reference).is_none() {
        return Err(TiError::UnknownRegion { atlas: "electrode net".to_string(), region: reference.to_string() });
    }

    let positions: HashMap<String, Point3> = net.electrodes.iter().cloned().collect();
    let domain = Domain::Mesh { len: mesh.node_count() };

    let mut rows = Vec::with_capacity(net.electrodes.len());
    for label in net.labels() {
        if label == reference {
            rows.push(zero_field(domain)?);
            continue;
        }
        let placements =
            [ElectrodePlacement { label: label.clone(), current_ma: 1.0 }, ElectrodePlacement { label: reference.to_string(), current_ma: -1.0 }];
        let request = SolveRequest {
            mesh,
            placements: &placements,
            electrode_positions: &positions,
            electrode_spec,
            conductivity_profile: conductivity_profile.clone(),
        };
        let output = solver.solve(&request, timeout)?;
        rows.push(output.field);
    }

    Ok(Leadfield { electrode_labels: net.labels(), rows, domain })
}
