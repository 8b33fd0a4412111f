//! The `ForwardSolver` typed capability interface (spec §6.1, §9 "typed
//! capability interface" re-architecture point): the one boundary a real
//! FE backend would implement. [`MockAnalyticalSolver`] is the only
//! implementation shipped here, grounded on the spec's instruction to use
//! "a closed-form dipole-like field approximation" — the analytic field of
//! a point current source in an infinite homogeneous conductor,
//! `E = I / (4*pi*sigma*r^2) * r_hat`, summed over every electrode in the
//! channel. Because this is linear in each placement's current, it
//! satisfies the superposition invariant (spec §8 invariant 3) exactly,
//! not just approximately.

use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ti_core::electrode::{ElectrodePlacement, ElectrodeSpec};
use ti_core::error::{Result, TiError};
use ti_core::geometry::Point3;
use ti_core::mesh::TetMesh;
use ti_core::simulation::VectorField;
use ti_core::config::ConductivityProfile;
use ti_core::field::{Domain, FieldSample};

/// Minimum source-to-node distance used to avoid a singular field right at
/// an electrode's projected position.
const MIN_DISTANCE_MM: f64 = 1.0;

/// A single-channel forward-solve request: the set of electrode placements
/// carrying current, their scalp positions, the mesh to solve on, and the
/// electrode/tissue properties the solver needs.
pub struct SolveRequest<'a> {
    pub mesh: &'a TetMesh,
    pub placements: &'a [ElectrodePlacement],
    pub electrode_positions: &'a HashMap<String, Point3>,
    pub electrode_spec: &'a ElectrodeSpec,
    pub conductivity_profile: ConductivityProfile,
}

/// The vector E-field a solve produces, nodal on the request's mesh.
#[derive(Debug)]
pub struct SolveOutput {
    pub field: VectorField,
}

/// The delegation boundary for the underlying neuro-FEM library (spec §6,
/// non-goal: "the core does not implement the finite-element solver").
/// A real backend implements this trait; nothing else in this crate knows
/// or cares which implementation it is talking to.
pub trait ForwardSolver: Send + Sync {
    /// Runs one channel's forward solve, failing with `SolverFailure` if
    /// the underlying computation errors or exceeds `timeout`.
    fn solve(&self, request: &SolveRequest, timeout: Option<Duration>) -> Result<SolveOutput>;
}

/// Calls `f` on a worker thread, enforcing `timeout` via a channel rather
/// than async cancellation (spec §5: solver calls are modeled as opaque
/// blocking calls). `f` is not observably cancelled on timeout — its
/// thread keeps running to completion and its result is simply dropped —
/// matching "not during a solver call, which is treated as atomic".
pub fn call_with_timeout<T, F>(timeout: Option<Duration>, fingerprint: impl Into<String>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match timeout {
        None => f(),
        Some(duration) => {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let _ = tx.send(f());
            });
            match rx.recv_timeout(duration) {
                Ok(result) => result,
                Err(_) => Err(TiError::SolverFailure {
                    fingerprint: fingerprint.into(),
                    reason: format!("solver call exceeded timeout of {duration:?}"),
                }),
            }
        }
    }
}

/// Analytic point-current-source solver used for every test and as the
/// default in the absence of a real FE backend (spec §6.1).
#[derive(Debug, Default, Clone, Copy)]
pub struct MockAnalyticalSolver;

impl MockAnalyticalSolver {
    pub fn new() -> Self {
        MockAnalyticalSolver
    }

    fn point_source_contribution(source: Point3, target: Point3, current_ma: f64, conductivity: f64) -> Point3 {
        let r_vec = target.sub(&source);
        let r = r_vec.norm().max(MIN_DISTANCE_MM);
        let direction = r_vec.scale(1.0 / r);
        let magnitude = current_ma / (4.0 * std::f64::consts::PI * conductivity * r * r);
        direction.scale(magnitude)
    }
}

impl ForwardSolver for MockAnalyticalSolver {
    fn solve(&self, request: &SolveRequest, timeout: Option<Duration>) -> Result<SolveOutput> {
        let mesh = request.mesh;
        let placements = request.placements;
        let positions = request.electrode_positions;
        let conductivity = request.electrode_spec.conductivity;

        let mut sources = Vec::with_capacity(placements.len());
        for p in placements {
            let pos = positions
                .get(&p.label)
                .copied()
                .ok_or_else(|| TiError::InvalidMontage { reason: format!("electrode '{}' has no known position", p.label) })?;
            sources.push((pos, p.current_ma));
        }

        // Cloning the nodes (rather than borrowing `mesh`) lets the closure
        // be `'static` so `call_with_timeout` can run it on a detached
        // thread and return on schedule even if the solve never finishes.
        let nodes = mesh.nodes.clone();

        call_with_timeout(timeout, "mock-analytical-solve", move || {
            let mut x = Vec::with_capacity(nodes.len());
            let mut y = Vec::with_capacity(nodes.len());
            let mut z = Vec::with_capacity(nodes.len());
            for node in &nodes {
                let mut total = Point3::ORIGIN;
                for &(pos, current_ma) in &sources {
                    total = total.add(&Self::point_source_contribution(pos, *node, current_ma, conductivity));
                }
                x.push(total.x);
                y.push(total.y);
                z.push(total.z);
            }
            let domain = Domain::Mesh { len: nodes.len() };
            Ok(SolveOutput {
                field: VectorField {
                    x: FieldSample::new_nodal(domain, x)?,
                    y: FieldSample::new_nodal(domain, y)?,
                    z: FieldSample::new_nodal(domain, z)?,
                },
            })
        })
    }
}
