//! The dynamics kernel: owns the ice state and advances it by one outer timestep at a time
//!
//! Each call to [DynamicsKernel::update] runs the phases
//! 1. forcing: snapshot of the velocity at the start of the step
//! 2. advection: transport of concentration, thickness, damage and the advected named fields, then clamping of the
//!    physical bounds
//! 3. momentum: `substeps` iterations of strain rate, stress (and damage) update, velocity update and zeroing of the
//!    boundary velocity
//!
//! Data is exchanged with the rest of the model by name through [ModelArray]s.

/// Named-array exchange format
pub mod model_array;
/// Wall-clock timing of the kernel phases
pub mod profiler;

pub use model_array::{ArrayType, ModelArray};
pub use profiler::Profiler;

use crate::config::DynamicsConfig;
use crate::domain::{cg_to_dg, dg_to_cg, CgField, DgDegree, DgField, Mesh, V2D};
use crate::error::{DynamicsError, DynamicsResult};
use crate::momentum::{
    delta_field, lumped_mass, shear_field, strain_rate_into, stress_divergence_into, TensorField,
};
use crate::rheology::{Rheology, StressInput, VertexState};
use crate::transport::limiter::{limit_max, limit_min};
use crate::transport::DgTransport;
use model_array::{dg2ma, dg_from_array, field_type, ma2dg};

use log::{debug, info, warn};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Time of an outer timestep (s)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimestepTime {
    /// Model time at the start of the step
    pub start: f64,
    /// Length of the step
    pub step: f64,
}

/// A field set by name outside of the dedicated ice state
#[derive(Clone, Debug)]
struct NamedField {
    array_type: ArrayType,
    field: DgField,
}

pub struct DynamicsKernel {
    config: DynamicsConfig,
    mesh: Arc<Mesh>,
    transport: DgTransport,
    rheology: Box<dyn Rheology>,

    thickness: DgField,
    concentration: DgField,
    damage: DgField,
    stress: TensorField,
    strain: TensorField,

    vx: CgField,
    vy: CgField,
    initial_vx: CgField,
    initial_vy: CgField,
    wind_x: CgField,
    wind_y: CgField,
    ocean_x: CgField,
    ocean_y: CgField,

    mass: CgField,
    force_x: CgField,
    force_y: CgField,

    fields: BTreeMap<String, NamedField>,
    registered: BTreeMap<String, ArrayType>,
    profiler: Profiler,
}

impl DynamicsKernel {
    /// Build a kernel with ice-free, motionless state on `mesh`
    pub fn new(mesh: Mesh, config: DynamicsConfig) -> DynamicsResult<Self> {
        config.validate()?;

        let mesh = Arc::new(mesh);
        let rheology = config.build_rheology();
        let transport = DgTransport::new(mesh.clone(), config.tracer_degree, config.scheme);

        info!(
            "dynamics kernel: {} Elems, {} rheology with {} substeps, {} transport of {} / stress {}",
            mesh.element_count(),
            rheology.name(),
            config.substeps,
            config.scheme,
            config.tracer_degree,
            config.stress_degree
        );

        let tracer = DgField::by_mesh(&mesh, config.tracer_degree);
        let vertex = CgField::by_mesh(&mesh);

        Ok(Self {
            transport,
            rheology,
            thickness: tracer.clone(),
            concentration: tracer.clone(),
            damage: tracer,
            stress: TensorField::by_mesh(&mesh, config.stress_degree),
            strain: TensorField::by_mesh(&mesh, config.stress_degree),
            vx: vertex.clone(),
            vy: vertex.clone(),
            initial_vx: vertex.clone(),
            initial_vy: vertex.clone(),
            wind_x: vertex.clone(),
            wind_y: vertex.clone(),
            ocean_x: vertex.clone(),
            ocean_y: vertex.clone(),
            force_x: vertex.clone(),
            force_y: vertex,
            mass: lumped_mass(&mesh),
            fields: BTreeMap::new(),
            registered: BTreeMap::new(),
            profiler: Profiler::new(),
            mesh,
            config,
        })
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn rheology(&self) -> &dyn Rheology {
        self.rheology.as_ref()
    }

    pub fn thickness(&self) -> &DgField {
        &self.thickness
    }

    pub fn concentration(&self) -> &DgField {
        &self.concentration
    }

    pub fn damage(&self) -> &DgField {
        &self.damage
    }

    pub fn stress(&self) -> &TensorField {
        &self.stress
    }

    /// The ice velocity `(vx, vy)` on the vertices
    pub fn velocity(&self) -> (&CgField, &CgField) {
        (&self.vx, &self.vy)
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Declare the layout of a named field that is not known to the kernel
    ///
    /// `Dg` fields are advected with the ice, `H` and `DgStress` fields are only stored. Re-registering a field that
    /// already holds data converts the data to the new layout.
    pub fn register_field(&mut self, name: &str, array_type: ArrayType) -> DynamicsResult<()> {
        if array_type == ArrayType::Vertex {
            return Err(DynamicsError::ArrayType {
                name: name.to_string(),
                expected: ArrayType::Dg,
                found: ArrayType::Vertex,
            });
        }

        let degree = self.named_degree(array_type);
        if let Some(named) = self.fields.get_mut(name) {
            named.field = named.field.with_degree(degree);
            named.array_type = array_type;
        }

        self.registered.insert(name.to_string(), array_type);
        Ok(())
    }

    /// Copy the array `data` into the field `name`
    ///
    /// The ice state (`hice`, `cice`, `damage`) and the stress (`s11`, `s12`, `s22`) accept `H` arrays (element means)
    /// or DG arrays of the matching degree. The velocity and forcing fields (`u`, `v`, `uwind`, `vwind`, `uocean`,
    /// `vocean`) accept vertex arrays, or element arrays which are interpolated onto the vertices.
    pub fn set_data(&mut self, name: &str, data: &ModelArray) -> DynamicsResult<()> {
        match name {
            "hice" => ma2dg(name, data, &mut self.thickness)?,
            "cice" => ma2dg(name, data, &mut self.concentration)?,
            "damage" => ma2dg(name, data, &mut self.damage)?,
            "s11" => ma2dg(name, data, &mut self.stress.xx)?,
            "s12" => ma2dg(name, data, &mut self.stress.xy)?,
            "s22" => ma2dg(name, data, &mut self.stress.yy)?,
            "u" => self.vx = self.vertex_field(name, data)?,
            "v" => self.vy = self.vertex_field(name, data)?,
            "uwind" => self.wind_x = self.vertex_field(name, data)?,
            "vwind" => self.wind_y = self.vertex_field(name, data)?,
            "uocean" => self.ocean_x = self.vertex_field(name, data)?,
            "vocean" => self.ocean_y = self.vertex_field(name, data)?,
            _ => {
                let array_type = self.named_type(name)?;
                if let Some(named) = self.fields.get_mut(name) {
                    ma2dg(name, data, &mut named.field)?;
                } else {
                    let field = dg_from_array(
                        name,
                        data,
                        self.named_degree(array_type),
                        self.mesh.element_count(),
                    )?;
                    self.fields
                        .insert(name.to_string(), NamedField { array_type, field });
                }
            }
        }

        debug!("set_data: '{}' ({} {} values)", name, data.data().len(), data.array_type());
        Ok(())
    }

    /// The element means of the field `name`
    pub fn get_dg0_data(&self, name: &str) -> DynamicsResult<ModelArray> {
        let (field, _) = self.dg_field(name)?;
        Ok(dg2ma(&field, ArrayType::H))
    }

    /// All DG coefficients of the field `name`
    ///
    /// Velocity and forcing fields are projected onto the tracer DG space. The strain-rate diagnostics `delta` and
    /// `shear` (of the last momentum substep) only have element means and are returned as `H` arrays.
    pub fn get_dg_data(&self, name: &str) -> DynamicsResult<ModelArray> {
        let (field, array_type) = self.dg_field(name)?;
        Ok(dg2ma(&field, array_type))
    }

    /// Advance the ice state by one outer timestep
    pub fn update(&mut self, time: &TimestepTime) {
        debug!(
            "dynamics update at t = {} s (dt = {} s)",
            time.start, time.step
        );

        self.profiler.start("forcing");
        self.vx.dirichlet_zero(&self.mesh);
        self.vy.dirichlet_zero(&self.mesh);
        self.initial_vx.clone_from(&self.vx);
        self.initial_vy.clone_from(&self.vy);
        self.profiler.stop("forcing");

        self.profiler.start("advection");
        self.advect(time.step);
        self.profiler.stop("advection");

        self.profiler.start("momentum");
        self.momentum(time.step);
        self.profiler.stop("momentum");
    }

    fn advect(&mut self, dt: f64) {
        self.transport.prepare_advection(&self.vx, &self.vy);

        let max_dt = self.transport.max_stable_timestep();
        if dt > max_dt {
            warn!(
                "advection timestep of {} s exceeds the CFL limit of {:.3} s",
                dt, max_dt
            );
        }

        self.transport.step(dt, &mut self.concentration);
        self.transport.step(dt, &mut self.thickness);
        self.transport.step(dt, &mut self.damage);
        for named in self
            .fields
            .values_mut()
            .filter(|named| named.array_type == ArrayType::Dg)
        {
            self.transport.step(dt, &mut named.field);
        }

        let limited = limit_max(&mut self.concentration, 1.0)
            + limit_min(&mut self.concentration, 0.0)
            + limit_min(&mut self.thickness, 0.0)
            + limit_max(&mut self.damage, 1.0)
            + limit_min(&mut self.damage, 0.0);
        if limited > 0 {
            debug!("advection: {} Elem bounds enforced", limited);
        }
    }

    fn momentum(&mut self, dt: f64) {
        let mut thickness = dg_to_cg(&self.mesh, &self.thickness);
        thickness.clamp(self.config.momentum.min_thickness, f64::INFINITY);
        let mut concentration = dg_to_cg(&self.mesh, &self.concentration);
        concentration.clamp(0.0, 1.0);

        self.rheology.prepare_iteration(dt);
        let dt_momentum = self.rheology.momentum_dt(dt, self.config.substeps);
        let uses_stress = self.rheology.uses_stress();
        if !uses_stress {
            self.force_x.fill(0.0);
            self.force_y.fill(0.0);
        }

        for _ in 0..self.config.substeps {
            self.profiler.start("momentum - strain");
            strain_rate_into(&self.mesh, &self.vx, &self.vy, &mut self.strain);
            self.profiler.stop("momentum - strain");

            self.profiler.start("momentum - stress");
            let input = StressInput {
                mesh: &self.mesh,
                strain: &self.strain,
                thickness: &self.thickness,
                concentration: &self.concentration,
            };
            self.rheology
                .compute_stress(&input, &mut self.stress, &mut self.damage, dt_momentum);
            if uses_stress {
                stress_divergence_into(
                    &self.mesh,
                    &self.stress,
                    &self.mass,
                    &mut self.force_x,
                    &mut self.force_y,
                );
            }
            self.profiler.stop("momentum - stress");

            self.profiler.start("momentum - velocity");
            self.update_velocity(&thickness, &concentration, dt_momentum);
            self.profiler.stop("momentum - velocity");
        }
    }

    fn update_velocity(&mut self, thickness: &CgField, concentration: &CgField, dt: f64) {
        let rheology = self.rheology.as_ref();
        let (vx, vy) = (&self.vx, &self.vy);
        let (initial_vx, initial_vy) = (&self.initial_vx, &self.initial_vy);
        let (wind_x, wind_y) = (&self.wind_x, &self.wind_y);
        let (ocean_x, ocean_y) = (&self.ocean_x, &self.ocean_y);
        let (force_x, force_y) = (&self.force_x, &self.force_y);

        let increments: Vec<V2D> = (0..self.mesh.vertex_count())
            .into_par_iter()
            .map(|i| {
                let state = VertexState {
                    thickness: thickness[i],
                    concentration: concentration[i],
                    velocity: V2D::from([vx[i], vy[i]]),
                    initial_velocity: V2D::from([initial_vx[i], initial_vy[i]]),
                    wind: V2D::from([wind_x[i], wind_y[i]]),
                    ocean: V2D::from([ocean_x[i], ocean_y[i]]),
                    stress_force: V2D::from([force_x[i], force_y[i]]),
                };
                rheology.velocity_increment(&state, dt)
            })
            .collect();

        for (i, increment) in increments.iter().enumerate() {
            self.vx[i] += increment.x();
            self.vy[i] += increment.y();
        }

        self.vx.dirichlet_zero(&self.mesh);
        self.vy.dirichlet_zero(&self.mesh);
    }

    /// Layout of a field outside of the dedicated state: registered, or known by name
    fn named_type(&self, name: &str) -> DynamicsResult<ArrayType> {
        let array_type = self
            .registered
            .get(name)
            .copied()
            .or_else(|| field_type(name))
            .ok_or_else(|| DynamicsError::UnregisteredField(name.to_string()))?;

        if array_type == ArrayType::Vertex {
            Err(DynamicsError::ArrayType {
                name: name.to_string(),
                expected: ArrayType::Dg,
                found: ArrayType::Vertex,
            })
        } else {
            Ok(array_type)
        }
    }

    fn named_degree(&self, array_type: ArrayType) -> DgDegree {
        match array_type {
            ArrayType::DgStress => self.config.stress_degree,
            _ => self.config.tracer_degree,
        }
    }

    /// A vertex field from a vertex array, or interpolated from an element array
    fn vertex_field(&self, name: &str, data: &ModelArray) -> DynamicsResult<CgField> {
        match data.array_type() {
            ArrayType::Vertex => {
                if data.len() != self.mesh.vertex_count() {
                    return Err(DynamicsError::ArrayLength {
                        name: name.to_string(),
                        expected: self.mesh.vertex_count(),
                        found: data.len(),
                    });
                }
                Ok(CgField::from_data(data.data().to_vec()))
            }
            ArrayType::H | ArrayType::Dg => {
                let dg = dg_from_array(
                    name,
                    data,
                    self.config.tracer_degree,
                    self.mesh.element_count(),
                )?;
                Ok(dg_to_cg(&self.mesh, &dg))
            }
            ArrayType::DgStress => Err(DynamicsError::ArrayType {
                name: name.to_string(),
                expected: ArrayType::Vertex,
                found: ArrayType::DgStress,
            }),
        }
    }

    /// The DG representation of a field and the array type of its full read-back
    fn dg_field(&self, name: &str) -> DynamicsResult<(Cow<DgField>, ArrayType)> {
        let vertex_field = |cg: &CgField| -> DynamicsResult<(Cow<DgField>, ArrayType)> {
            Ok((
                Cow::Owned(cg_to_dg(&self.mesh, cg, self.config.tracer_degree)),
                ArrayType::Dg,
            ))
        };

        match name {
            "hice" => Ok((Cow::Borrowed(&self.thickness), ArrayType::Dg)),
            "cice" => Ok((Cow::Borrowed(&self.concentration), ArrayType::Dg)),
            "damage" => Ok((Cow::Borrowed(&self.damage), ArrayType::Dg)),
            "s11" => Ok((Cow::Borrowed(&self.stress.xx), ArrayType::DgStress)),
            "s12" => Ok((Cow::Borrowed(&self.stress.xy), ArrayType::DgStress)),
            "s22" => Ok((Cow::Borrowed(&self.stress.yy), ArrayType::DgStress)),
            "u" => vertex_field(&self.vx),
            "v" => vertex_field(&self.vy),
            "uwind" => vertex_field(&self.wind_x),
            "vwind" => vertex_field(&self.wind_y),
            "uocean" => vertex_field(&self.ocean_x),
            "vocean" => vertex_field(&self.ocean_y),
            "delta" => Ok((
                Cow::Owned(delta_field(&self.strain, self.config.vp.delta_min)),
                ArrayType::H,
            )),
            "shear" => Ok((Cow::Owned(shear_field(&self.strain)), ArrayType::H)),
            _ => {
                let array_type = self.named_type(name)?;
                let named = self
                    .fields
                    .get(name)
                    .ok_or_else(|| DynamicsError::MissingData(name.to_string()))?;
                Ok((Cow::Borrowed(&named.field), array_type))
            }
        }
    }
}
