//! A two-dimensional sea-ice dynamics kernel
//!
//! Ice thickness, concentration and damage are discontinuous Galerkin (DG) fields on a quadrilateral [Mesh]; the ice
//! velocity is a continuous bilinear (CG1) field on the mesh vertices. Each outer timestep advects the DG tracers with
//! an upwind DG scheme, then iterates the momentum equation with one of three rheologies: free drift, viscous-plastic
//! (mEVP) or Maxwell elasto-brittle (MEB).
//!
//! ```
//! use dg_seaice::{DynamicsConfig, DynamicsKernel, Mesh, ModelArray, TimestepTime};
//!
//! let mesh = Mesh::rectangular(4, 4, 4.0e4, 4.0e4).unwrap();
//! let config = DynamicsConfig {
//!     substeps: 10,
//!     ..Default::default()
//! };
//! let mut kernel = DynamicsKernel::new(mesh, config).unwrap();
//!
//! kernel.set_data("hice", &ModelArray::h(vec![1.0; 16])).unwrap();
//! kernel.set_data("cice", &ModelArray::h(vec![0.9; 16])).unwrap();
//! kernel.update(&TimestepTime { start: 0.0, step: 120.0 });
//!
//! let concentration = kernel.get_dg0_data("cice").unwrap();
//! assert!(concentration.data().iter().all(|a| (0.0..=1.0).contains(a)));
//! ```

/// Parameters of the kernel, optionally read from JSON
pub mod config;
/// Mesh geometry and the DG / CG field containers
pub mod domain;
pub mod error;
/// Gauss-Legendre quadrature on the reference square
pub mod integration;
/// The dynamics kernel and its named-field interface
pub mod kernel;
pub mod momentum;
pub mod rheology;
/// DG advection of tracer fields
pub mod transport;

pub use config::DynamicsConfig;
pub use domain::{CgField, DgDegree, DgField, Mesh, MeshError};
pub use error::{DynamicsError, DynamicsResult};
pub use kernel::{ArrayType, DynamicsKernel, ModelArray, TimestepTime};
pub use rheology::RheologyKind;
pub use transport::TimeStepping;
