//! Numerical parameters of the dynamics kernel
//!
//! A [DynamicsConfig] can be built in code (starting from [DynamicsConfig::default]) or, with the `json_config`
//! feature, read from a JSON parameter file. Every entry of the file is optional:
//!
//! ```JSON
//! {
//!     "transport": { "scheme": "rk2", "tracer_degree": 3 },
//!     "stress_degree": 3,
//!     "rheology": { "kind": "mevp", "substeps": 100 },
//!     "mevp": { "alpha": 1500.0, "beta": 1500.0 },
//!     "vp": { "pstar": 27500.0, "delta_min": 2e-9, "compaction": 20.0 },
//!     "meb": { "strategy": "sandbox", "damage_timescale": 20.0, "young": 5.9605e8 },
//!     "momentum": { "rho_ice": 900.0, "coriolis": 1.46e-4 },
//!     "min_concentration": 0.1
//! }
//! ```
//!
//! Degrees are given as the number of DG components: 1, 3 or 6 for tracers and 1, 3 or 8 for stresses.

use crate::domain::DgDegree;
use crate::error::{DynamicsError, DynamicsResult};
use crate::rheology::free_drift::FreeDrift;
use crate::rheology::meb::{DamageTimescale, Meb, MebParameters, MebStrategy};
use crate::rheology::mevp::{Mevp, VpParameters};
use crate::rheology::{MomentumParameters, Rheology, RheologyKind};
use crate::transport::TimeStepping;

#[cfg(feature = "json_config")]
use json::JsonValue;
#[cfg(feature = "json_config")]
use std::fs::read_to_string;

/// Concentration threshold of the elasto-brittle sandbox update, at or below which an Elem carries no stress
pub const MEB_MIN_CONCENTRATION: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicsConfig {
    pub scheme: TimeStepping,
    pub tracer_degree: DgDegree,
    pub stress_degree: DgDegree,
    pub rheology: RheologyKind,
    /// Number of momentum iterations per outer timestep
    pub substeps: usize,
    pub mevp_alpha: f64,
    pub mevp_beta: f64,
    pub momentum: MomentumParameters,
    pub vp: VpParameters,
    pub meb: MebParameters,
    pub meb_strategy: MebStrategy,
    pub damage_timescale: DamageTimescale,
    /// Stress-free concentration threshold; `None` keeps the default of the rheology (0 for mEVP, 0.1 for the MEB
    /// sandbox update, the other MEB updates have none)
    pub min_concentration: Option<f64>,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            scheme: TimeStepping::Rk2,
            tracer_degree: DgDegree::Dg1,
            stress_degree: DgDegree::Dg1,
            rheology: RheologyKind::Mevp,
            substeps: 100,
            mevp_alpha: 1500.0,
            mevp_beta: 1500.0,
            momentum: MomentumParameters::default(),
            vp: VpParameters::default(),
            meb: MebParameters::default(),
            meb_strategy: MebStrategy::Sandbox,
            damage_timescale: DamageTimescale::default(),
            min_concentration: None,
        }
    }
}

impl DynamicsConfig {
    /// Check the parameters that cannot be enforced by their types
    pub fn validate(&self) -> DynamicsResult<()> {
        if self.tracer_degree == DgDegree::Dg2Plus {
            return Err(DynamicsError::Config(format!(
                "tracer fields support 1, 3 or 6 DG components, not {}",
                self.tracer_degree.components()
            )));
        }
        if self.stress_degree == DgDegree::Dg2 {
            return Err(DynamicsError::Config(format!(
                "stress fields support 1, 3 or 8 DG components, not {}",
                self.stress_degree.components()
            )));
        }
        if self.substeps == 0 {
            return Err(DynamicsError::Config(
                "at least one momentum substep is required".to_string(),
            ));
        }
        if self.mevp_alpha < 1.0 || self.mevp_beta < 0.0 {
            return Err(DynamicsError::Config(format!(
                "mEVP relaxation factors out of range (alpha: {}, beta: {})",
                self.mevp_alpha, self.mevp_beta
            )));
        }
        if let Some(min_concentration) = self.min_concentration {
            if !(0.0..1.0).contains(&min_concentration) {
                return Err(DynamicsError::Config(format!(
                    "min_concentration must lie in [0, 1), found {}",
                    min_concentration
                )));
            }
        }
        if self.momentum.min_thickness <= 0.0 {
            return Err(DynamicsError::Config(
                "momentum.min_thickness must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// The rheology solver selected by [DynamicsConfig::rheology]
    pub fn build_rheology(&self) -> Box<dyn Rheology> {
        match self.rheology {
            RheologyKind::FreeDrift => Box::new(FreeDrift::new(self.momentum.clone())),
            RheologyKind::Mevp => Box::new(Mevp::new(
                self.momentum.clone(),
                self.vp.clone(),
                self.mevp_alpha,
                self.mevp_beta,
                self.min_concentration.unwrap_or(0.0),
            )),
            RheologyKind::Meb => Box::new(Meb::new(
                self.momentum.clone(),
                self.meb.clone(),
                self.vp.clone(),
                self.meb_strategy,
                self.damage_timescale,
                self.min_concentration.unwrap_or(MEB_MIN_CONCENTRATION),
            )),
        }
    }
}

#[cfg(feature = "json_config")]
impl DynamicsConfig {
    /// Read a JSON parameter file (see the module documentation for its layout)
    pub fn from_file(path: impl AsRef<str>) -> DynamicsResult<Self> {
        let contents = read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Parse a JSON parameter string, using the default value for every missing entry
    pub fn from_json_str(contents: &str) -> DynamicsResult<Self> {
        let root = json::parse(contents)
            .map_err(|err| DynamicsError::Config(format!("cannot parse JSON: {}", err)))?;
        if !root.is_object() {
            return Err(DynamicsError::Config(
                "the top level of the configuration must be an object".to_string(),
            ));
        }

        let mut config = Self::default();

        if let Some(scheme) = read_str(&root, "transport.scheme")? {
            config.scheme = scheme.parse().map_err(DynamicsError::Config)?;
        }
        if let Some(n) = read_usize(&root, "transport.tracer_degree")? {
            config.tracer_degree = parse_degree("transport.tracer_degree", n)?;
        }
        if let Some(n) = read_usize(&root, "stress_degree")? {
            config.stress_degree = parse_degree("stress_degree", n)?;
        }
        if let Some(kind) = read_str(&root, "rheology.kind")? {
            config.rheology = kind.parse().map_err(DynamicsError::Config)?;
        }
        if let Some(substeps) = read_usize(&root, "rheology.substeps")? {
            config.substeps = substeps;
        }

        read_f64(&root, "mevp.alpha", &mut config.mevp_alpha)?;
        read_f64(&root, "mevp.beta", &mut config.mevp_beta)?;

        let vp = &mut config.vp;
        read_f64(&root, "vp.pstar", &mut vp.pstar)?;
        read_f64(&root, "vp.delta_min", &mut vp.delta_min)?;
        read_f64(&root, "vp.compaction", &mut vp.compaction)?;

        let momentum = &mut config.momentum;
        read_f64(&root, "momentum.rho_ice", &mut momentum.rho_ice)?;
        read_f64(&root, "momentum.rho_atm", &mut momentum.rho_atm)?;
        read_f64(&root, "momentum.rho_ocean", &mut momentum.rho_ocean)?;
        read_f64(&root, "momentum.c_atm", &mut momentum.c_atm)?;
        read_f64(&root, "momentum.c_ocean", &mut momentum.c_ocean)?;
        read_f64(&root, "momentum.coriolis", &mut momentum.coriolis)?;
        read_f64(&root, "momentum.min_thickness", &mut momentum.min_thickness)?;

        parse_meb(&root, &mut config)?;

        let min_concentration = lookup(&root, "min_concentration");
        if !min_concentration.is_null() {
            config.min_concentration = Some(
                min_concentration
                    .as_f64()
                    .ok_or_else(|| type_error("min_concentration", "a number"))?,
            );
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "json_config")]
fn parse_meb(root: &JsonValue, config: &mut DynamicsConfig) -> DynamicsResult<()> {
    let canada = match read_str(root, "meb.constants")? {
        None | Some("default") => false,
        Some("canada") => {
            config.meb = MebParameters::canada();
            true
        }
        Some(other) => {
            return Err(DynamicsError::Config(format!(
                "Unknown MEB constant set '{}'; expected 'default' or 'canada'!",
                other
            )))
        }
    };
    if let Some(strategy) = read_str(root, "meb.strategy")? {
        config.meb_strategy = strategy.parse().map_err(DynamicsError::Config)?;
    }

    let timescale = lookup(root, "meb.damage_timescale");
    if let Some(seconds) = timescale.as_f64() {
        config.damage_timescale = DamageTimescale::Fixed(seconds);
    } else if timescale.as_str() == Some("elastic") {
        config.damage_timescale = DamageTimescale::Elastic;
    } else if !timescale.is_null() {
        return Err(type_error(
            "meb.damage_timescale",
            "a number of seconds or \"elastic\"",
        ));
    }

    let meb = &mut config.meb;
    read_f64(root, "meb.young", &mut meb.young)?;
    read_f64(root, "meb.nu0", &mut meb.nu0)?;
    if !canada {
        meb.d_unit_nu0 = meb.nu0;
    }
    read_f64(root, "meb.d_unit_nu0", &mut meb.d_unit_nu0)?;
    read_f64(
        root,
        "meb.undamaged_time_relaxation_sigma",
        &mut meb.undamaged_time_relaxation_sigma,
    )?;
    read_f64(
        root,
        "meb.exponent_relaxation_sigma",
        &mut meb.exponent_relaxation_sigma,
    )?;
    read_f64(root, "meb.compaction_param", &mut meb.compaction_param)?;
    read_f64(root, "meb.c_lab", &mut meb.c_lab)?;
    read_f64(root, "meb.tan_phi", &mut meb.tan_phi)?;
    read_f64(root, "meb.compr_strength", &mut meb.compr_strength)?;
    read_f64(root, "meb.compression_factor", &mut meb.compression_factor)?;
    read_f64(
        root,
        "meb.time_relaxation_damage",
        &mut meb.time_relaxation_damage,
    )?;
    read_f64(root, "meb.rho_ice", &mut meb.rho_ice)?;

    Ok(())
}

/// The entry at a dot-separated `path` (`Null` if any part is missing)
#[cfg(feature = "json_config")]
fn lookup<'a>(root: &'a JsonValue, path: &str) -> &'a JsonValue {
    path.split('.').fold(root, |node, key| &node[key])
}

#[cfg(feature = "json_config")]
fn type_error(path: &str, expected: &str) -> DynamicsError {
    DynamicsError::Config(format!("'{}' must be {}", path, expected))
}

#[cfg(feature = "json_config")]
fn read_f64(root: &JsonValue, path: &str, target: &mut f64) -> DynamicsResult<()> {
    let node = lookup(root, path);
    if !node.is_null() {
        *target = node.as_f64().ok_or_else(|| type_error(path, "a number"))?;
    }
    Ok(())
}

#[cfg(feature = "json_config")]
fn read_usize(root: &JsonValue, path: &str) -> DynamicsResult<Option<usize>> {
    let node = lookup(root, path);
    if node.is_null() {
        Ok(None)
    } else {
        node.as_usize()
            .map(Some)
            .ok_or_else(|| type_error(path, "a non-negative integer"))
    }
}

#[cfg(feature = "json_config")]
fn read_str<'a>(root: &'a JsonValue, path: &str) -> DynamicsResult<Option<&'a str>> {
    let node = lookup(root, path);
    if node.is_null() {
        Ok(None)
    } else {
        node.as_str().map(Some).ok_or_else(|| type_error(path, "a string"))
    }
}

#[cfg(feature = "json_config")]
fn parse_degree(path: &str, components: usize) -> DynamicsResult<DgDegree> {
    DgDegree::from_components(components).ok_or_else(|| {
        DynamicsError::Config(format!(
            "'{}': {} is not a supported number of DG components",
            path, components
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DynamicsConfig::default();
        config.validate().unwrap();
        assert_eq!(config.build_rheology().name(), "mEVP");
    }

    #[test]
    fn invalid_degrees() {
        let config = DynamicsConfig {
            tracer_degree: DgDegree::Dg2Plus,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DynamicsError::Config(_))));

        let config = DynamicsConfig {
            stress_degree: DgDegree::Dg2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DynamicsError::Config(_))));

        let config = DynamicsConfig {
            substeps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rheology_selection() {
        for (kind, name) in [
            (RheologyKind::FreeDrift, "free drift"),
            (RheologyKind::Mevp, "mEVP"),
            (RheologyKind::Meb, "MEB"),
        ] {
            let config = DynamicsConfig {
                rheology: kind,
                ..Default::default()
            };
            assert_eq!(config.build_rheology().name(), name);
        }
    }

    #[cfg(feature = "json_config")]
    #[test]
    fn parse_mevp_file() {
        let config = DynamicsConfig::from_file("./test_input/dynamics_config.json").unwrap();

        assert_eq!(config.scheme, TimeStepping::Rk2);
        assert_eq!(config.tracer_degree, DgDegree::Dg2);
        assert_eq!(config.stress_degree, DgDegree::Dg2Plus);
        assert_eq!(config.rheology, RheologyKind::Mevp);
        assert_eq!(config.substeps, 50);
        assert_eq!(config.mevp_alpha, 300.0);
        assert_eq!(config.mevp_beta, 300.0);
        assert_eq!(config.vp.pstar, 20000.0);
        assert_eq!(config.vp.delta_min, 2.0e-9);
        assert_eq!(config.momentum.coriolis, 1.46e-4);
        assert_eq!(config.momentum.rho_ocean, 1026.0);
        assert_eq!(config.min_concentration, None);
    }

    #[cfg(feature = "json_config")]
    #[test]
    fn parse_meb_file() {
        let config = DynamicsConfig::from_file("./test_input/meb_config.json").unwrap();

        assert_eq!(config.scheme, TimeStepping::Rk1);
        assert_eq!(config.tracer_degree, DgDegree::Dg0);
        assert_eq!(config.rheology, RheologyKind::Meb);
        assert_eq!(config.meb_strategy, MebStrategy::ViscoElastic);
        assert_eq!(config.damage_timescale, DamageTimescale::Elastic);
        assert_eq!(config.meb.young, 1.0e9);
        assert_eq!(config.meb.d_unit_nu0, 1.0 / 3.0);
        assert_eq!(config.meb.tan_phi, 0.6);
        assert_eq!(config.min_concentration, Some(0.05));
    }

    #[cfg(feature = "json_config")]
    #[test]
    fn missing_entries_use_defaults() {
        let config = DynamicsConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DynamicsConfig::default());

        let config = DynamicsConfig::from_json_str(r#"{ "meb": { "damage_timescale": 35.0 } }"#).unwrap();
        assert_eq!(config.damage_timescale, DamageTimescale::Fixed(35.0));

        let config = DynamicsConfig::from_json_str(r#"{ "meb": { "constants": "default" } }"#).unwrap();
        assert_eq!(config.meb, MebParameters::default());

        let config = DynamicsConfig::from_json_str(r#"{ "meb": { "nu0": 0.25 } }"#).unwrap();
        assert_eq!(config.meb.d_unit_nu0, 0.25);
    }

    #[cfg(feature = "json_config")]
    #[test]
    fn malformed_entries() {
        for contents in [
            "not json",
            "[1, 2]",
            r#"{ "transport": { "scheme": "rk4" } }"#,
            r#"{ "transport": { "tracer_degree": 8 } }"#,
            r#"{ "stress_degree": 6 }"#,
            r#"{ "rheology": { "substeps": -3 } }"#,
            r#"{ "mevp": { "alpha": "large" } }"#,
            r#"{ "meb": { "damage_timescale": true } }"#,
            r#"{ "meb": { "constants": "canda" } }"#,
            r#"{ "min_concentration": 1.5 }"#,
        ] {
            assert!(
                matches!(
                    DynamicsConfig::from_json_str(contents),
                    Err(DynamicsError::Config(_))
                ),
                "accepted: {}",
                contents
            );
        }
    }

    #[cfg(feature = "json_config")]
    #[test]
    fn missing_file() {
        assert!(matches!(
            DynamicsConfig::from_file("./test_input/no_such_config.json"),
            Err(DynamicsError::Io(_))
        ));
    }
}
