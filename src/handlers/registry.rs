use std::collections::BTreeMap;

use crate::{
    curve::{factory::CurveFactory, model::Curve},
    fixture::pose::PoseResolver,
    foundation::{
        core::NormPose,
        diagnostics::Diagnostics,
        error::{ChoreoError, ChoreoResult},
    },
    handlers::{
        dimmer::builtin_dimmers,
        geometry::{FanGeometry, RolePoseGeometry},
        movement::{DefaultMovementHandler, MovementLibrary},
    },
};

/// Categorical energy level requested by the planner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intensity {
    Slow,
    #[default]
    Smooth,
    Fast,
    Dramatic,
    Intense,
}

impl Intensity {
    pub const ALL: [Intensity; 5] = [
        Self::Slow,
        Self::Smooth,
        Self::Fast,
        Self::Dramatic,
        Self::Intense,
    ];

    /// Multiplier on cycle rate for handlers without per-level tables.
    pub fn rate(self) -> f64 {
        match self {
            Self::Slow => 0.5,
            Self::Smooth | Self::Dramatic => 1.0,
            Self::Fast => 2.0,
            Self::Intense => 4.0,
        }
    }
}

/// Read-only inputs a geometry handler may consult.
#[derive(Clone, Copy, Debug)]
pub struct GeometryCalibration<'a> {
    pub poses: &'a PoseResolver,
    /// Position of the fixture within its group.
    pub fixture_index: usize,
    pub fixture_count: usize,
}

/// Places a fixture's base pose in normalized `[0, 1]²`.
pub trait GeometryHandler: Send + Sync {
    fn handler_id(&self) -> &str;

    fn resolve(
        &self,
        fixture_id: &str,
        role: Option<&str>,
        params: &serde_json::Value,
        calibration: &GeometryCalibration<'_>,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<NormPose>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovementParams {
    pub pattern_id: String,
    /// Explicit amplitude; overrides the categorical default when set.
    pub amplitude_degrees: Option<f64>,
    /// Base pose from geometry; available to handlers that shape motion around it.
    pub base_pose: NormPose,
    pub extra: serde_json::Value,
}

/// Offset-centred pan/tilt curves: `0.5` is no deviation from the base pose.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementCurves {
    pub pan: Curve,
    pub tilt: Curve,
}

pub trait MovementHandler: Send + Sync {
    fn handler_id(&self) -> &str;

    /// Pattern ids this handler answers for when used as the fallback.
    fn pattern_ids(&self) -> Vec<String> {
        vec![self.handler_id().to_string()]
    }

    fn generate(
        &self,
        params: &MovementParams,
        n_samples: usize,
        cycles: f64,
        intensity: Intensity,
        diags: &mut Diagnostics,
    ) -> ChoreoResult<MovementCurves>;
}

/// Absolute brightness curves in `[min_norm, max_norm]`.
pub trait DimmerHandler: Send + Sync {
    fn handler_id(&self) -> &str;

    #[allow(clippy::too_many_arguments)]
    fn generate(
        &self,
        params: &serde_json::Value,
        n_samples: usize,
        cycles: f64,
        intensity: Intensity,
        min_norm: f64,
        max_norm: f64,
    ) -> ChoreoResult<Curve>;
}

/// Handlers keyed by id. Built once and shared read-only across compile workers.
#[derive(Default)]
pub struct HandlerRegistry {
    geometry: BTreeMap<String, Box<dyn GeometryHandler>>,
    movement: BTreeMap<String, Box<dyn MovementHandler>>,
    movement_fallback: Option<Box<dyn MovementHandler>>,
    dimmer: BTreeMap<String, Box<dyn DimmerHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("geometry", &self.geometry.keys().collect::<Vec<_>>())
            .field("movement", &self.movement.keys().collect::<Vec<_>>())
            .field(
                "movement_fallback",
                &self.movement_fallback.as_ref().map(|h| h.handler_id()),
            )
            .field("dimmer", &self.dimmer.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in handler, generating curves through `factory`.
    pub fn with_builtins(factory: &CurveFactory) -> ChoreoResult<Self> {
        let mut reg = Self::new();
        reg.register_geometry(Box::new(RolePoseGeometry))?;
        reg.register_geometry(Box::new(FanGeometry))?;
        reg.set_movement_fallback(Box::new(DefaultMovementHandler::new(
            MovementLibrary::builtin()?,
            factory.clone(),
        )));
        for d in builtin_dimmers(factory) {
            reg.register_dimmer(d)?;
        }
        Ok(reg)
    }

    pub fn register_geometry(&mut self, handler: Box<dyn GeometryHandler>) -> ChoreoResult<()> {
        insert_unique(&mut self.geometry, "geometry", handler.handler_id().to_string(), handler)
    }

    pub fn register_movement(&mut self, handler: Box<dyn MovementHandler>) -> ChoreoResult<()> {
        insert_unique(&mut self.movement, "movement", handler.handler_id().to_string(), handler)
    }

    pub fn register_dimmer(&mut self, handler: Box<dyn DimmerHandler>) -> ChoreoResult<()> {
        insert_unique(&mut self.dimmer, "dimmer", handler.handler_id().to_string(), handler)
    }

    /// Handler consulted for movement ids with no dedicated registration.
    pub fn set_movement_fallback(&mut self, handler: Box<dyn MovementHandler>) {
        self.movement_fallback = Some(handler);
    }

    pub fn geometry(&self, id: &str) -> ChoreoResult<&dyn GeometryHandler> {
        self.geometry
            .get(id)
            .map(|h| h.as_ref())
            .ok_or_else(|| ChoreoError::unknown("geometry", id, self.geometry.keys().cloned()))
    }

    pub fn movement(&self, id: &str) -> ChoreoResult<&dyn MovementHandler> {
        if let Some(h) = self.movement.get(id) {
            return Ok(h.as_ref());
        }
        if let Some(fallback) = &self.movement_fallback
            && fallback.pattern_ids().iter().any(|p| p == id)
        {
            return Ok(fallback.as_ref());
        }
        Err(ChoreoError::unknown("movement", id, self.movement_ids()))
    }

    pub fn dimmer(&self, id: &str) -> ChoreoResult<&dyn DimmerHandler> {
        self.dimmer
            .get(id)
            .map(|h| h.as_ref())
            .ok_or_else(|| ChoreoError::unknown("dimmer", id, self.dimmer.keys().cloned()))
    }

    pub fn movement_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.movement.keys().cloned().collect();
        if let Some(fallback) = &self.movement_fallback {
            ids.extend(fallback.pattern_ids());
        }
        ids.sort();
        ids.dedup();
        ids
    }
}

fn insert_unique<T: ?Sized>(
    map: &mut BTreeMap<String, Box<T>>,
    kind: &str,
    id: String,
    handler: Box<T>,
) -> ChoreoResult<()> {
    if map.contains_key(&id) {
        return Err(ChoreoError::validation(format!(
            "{kind} handler '{id}' is already registered"
        )));
    }
    map.insert(id, handler);
    Ok(())
}

/// Decode handler params; `null` means "all defaults".
pub(crate) fn parse_params<T>(handler_id: &str, params: &serde_json::Value) -> ChoreoResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    if !params.is_object() {
        return Err(ChoreoError::invalid_argument(format!(
            "{handler_id} params must be an object"
        )));
    }
    serde_json::from_value(params.clone())
        .map_err(|e| ChoreoError::invalid_argument(format!("{handler_id} params: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/registry.rs"]
mod tests;
