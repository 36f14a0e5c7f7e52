//! Pose requests handed to the external pose evaluator

use crate::catalog::AnimationCatalog;
use crate::clip::CurveHandle;
use serde::{Deserialize, Serialize};
use tumble_core::ActionId;

/// What the timeline wants sampled this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PoseRequest {
    /// No action: the model's bind pose
    Rest,
    Steady {
        action: ActionId,
        time: f32,
    },
    Blend {
        src_action: ActionId,
        src_time: f32,
        dst_action: ActionId,
        dst_time: f32,
        /// Destination weight, `blend_frame / blend_frames`
        weight: f32,
    },
}

/// One curve layer of a pose request, resolved to curve handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerPose<'a> {
    Rest,
    Single {
        curves: &'a CurveHandle,
        time: f32,
    },
    Blend {
        src: &'a CurveHandle,
        src_time: f32,
        dst: &'a CurveHandle,
        dst_time: f32,
        weight: f32,
    },
}

impl LayerPose<'_> {
    pub fn is_rest(&self) -> bool {
        matches!(self, LayerPose::Rest)
    }
}

/// A pose request with both curve layers resolved.
///
/// The layers degrade independently: a missing face layer leaves the body
/// evaluated, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalPose<'a> {
    pub body: LayerPose<'a>,
    pub face: LayerPose<'a>,
}

impl EvalPose<'_> {
    pub const REST: EvalPose<'static> = EvalPose {
        body: LayerPose::Rest,
        face: LayerPose::Rest,
    };

    /// Nothing drives the skeleton: the body layer is at rest.
    pub fn is_rest(&self) -> bool {
        self.body.is_rest()
    }
}

impl PoseRequest {
    /// Resolve curve handles for both layers.
    ///
    /// Body curves come from `body_catalog`, which may belong to a different
    /// model than the one driving the timeline (character remaps). Face
    /// curves always come from `face_catalog`, the actor's own model. Within
    /// a layer, any action without curves degrades that layer to `Rest`.
    pub fn resolve<'a>(
        &self,
        body_catalog: &'a AnimationCatalog,
        face_catalog: &'a AnimationCatalog,
    ) -> EvalPose<'a> {
        EvalPose {
            body: self.resolve_layer(move |action| body_catalog.curves(action).map(|c| &c.body)),
            face: self.resolve_layer(move |action| {
                face_catalog.curves(action).and_then(|c| c.face.as_ref())
            }),
        }
    }

    fn resolve_layer<'a>(
        &self,
        curves_for: impl Fn(ActionId) -> Option<&'a CurveHandle>,
    ) -> LayerPose<'a> {
        match *self {
            PoseRequest::Rest => LayerPose::Rest,
            PoseRequest::Steady { action, time } => match curves_for(action) {
                Some(curves) => LayerPose::Single { curves, time },
                None => LayerPose::Rest,
            },
            PoseRequest::Blend {
                src_action,
                src_time,
                dst_action,
                dst_time,
                weight,
            } => match (curves_for(src_action), curves_for(dst_action)) {
                (Some(src), Some(dst)) => LayerPose::Blend {
                    src,
                    src_time,
                    dst,
                    dst_time,
                    weight,
                },
                _ => LayerPose::Rest,
            },
        }
    }

    /// The `(action, time)` the effects system keys triggers on: the
    /// destination of a blend, or the steady action.
    pub fn snapshot_key(&self) -> Option<(ActionId, f32)> {
        match *self {
            PoseRequest::Rest => None,
            PoseRequest::Steady { action, time } => Some((action, time)),
            PoseRequest::Blend {
                dst_action,
                dst_time,
                ..
            } => Some((dst_action, dst_time)),
        }
    }
}

/// A single-joint transform override (head or weapon aiming), applied by
/// the evaluator on top of the sampled pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointOverride {
    pub joint: u8,
    /// Euler rotation in radians
    pub rotation: [f32; 3],
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl JointOverride {
    /// A rotation-only override.
    pub fn rotate(joint: u8, rotation: [f32; 3]) -> Self {
        Self {
            joint,
            rotation,
            translation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

/// Produces joint transforms from resolved curve data. Implemented by the
/// renderer side; the timeline only supplies what to sample.
pub trait PoseEvaluator {
    fn evaluate(&mut self, model: &str, pose: &EvalPose<'_>, overrides: &[JointOverride]);
}
