// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for animation curves.

use serde::{Deserialize, Serialize};

/// Tangent type on one side of a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum TangentType {
    /// Fixed angle and weight set by the animator
    Fixed,
    /// Straight line towards the neighbouring key
    Linear,
    /// Horizontal tangent
    Flat,
    /// Hold the value until the next key
    Step,
    /// Smooth spline through the neighbouring keys
    Spline,
    /// Use the host's global default
    #[default]
    Global,
}

impl TangentType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::Linear => "Linear",
            Self::Flat => "Flat",
            Self::Step => "Step",
            Self::Spline => "Spline",
            Self::Global => "Global",
        }
    }
}

/// Side of a keyframe a tangent belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TangentSide {
    /// Tangent entering the key
    In,
    /// Tangent leaving the key
    Out,
}

/// A keyframe on a curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in the curve's time unit (frames)
    pub time: f64,
    /// Value at this keyframe
    pub value: f64,
    /// In-tangent type
    pub in_tangent_type: TangentType,
    /// Out-tangent type
    pub out_tangent_type: TangentType,
    /// In-tangent angle in radians
    pub in_angle: f64,
    /// Out-tangent angle in radians
    pub out_angle: f64,
    /// In-tangent weight
    pub in_weight: f64,
    /// Out-tangent weight
    pub out_weight: f64,
    /// In and out tangents move together
    pub tangents_locked: bool,
    /// In and out weights move together
    pub weights_locked: bool,
    /// Breakdown marker used by timeline display
    pub special_marker: bool,
}

impl Keyframe {
    /// Create a new keyframe with global tangents
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_tangent_type: TangentType::Global,
            out_tangent_type: TangentType::Global,
            in_angle: 0.0,
            out_angle: 0.0,
            in_weight: 1.0,
            out_weight: 1.0,
            tangents_locked: true,
            weights_locked: true,
            special_marker: false,
        }
    }

    /// Set the tangent types
    pub fn with_tangent_types(mut self, in_type: TangentType, out_type: TangentType) -> Self {
        self.in_tangent_type = in_type;
        self.out_tangent_type = out_type;
        self
    }

    /// Set the tangent angles (radians)
    pub fn with_angles(mut self, in_angle: f64, out_angle: f64) -> Self {
        self.in_angle = in_angle;
        self.out_angle = out_angle;
        self
    }

    /// Set the tangent weights
    pub fn with_weights(mut self, in_weight: f64, out_weight: f64) -> Self {
        self.in_weight = in_weight;
        self.out_weight = out_weight;
        self
    }

    /// Set the tangent and weight locks
    pub fn with_locks(mut self, tangents_locked: bool, weights_locked: bool) -> Self {
        self.tangents_locked = tangents_locked;
        self.weights_locked = weights_locked;
        self
    }

    /// Set the breakdown marker
    pub fn with_special_marker(mut self, special: bool) -> Self {
        self.special_marker = special;
        self
    }

    /// Set the tangent type on both sides
    pub fn set_tangent_types(&mut self, tangent_type: TangentType) {
        self.in_tangent_type = tangent_type;
        self.out_tangent_type = tangent_type;
    }

    /// Set a tangent angle.
    ///
    /// Locked tangents mirror the angle to the other side.
    pub fn set_angle(&mut self, side: TangentSide, angle: f64) {
        if self.tangents_locked {
            self.in_angle = angle;
            self.out_angle = angle;
            return;
        }
        match side {
            TangentSide::In => self.in_angle = angle,
            TangentSide::Out => self.out_angle = angle,
        }
    }

    /// Set a tangent weight.
    ///
    /// Locked weights mirror the weight to the other side.
    pub fn set_weight(&mut self, side: TangentSide, weight: f64) {
        if self.weights_locked {
            self.in_weight = weight;
            self.out_weight = weight;
            return;
        }
        match side {
            TangentSide::In => self.in_weight = weight,
            TangentSide::Out => self.out_weight = weight,
        }
    }

    /// Run `edit` with both locks cleared, restoring them afterwards
    pub fn with_unlocked<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        let tangents_locked = std::mem::replace(&mut self.tangents_locked, false);
        let weights_locked = std::mem::replace(&mut self.weights_locked, false);
        let result = edit(self);
        self.tangents_locked = tangents_locked;
        self.weights_locked = weights_locked;
        result
    }

    /// Replace the breakdown marker, returning the previous value
    pub fn replace_special_marker(&mut self, special: bool) -> bool {
        std::mem::replace(&mut self.special_marker, special)
    }
}
