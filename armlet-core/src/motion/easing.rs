//! Easing profiles
//!
//! Each profile maps linear progress in [0, 1] onto eased progress in
//! [0, 1] with f(0) = 0 and f(1) = 1.

use serde::{Deserialize, Serialize};

/// Progress shaping applied across a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Easing {
    /// Smoothstep, zero velocity at both ends
    #[default]
    CubicInOut = 0,
    /// Constant velocity
    Linear = 1,
    /// Quadratic acceleration then deceleration
    QuadInOut = 2,
    /// Quadratic acceleration only
    EaseIn = 3,
    /// Quadratic deceleration only
    EaseOut = 4,
}

impl Easing {
    /// Eased progress for linear progress `t`
    ///
    /// `t` is clamped to [0, 1] first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::CubicInOut => t * t * (3.0 - 2.0 * t),
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let r = 1.0 - t;
                    1.0 - 2.0 * r * r
                }
            }
            Easing::EaseIn => t * t,
            Easing::EaseOut => {
                let r = 1.0 - t;
                1.0 - r * r
            }
        }
    }

    /// Wire code of the profile
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Profile from its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Easing::CubicInOut),
            1 => Some(Easing::Linear),
            2 => Some(Easing::QuadInOut),
            3 => Some(Easing::EaseIn),
            4 => Some(Easing::EaseOut),
            _ => None,
        }
    }

    pub const ALL: [Easing; 5] = [
        Easing::CubicInOut,
        Easing::Linear,
        Easing::QuadInOut,
        Easing::EaseIn,
        Easing::EaseOut,
    ];
}
