use std::ops::Add;

/// Virtual control axes, ordered heave, sway, surge, yaw, pitch, roll
/// in [`Wrench::to_array`] and the mixing matrices
pub const AXIS_COUNT: usize = 6;

/// Normalised 6-DoF effort request, each axis in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wrench {
    pub heave: f64,
    pub sway: f64,
    pub surge: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Wrench {
    pub fn from_array(axes: [f64; AXIS_COUNT]) -> Self {
        Self {
            heave: axes[0],
            sway: axes[1],
            surge: axes[2],
            yaw: axes[3],
            pitch: axes[4],
            roll: axes[5],
        }
    }

    pub fn to_array(&self) -> [f64; AXIS_COUNT] {
        [self.heave, self.sway, self.surge, self.yaw, self.pitch, self.roll]
    }

    /// Saturate every axis to [-1, 1]; non-finite axes become 0
    pub fn clamped(&self) -> Self {
        let mut axes = self.to_array();
        for axis in axes.iter_mut() {
            *axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        }
        Self::from_array(axes)
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|&a| a == 0.0)
    }
}

impl Add for Wrench {
    type Output = Wrench;

    fn add(self, rhs: Wrench) -> Wrench {
        let a = self.to_array();
        let b = rhs.to_array();
        let mut sum = [0.0; AXIS_COUNT];
        for i in 0..AXIS_COUNT {
            sum[i] = a[i] + b[i];
        }
        Wrench::from_array(sum)
    }
}
