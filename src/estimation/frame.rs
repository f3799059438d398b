/**
 * Frame Transform
 *
 * Rotates body-frame vectors into the world frame.
 *
 * Body frame (sensor):   X right, Y forward, Z up
 * World frame (consumer): X right, Y up, Z backward
 */

use super::Vector3;

/// Vehicle attitude in radians, composed as YXZ Euler angles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Body attitude from a rotation-vector report.
    ///
    /// The IMU is mounted with its axes on the vehicle axes, so the reported
    /// yaw/pitch/roll are taken as-is. The sensor-to-world axis swap happens
    /// in [`body_to_world`], not here.
    pub fn from_sensor(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::new(yaw, pitch, roll)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.yaw, self.pitch, self.roll]
    }
}

/// Rotate a body-frame vector into the world frame and remap the axes to
/// the world convention: `(x, y, z) -> (x, z, -y)`.
pub fn body_to_world(body: &Vector3, orientation: &Orientation) -> Vector3 {
    let (sy, cy) = orientation.yaw.sin_cos();
    let (sp, cp) = orientation.pitch.sin_cos();
    let (sr, cr) = orientation.roll.sin_cos();
    let (ax, ay, az) = (body.x, body.y, body.z);

    let wx = ax * (cy * cp) + ay * (cy * sp * sr - sy * cr) + az * (cy * sp * cr + sy * sr);
    let wy = ax * (sy * cp) + ay * (sy * sp * sr + cy * cr) + az * (sy * sp * cr - cy * sr);
    let wz = ax * (-sp) + ay * (cp * sr) + az * (cp * cr);

    Vector3::new(wx, wz, -wy)
}
