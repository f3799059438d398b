//payload layouts, all little-endian

pub const ROTATION_VECTOR_SIZE: usize = 12;  //3 * f32
pub const LINEAR_ACCEL_SIZE: usize = 20;     //3 * f32 + u64
pub const MOTOR_POWER_SIZE: usize = 6;       //u8 + u8 + f32
pub const SENSOR_CMD_SIZE: usize = 6;        //u8 + u8 + u32

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationVectorMsg{
    pub yaw: f32,         //radians
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearAccelMsg{
    pub x: f32,           //m/s², gravity removed by the IMU
    pub y: f32,
    pub z: f32,
    pub timestamp_us: u64, //sensor clock
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorPowerCmd{
    pub channel: u8,
    pub invert: u8,
    pub power: f32,       //-1.0 .. 1.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorCmd{
    pub sensor: u8,       //report id
    pub enable: u8,
    pub interval_ms: u32,
}

fn f32_at(data: &[u8], offset: usize) -> f32{
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[offset..offset + 4]);
    f32::from_le_bytes(b)
}

fn u32_at(data: &[u8], offset: usize) -> u32{
    let mut b = [0u8; 4];
    b.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(b)
}

fn u64_at(data: &[u8], offset: usize) -> u64{
    let mut b = [0u8; 8];
    b.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(b)
}

impl RotationVectorMsg{
    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < ROTATION_VECTOR_SIZE{
            return None;
        }
        Some(RotationVectorMsg{
            yaw: f32_at(data, 0),
            pitch: f32_at(data, 4),
            roll: f32_at(data, 8),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(ROTATION_VECTOR_SIZE);
        bytes.extend_from_slice(&self.yaw.to_le_bytes());
        bytes.extend_from_slice(&self.pitch.to_le_bytes());
        bytes.extend_from_slice(&self.roll.to_le_bytes());
        bytes
    }
}

impl LinearAccelMsg{
    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < LINEAR_ACCEL_SIZE{
            return None;
        }
        Some(LinearAccelMsg{
            x: f32_at(data, 0),
            y: f32_at(data, 4),
            z: f32_at(data, 8),
            timestamp_us: u64_at(data, 12),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(LINEAR_ACCEL_SIZE);
        bytes.extend_from_slice(&self.x.to_le_bytes());
        bytes.extend_from_slice(&self.y.to_le_bytes());
        bytes.extend_from_slice(&self.z.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp_us.to_le_bytes());
        bytes
    }
}

impl MotorPowerCmd{
    pub fn new(channel: u8, invert: bool, power: f64) -> Self{
        MotorPowerCmd{ channel, invert: invert as u8, power: power as f32 }
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < MOTOR_POWER_SIZE{
            return None;
        }
        Some(MotorPowerCmd{ channel: data[0], invert: data[1], power: f32_at(data, 2) })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(MOTOR_POWER_SIZE);
        bytes.push(self.channel);
        bytes.push(self.invert);
        bytes.extend_from_slice(&self.power.to_le_bytes());
        bytes
    }
}

impl SensorCmd{
    pub fn from_bytes(data: &[u8]) -> Option<Self>{
        if data.len() < SENSOR_CMD_SIZE{
            return None;
        }
        Some(SensorCmd{ sensor: data[0], enable: data[1], interval_ms: u32_at(data, 2) })
    }

    pub fn to_bytes(&self) -> Vec<u8>{
        let mut bytes = Vec::with_capacity(SENSOR_CMD_SIZE);
        bytes.push(self.sensor);
        bytes.push(self.enable);
        bytes.extend_from_slice(&self.interval_ms.to_le_bytes());
        bytes
    }
}
