use std::ffi::{c_char, CStr};
use std::ptr;
use nalgebra::DMatrix;
use crate::control::{ActuatorMixer, MixingProfile, RemoteCommandDebouncer, Wrench};
use crate::control::wrench::AXIS_COUNT;
use crate::fusion::{SensorEvent, SensorFusionPipeline, TelemetryEvent};

pub struct DroneFusion{
    inner: SensorFusionPipeline,
}

pub struct DroneMixer{
    inner: ActuatorMixer,
}

pub struct DroneDebouncer{
    inner: RemoteCommandDebouncer,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DroneVec3{
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DroneWrench{
    pub heave: f64,
    pub sway: f64,
    pub surge: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct DroneKinematics{
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub acceleration: DroneVec3,
    pub velocity: DroneVec3,
    pub position: DroneVec3,
    pub last_update_ms: u64,
    pub has_update: bool,
}

impl From<DroneWrench> for Wrench{
    fn from(w: DroneWrench) -> Self{
        Wrench{ heave: w.heave, sway: w.sway, surge: w.surge, yaw: w.yaw, pitch: w.pitch, roll: w.roll }
    }
}

impl From<Wrench> for DroneWrench{
    fn from(w: Wrench) -> Self{
        DroneWrench{ heave: w.heave, sway: w.sway, surge: w.surge, yaw: w.yaw, pitch: w.pitch, roll: w.roll }
    }
}

fn vec3(v: &crate::estimation::Vector3) -> DroneVec3{
    DroneVec3{ x: v.x, y: v.y, z: v.z }
}

//fusion

#[no_mangle]
pub extern "C" fn drone_fusion_new() -> *mut DroneFusion{
    Box::into_raw(Box::new(DroneFusion{ inner: SensorFusionPipeline::new() }))
}

#[no_mangle]
pub unsafe extern "C" fn drone_fusion_free(fusion: *mut DroneFusion){
    if !fusion.is_null(){
        unsafe{ drop(Box::from_raw(fusion)); }
    }
}

//returns number of telemetry events produced, -1 on null handle
unsafe fn fusion_handle(fusion: *mut DroneFusion, event: SensorEvent) -> i32{
    if fusion.is_null(){
        return -1;
    }
    unsafe{
        let f = &mut *fusion;
        let mut emitted: Vec<TelemetryEvent> = Vec::new();
        f.inner.handle(&event, &mut emitted);
        emitted.len() as i32
    }
}

#[no_mangle]
pub unsafe extern "C" fn drone_fusion_rotation_vector(
    fusion: *mut DroneFusion,
    yaw: f64,
    pitch: f64,
    roll: f64,
) -> i32{
    unsafe{ fusion_handle(fusion, SensorEvent::RotationVector{ yaw, pitch, roll }) }
}

#[no_mangle]
pub unsafe extern "C" fn drone_fusion_linear_acceleration(
    fusion: *mut DroneFusion,
    x: f64,
    y: f64,
    z: f64,
    timestamp_us: u64,
) -> i32{
    unsafe{ fusion_handle(fusion, SensorEvent::LinearAcceleration{ x, y, z, timestamp_us }) }
}

#[no_mangle]
pub unsafe extern "C" fn drone_fusion_state(fusion: *const DroneFusion, out: *mut DroneKinematics) -> i32{
    if fusion.is_null() || out.is_null(){
        return -1;
    }
    unsafe{
        let state = (*fusion).inner.state();
        *out = DroneKinematics{
            yaw: state.orientation.yaw,
            pitch: state.orientation.pitch,
            roll: state.orientation.roll,
            acceleration: vec3(&state.acceleration_world),
            velocity: vec3(&state.velocity_world),
            position: vec3(&state.position_world),
            last_update_ms: state.last_update.unwrap_or(0),
            has_update: state.last_update.is_some(),
        };
    }
    1
}

#[no_mangle]
pub unsafe extern "C" fn drone_fusion_reset(fusion: *mut DroneFusion){
    if !fusion.is_null(){
        unsafe{ (*fusion).inner.reset(); }
    }
}

//mixer

#[no_mangle]
pub extern "C" fn drone_mixer_new_reference() -> *mut DroneMixer{
    let allocation = match MixingProfile::reference_five_motor(){
        MixingProfile::Calibration(matrix) => matrix.transpose(),
        MixingProfile::PseudoInverse => return ptr::null_mut(),
    };
    match ActuatorMixer::from_allocation(allocation){
        Ok(inner) => Box::into_raw(Box::new(DroneMixer{ inner })),
        Err(_) => ptr::null_mut(),
    }
}

//coefficients: row-major, motor_count rows of 6 axes
#[no_mangle]
pub unsafe extern "C" fn drone_mixer_from_allocation(
    coefficients: *const f64,
    motor_count: usize,
) -> *mut DroneMixer{
    if coefficients.is_null() || motor_count == 0{
        return ptr::null_mut();
    }
    unsafe{
        let len = match motor_count.checked_mul(AXIS_COUNT){
            Some(len) => len,
            None => return ptr::null_mut(),
        };
        let slice = std::slice::from_raw_parts(coefficients, len);
        let allocation = DMatrix::from_row_slice(motor_count, AXIS_COUNT, slice);
        match ActuatorMixer::from_allocation(allocation){
            Ok(inner) => Box::into_raw(Box::new(DroneMixer{ inner })),
            Err(_) => ptr::null_mut(),
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn drone_mixer_free(mixer: *mut DroneMixer){
    if !mixer.is_null(){
        unsafe{ drop(Box::from_raw(mixer)); }
    }
}

#[no_mangle]
pub unsafe extern "C" fn drone_mixer_motor_count(mixer: *const DroneMixer) -> usize{
    if mixer.is_null(){
        return 0;
    }
    unsafe{ (*mixer).inner.motor_count() }
}

//writes one unclamped power per motor; returns motor count, -1 on null, -2 if out is too small
#[no_mangle]
pub unsafe extern "C" fn drone_mixer_apply(
    mixer: *const DroneMixer,
    wrench: *const DroneWrench,
    out_powers: *mut f64,
    max_len: usize,
) -> i32{
    if mixer.is_null() || wrench.is_null() || out_powers.is_null(){
        return -1;
    }
    unsafe{
        let m = &*mixer;
        let powers = m.inner.apply(&Wrench::from(*wrench));
        if powers.len() > max_len{
            return -2;
        }
        ptr::copy_nonoverlapping(powers.as_ptr(), out_powers, powers.len());
        powers.len() as i32
    }
}

//debouncer

#[no_mangle]
pub extern "C" fn drone_debouncer_new(timeout_ms: u64) -> *mut DroneDebouncer{
    Box::into_raw(Box::new(DroneDebouncer{ inner: RemoteCommandDebouncer::new(timeout_ms) }))
}

#[no_mangle]
pub unsafe extern "C" fn drone_debouncer_free(debouncer: *mut DroneDebouncer){
    if !debouncer.is_null(){
        unsafe{ drop(Box::from_raw(debouncer)); }
    }
}

//1 = accepted, 0 = unknown command, -1 = bad arguments
#[no_mangle]
pub unsafe extern "C" fn drone_debouncer_pulse(
    debouncer: *mut DroneDebouncer,
    command: *const c_char,
    now_ms: u64,
) -> i32{
    if debouncer.is_null() || command.is_null(){
        return -1;
    }
    unsafe{
        let d = &mut *debouncer;
        let name = match CStr::from_ptr(command).to_str(){
            Ok(s) => s,
            Err(_) => return -1,
        };
        match d.inner.pulse(name, now_ms){
            Some(_) => 1,
            None => 0,
        }
    }
}

//1 if any command was released
#[no_mangle]
pub unsafe extern "C" fn drone_debouncer_expire(debouncer: *mut DroneDebouncer, now_ms: u64) -> i32{
    if debouncer.is_null(){
        return -1;
    }
    unsafe{
        match (*debouncer).inner.expire(now_ms){
            Some(_) => 1,
            None => 0,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn drone_debouncer_wrench(debouncer: *const DroneDebouncer, out: *mut DroneWrench) -> i32{
    if debouncer.is_null() || out.is_null(){
        return -1;
    }
    unsafe{
        *out = DroneWrench::from((*debouncer).inner.wrench());
    }
    1
}
