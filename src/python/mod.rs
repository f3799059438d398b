use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;
use nalgebra::DMatrix;
use crate::control::{ActuatorMixer, MixingProfile, RemoteCommandDebouncer, Wrench};
use crate::control::wrench::AXIS_COUNT;
use crate::control::debouncer::DEFAULT_KEYUP_TIMEOUT_MS;
use crate::fusion::{SensorEvent, SensorFusionPipeline, TelemetryEvent};

type PyEvent = (String, Vec<f64>);

fn event_values(event: &TelemetryEvent) -> Vec<f64>{
    match event{
        TelemetryEvent::Orientation(v) | TelemetryEvent::Acceleration(v) | TelemetryEvent::Location(v) => v.to_vec(),
        TelemetryEvent::Speed(s) => vec![s.x, s.y, s.z, s.timestamp as f64],
        TelemetryEvent::Wrench(w) => w.to_array().to_vec(),
    }
}

#[pyclass]
pub struct PyFusionPipeline{
    inner: SensorFusionPipeline,
}

impl PyFusionPipeline{
    fn feed(&mut self, event: SensorEvent) -> Vec<PyEvent>{
        let mut emitted: Vec<TelemetryEvent> = Vec::new();
        self.inner.handle(&event, &mut emitted);
        emitted.iter().map(|e| (e.name().to_string(), event_values(e))).collect()
    }
}

#[pymethods]
impl PyFusionPipeline{
    #[new]
    fn new() -> Self{
        PyFusionPipeline{ inner: SensorFusionPipeline::new() }
    }

    fn on_rotation_vector(&mut self, yaw: f64, pitch: f64, roll: f64) -> Vec<PyEvent>{
        self.feed(SensorEvent::RotationVector{ yaw, pitch, roll })
    }

    fn on_linear_acceleration(&mut self, x: f64, y: f64, z: f64, timestamp_us: u64) -> Vec<PyEvent>{
        self.feed(SensorEvent::LinearAcceleration{ x, y, z, timestamp_us })
    }

    fn orientation(&self) -> [f64; 3]{
        self.inner.state().orientation.to_array()
    }

    fn velocity(&self) -> (f64, f64, f64){
        let v = self.inner.state().velocity_world;
        (v.x, v.y, v.z)
    }

    fn position(&self) -> (f64, f64, f64){
        let p = self.inner.state().position_world;
        (p.x, p.y, p.z)
    }

    fn last_update(&self) -> Option<u64>{
        self.inner.state().last_update
    }

    fn reset(&mut self){
        self.inner.reset();
    }
}

#[pyclass]
pub struct PyMixer{
    inner: ActuatorMixer,
}

#[pymethods]
impl PyMixer{
    #[staticmethod]
    fn reference() -> PyResult<Self>{
        let allocation = match MixingProfile::reference_five_motor(){
            MixingProfile::Calibration(matrix) => matrix.transpose(),
            MixingProfile::PseudoInverse => return Err(PyValueError::new_err("no reference matrix")),
        };
        let inner = ActuatorMixer::from_allocation(allocation)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyMixer{ inner })
    }

    //one row per motor, six axis coefficients each
    #[staticmethod]
    fn from_allocation(rows: Vec<Vec<f64>>) -> PyResult<Self>{
        if rows.iter().any(|r| r.len() != AXIS_COUNT){
            return Err(PyValueError::new_err(format!("Expected {} coefficients per motor", AXIS_COUNT)));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let allocation = DMatrix::from_row_slice(rows.len(), AXIS_COUNT, &flat);
        let inner = ActuatorMixer::from_allocation(allocation)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyMixer{ inner })
    }

    fn motor_count(&self) -> usize{
        self.inner.motor_count()
    }

    fn apply(&self, heave: f64, sway: f64, surge: f64, yaw: f64, pitch: f64, roll: f64) -> Vec<f64>{
        self.inner.apply(&Wrench{ heave, sway, surge, yaw, pitch, roll })
    }
}

#[pyclass]
pub struct PyDebouncer{
    inner: RemoteCommandDebouncer,
}

#[pymethods]
impl PyDebouncer{
    #[new]
    #[pyo3(signature = (timeout_ms = DEFAULT_KEYUP_TIMEOUT_MS))]
    fn new(timeout_ms: u64) -> Self{
        PyDebouncer{ inner: RemoteCommandDebouncer::new(timeout_ms) }
    }

    fn pulse(&mut self, command: &str, now_ms: u64) -> bool{
        self.inner.pulse(command, now_ms).is_some()
    }

    fn expire(&mut self, now_ms: u64) -> bool{
        self.inner.expire(now_ms).is_some()
    }

    fn next_deadline(&self) -> Option<u64>{
        self.inner.next_deadline()
    }

    fn wrench(&self) -> [f64; AXIS_COUNT]{
        self.inner.wrench().to_array()
    }

    fn reset(&mut self){
        self.inner.reset();
    }
}

#[pymodule]
fn drone_core(_py: Python, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyFusionPipeline>()?;
    m.add_class::<PyMixer>()?;
    m.add_class::<PyDebouncer>()?;
    Ok(())
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_py_fusion_events(){
        let mut fusion = PyFusionPipeline::new();
        let events = fusion.on_rotation_vector(0.1, 0.0, 0.0);
        assert_eq!(events, vec![("orientation".to_string(), vec![0.1, 0.0, 0.0])]);

        let events = fusion.on_linear_acceleration(0.0, 0.0, 0.0, 0);
        let names: Vec<&str> = events.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["acceleration", "speed", "location"]);
        assert_eq!(fusion.last_update(), Some(0));
    }

    #[test]
    fn test_py_mixer(){
        let mixer = PyMixer::reference().unwrap();
        assert_eq!(mixer.motor_count(), 5);
        assert_eq!(mixer.apply(0.0, 0.0, 1.0, 0.0, 0.0, 0.0), vec![0.0, 0.0, 0.0, 0.0, 1.0]);

        assert!(PyMixer::from_allocation(vec![vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_py_debouncer(){
        let mut debouncer = PyDebouncer::new(60);
        assert!(debouncer.pulse("yaw_left", 0));
        assert!(!debouncer.pulse("moonwalk", 0));
        assert_eq!(debouncer.next_deadline(), Some(60));
        assert!(debouncer.expire(60));
        assert_eq!(debouncer.wrench(), [0.0; AXIS_COUNT]);
    }
}
