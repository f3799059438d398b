use std::sync::Arc;
use super::topic::Topic;
use super::subscriber::Subscriber;
use crate::control::Wrench;
use crate::fusion::{EventSink, Speed, TelemetryEvent};

pub const ORIENTATION_TOPIC: &str = "/drone/orientation";
pub const ACCELERATION_TOPIC: &str = "/drone/acceleration";
pub const SPEED_TOPIC: &str = "/drone/speed";
pub const LOCATION_TOPIC: &str = "/drone/location";
pub const WRENCH_TOPIC: &str = "/drone/wrench";

pub const DEFAULT_TOPIC_CAPACITY: usize = 64;

//one typed topic per telemetry event
pub struct TelemetryBus{
    orientation: Arc<Topic<[f64; 3]>>,
    acceleration: Arc<Topic<[f64; 3]>>,
    speed: Arc<Topic<Speed>>,
    location: Arc<Topic<[f64; 3]>>,
    wrench: Arc<Topic<Wrench>>,
}

impl TelemetryBus{
    pub fn new(capacity: usize) -> Self{
        TelemetryBus{
            orientation: Arc::new(Topic::new(ORIENTATION_TOPIC, capacity)),
            acceleration: Arc::new(Topic::new(ACCELERATION_TOPIC, capacity)),
            speed: Arc::new(Topic::new(SPEED_TOPIC, capacity)),
            location: Arc::new(Topic::new(LOCATION_TOPIC, capacity)),
            wrench: Arc::new(Topic::new(WRENCH_TOPIC, capacity)),
        }
    }

    pub fn orientation(&self) -> Subscriber<[f64; 3]>{
        Subscriber::new(Arc::clone(&self.orientation))
    }

    pub fn acceleration(&self) -> Subscriber<[f64; 3]>{
        Subscriber::new(Arc::clone(&self.acceleration))
    }

    pub fn speed(&self) -> Subscriber<Speed>{
        Subscriber::new(Arc::clone(&self.speed))
    }

    pub fn location(&self) -> Subscriber<[f64; 3]>{
        Subscriber::new(Arc::clone(&self.location))
    }

    pub fn wrench(&self) -> Subscriber<Wrench>{
        Subscriber::new(Arc::clone(&self.wrench))
    }

    pub fn publish(&self, event: TelemetryEvent) -> u64{
        match event{
            TelemetryEvent::Orientation(v) => self.orientation.publish(v),
            TelemetryEvent::Acceleration(v) => self.acceleration.publish(v),
            TelemetryEvent::Speed(v) => self.speed.publish(v),
            TelemetryEvent::Location(v) => self.location.publish(v),
            TelemetryEvent::Wrench(v) => self.wrench.publish(v),
        }
    }
}

impl Default for TelemetryBus{
    fn default() -> Self{
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

impl EventSink for TelemetryBus{
    fn emit(&mut self, event: TelemetryEvent){
        self.publish(event);
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::fusion::{SensorEvent, SensorFusionPipeline};

    #[test]
    fn test_events_land_on_their_topics(){
        let bus = TelemetryBus::new(8);
        let speed = bus.speed();
        let wrench = bus.wrench();

        bus.publish(TelemetryEvent::Speed(Speed{ x: 1.0, y: 2.0, z: 3.0, timestamp: 7 }));
        bus.publish(TelemetryEvent::Wrench(Wrench{ yaw: -1.0, ..Default::default() }));

        assert_eq!(speed.try_recv().unwrap().timestamp, 7);
        assert_eq!(wrench.try_recv().unwrap().yaw, -1.0);
        assert!(!bus.orientation().has_new());
        assert_eq!(speed.topic_name(), SPEED_TOPIC);
    }

    #[test]
    fn test_pipeline_into_bus(){
        let mut bus = TelemetryBus::default();
        let location = bus.location();
        let mut pipeline = SensorFusionPipeline::new();
        pipeline.handle(&SensorEvent::LinearAcceleration{ x: 1.0, y: 0.0, z: 0.0, timestamp_us: 0 }, &mut bus);
        pipeline.handle(&SensorEvent::LinearAcceleration{ x: 1.0, y: 0.0, z: 0.0, timestamp_us: 1_000_000 }, &mut bus);

        let (latest, epoch) = location.peek_latest().unwrap();
        assert_eq!(epoch, 2);
        // v = 1 m/s after 1 s, position advanced by v * 1 s
        assert!((latest[0] - 1.0).abs() < 1e-12);
    }
}
