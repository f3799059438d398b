/**
 * Drone Controller Binary
 *
 * 1. Loads the vehicle configuration
 * 2. Connects to the STM32 companion board over UART
 * 3. Feeds IMU reports through the fusion pipeline onto the telemetry bus
 * 4. Takes local wrench keys and remote command pulses from stdin
 * 5. Ticks the vehicle controller at a fixed rate
 *
 * Usage: drone_controller [--config path] [--port dev] [--baud n]
 */

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drone_core::uart;
use drone_core::{
    DroneConfig, SensorDriver, SensorFusionPipeline, SensorKind, TelemetryBus, VehicleController, Wrench,
};

const HEARTBEAT_INTERVAL_MS: u64 = 500;

#[derive(Parser, Debug)]
#[command(name = "drone_controller")]
#[command(about = "Underwater drone sensor fusion and thruster control")]
#[command(version)]
struct Args {
    /// Vehicle configuration (JSON)
    #[arg(short, long, default_value = "config/drone.json")]
    config: PathBuf,

    /// Serial device, overrides the config file
    #[arg(long)]
    port: Option<String>,

    /// Baud rate, overrides the config file
    #[arg(long)]
    baud: Option<u32>,

    /// Control tick period in milliseconds
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,

    /// Magnitude used by the local wrench keys
    #[arg(long, default_value_t = 0.3)]
    power: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Input {
    Local(Wrench),
    Remote(String),
    Stop,
    Status,
    Exit,
}

fn parse_line(line: &str, power: f64) -> Option<Input> {
    let line = line.trim();
    if let Some(name) = line.strip_prefix("cmd ") {
        return Some(Input::Remote(name.trim().to_string()));
    }
    let wrench = match line {
        "w" => Wrench { surge: power, ..Default::default() },
        "s" => Wrench { surge: -power, ..Default::default() },
        "a" => Wrench { yaw: -power, ..Default::default() },
        "d" => Wrench { yaw: power, ..Default::default() },
        "q" => Wrench { heave: power, ..Default::default() },
        "e" => Wrench { heave: -power, ..Default::default() },
        "" => return None,
        "stop" => return Some(Input::Stop),
        "r" | "status" => return Some(Input::Status),
        "x" | "exit" | "quit" => return Some(Input::Exit),
        _ => {
            println!("Unknown command: {}", line);
            return None;
        }
    };
    Some(Input::Local(wrench))
}

fn read_commands(tx: Sender<Input>, power: f64) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("stdin: {}", e);
                break;
            }
        };
        if let Some(input) = parse_line(&line, power) {
            let exit = input == Input::Exit;
            if tx.send(input).is_err() || exit {
                break;
            }
        }
    }
}

fn print_help() {
    println!("\n[Commands]");
    println!("  w/s - surge forward/backward");
    println!("  a/d - yaw left/right");
    println!("  q/e - heave up/down");
    println!("  cmd <name> - remote pulse (e.g. cmd pitch_up, cmd visible-led)");
    println!("  r - status");
    println!("  stop - stop all");
    println!("  x - exit\n");
}

fn print_status<D: drone_core::ActuatorDriver>(
    pipeline: &SensorFusionPipeline,
    controller: &VehicleController<D>,
    now: u64,
) {
    let state = pipeline.state();
    println!(
        "[ORIENT] yaw={:.3} pitch={:.3} roll={:.3}",
        state.orientation.yaw, state.orientation.pitch, state.orientation.roll
    );
    let v = state.velocity_world;
    let p = state.position_world;
    println!("[SPEED] {:.3} {:.3} {:.3} m/s", v.x, v.y, v.z);
    println!("[LOCATION] {:.3} {:.3} {:.3} m", p.x, p.y, p.z);
    println!("[SOURCE] {:?}", controller.active_source(now));
    println!("[MOTORS] {:?}", controller.motor_outputs());
}

//next tick deadline; after a stall the schedule restarts from now instead of bursting
fn schedule_next_tick(scheduled: Instant, now: Instant, period: Duration) -> Instant {
    let next = scheduled + period;
    if next + period <= now {
        now + period
    } else {
        next
    }
}

fn disable_sensors<D: SensorDriver>(driver: &mut D) {
    for kind in [SensorKind::RotationVector, SensorKind::LinearAcceleration] {
        if let Err(e) = driver.disable_sensor(kind) {
            tracing::warn!("failed to disable {:?}: {}", kind, e);
        }
    }
}

fn run(args: Args, rx: Receiver<Input>) -> Result<()> {
    let mut config = DroneConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(baud) = args.baud {
        config.serial.baud = baud;
    }

    let (mut sensors, actuators) = uart::open(&config.serial.port, config.serial.baud)
        .with_context(|| format!("opening serial port {}", config.serial.port))?;
    let mut controller =
        VehicleController::from_config(actuators, &config).context("building vehicle controller")?;

    let mut pipeline = SensorFusionPipeline::new();
    SensorFusionPipeline::enable_sensors(&mut sensors, config.sampling_interval_ms);

    let mut bus = TelemetryBus::default();
    let wrench_feed = bus.wrench();

    let start = Instant::now();
    let tick = Duration::from_millis(args.tick_ms.max(1));
    let mut next_tick = start;
    let mut last_heartbeat = 0u64;

    print_help();

    'control: loop {
        let now = start.elapsed().as_millis() as u64;

        match sensors.poll_events() {
            Ok(events) => {
                for event in &events {
                    pipeline.handle(event, &mut bus);
                }
            }
            Err(e) => tracing::warn!("sensor read failed: {}", e),
        }

        loop {
            match rx.try_recv() {
                Ok(Input::Local(wrench)) => controller.set_local_wrench(wrench, now, &mut bus),
                Ok(Input::Remote(name)) => {
                    if !controller.on_remote_pulse(&name, now) {
                        println!("Unknown remote command: {}", name);
                    }
                }
                Ok(Input::Stop) => {
                    controller.stop(&mut bus);
                    println!("[STOP]");
                }
                Ok(Input::Status) => print_status(&pipeline, &controller, now),
                Ok(Input::Exit) | Err(TryRecvError::Disconnected) => break 'control,
                Err(TryRecvError::Empty) => break,
            }
        }

        if Instant::now() >= next_tick {
            controller.tick(now, &mut bus);
            if let Some(wrench) = wrench_feed.latest_if_new() {
                tracing::trace!("applied wrench {:?}", wrench.to_array());
            }
            if now.saturating_sub(last_heartbeat) >= HEARTBEAT_INTERVAL_MS {
                if let Err(e) = controller.driver_mut().heartbeat() {
                    tracing::warn!("heartbeat failed: {}", e);
                }
                last_heartbeat = now;
            }
            next_tick = schedule_next_tick(next_tick, Instant::now(), tick);
        }
    }

    println!("[SHUTDOWN]");
    controller.stop(&mut bus);
    disable_sensors(&mut sensors);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let (tx, rx) = mpsc::channel();
    let power = args.power;
    thread::spawn(move || read_commands(tx, power));

    run(args, rx)
}
