pub mod protocol;
pub use protocol::*;

use std::io::{Read, Write};
use std::time::Duration;
use serialport::SerialPort;

use crate::control::{ActuatorDriver, PwmOutput};
use crate::error::DriverError;
use crate::fusion::{SensorDriver, SensorEvent, SensorKind};

pub const SYNC_BYTE: u8 = 0xAA;
pub const MAX_MSG_SIZE: usize = 244;
const READ_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType{
    MotorPower = 0x03,
    Heartbeat = 0x04,
    RotationVector = 0x05,
    LinearAcceleration = 0x06,
    SensorCommand = 0x10,
    Ack = 0x11,
}

impl MsgType{
    pub fn from_u8(val: u8) -> Option<Self>{
        match val{
            0x03 => Some(MsgType::MotorPower),
            0x04 => Some(MsgType::Heartbeat),
            0x05 => Some(MsgType::RotationVector),
            0x06 => Some(MsgType::LinearAcceleration),
            0x10 => Some(MsgType::SensorCommand),
            0x11 => Some(MsgType::Ack),
            _ => None,
        }
    }
}

//raw type byte is kept so unknown reports can still be surfaced
#[derive(Debug, Clone, PartialEq)]
pub struct UartFrame{
    pub msg_type: u8,
    pub payload: Vec<u8>,
}

impl UartFrame{
    //link-level frames (heartbeat, ack) carry no sensor data
    pub fn to_sensor_event(&self) -> Option<SensorEvent>{
        match MsgType::from_u8(self.msg_type){
            Some(MsgType::RotationVector) =>{
                let msg = RotationVectorMsg::from_bytes(&self.payload)?;
                Some(SensorEvent::RotationVector{
                    yaw: msg.yaw as f64,
                    pitch: msg.pitch as f64,
                    roll: msg.roll as f64,
                })
            }
            Some(MsgType::LinearAcceleration) =>{
                let msg = LinearAccelMsg::from_bytes(&self.payload)?;
                Some(SensorEvent::LinearAcceleration{
                    x: msg.x as f64,
                    y: msg.y as f64,
                    z: msg.z as f64,
                    timestamp_us: msg.timestamp_us,
                })
            }
            Some(_) => None,
            None => Some(SensorEvent::Unknown{ report_id: self.msg_type }),
        }
    }
}

pub fn calculate_checksum(data: &[u8]) -> u8{
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

//frame format: [SYNC][TYPE][LEN][PAYLOAD...][CHECKSUM]
//              0xAA  1byte 1byte  LEN bytes   1byte
pub fn encode_frame(msg_type: MsgType, payload: &[u8]) -> Result<Vec<u8>, DriverError>{
    if payload.len() > MAX_MSG_SIZE{
        return Err(DriverError::PayloadTooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.push(SYNC_BYTE);
    frame.push(msg_type as u8);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);

    let checksum = calculate_checksum(&frame[1..]);
    frame.push(checksum);
    Ok(frame)
}

//reassembles frames from an arbitrary byte stream
#[derive(Debug, Default)]
pub struct FrameDecoder{
    rx_buffer: Vec<u8>,
}

impl FrameDecoder{
    pub fn new() -> Self{
        FrameDecoder{ rx_buffer: Vec::with_capacity(512) }
    }

    pub fn push(&mut self, data: &[u8]){
        self.rx_buffer.extend_from_slice(data);
    }

    pub fn buffered(&self) -> usize{
        self.rx_buffer.len()
    }

    //next valid frame; garbage and corrupt frames are skipped byte by byte
    pub fn next_frame(&mut self) -> Option<UartFrame>{
        loop{
            let sync_pos = match self.rx_buffer.iter().position(|&b| b == SYNC_BYTE){
                Some(pos) => pos,
                None =>{
                    self.rx_buffer.clear();
                    return None;
                }
            };
            if sync_pos > 0{
                self.rx_buffer.drain(0..sync_pos);
            }

            if self.rx_buffer.len() < 4{
                return None;
            }

            let msg_type = self.rx_buffer[1];
            let len = self.rx_buffer[2] as usize;

            if len > MAX_MSG_SIZE{
                self.rx_buffer.remove(0);
                continue;
            }

            let frame_len = 4 + len; //sync + type + len + payload + checksum
            if self.rx_buffer.len() < frame_len{
                return None;
            }

            let checksum = self.rx_buffer[3 + len];
            let calculated = calculate_checksum(&self.rx_buffer[1..3 + len]);
            if checksum != calculated{
                tracing::debug!("dropping frame 0x{:02X}: bad checksum", msg_type);
                self.rx_buffer.remove(0);
                continue;
            }

            let payload = self.rx_buffer[3..3 + len].to_vec();
            self.rx_buffer.drain(0..frame_len);
            return Some(UartFrame{ msg_type, payload });
        }
    }
}

//IMU side of the STM32 link
pub struct UartSensorLink<P: Read + Write>{
    port: P,
    decoder: FrameDecoder,
}

impl<P: Read + Write> UartSensorLink<P>{
    pub fn new(port: P) -> Self{
        UartSensorLink{ port, decoder: FrameDecoder::new() }
    }

    fn send(&mut self, msg_type: MsgType, payload: &[u8]) -> Result<(), DriverError>{
        let frame = encode_frame(msg_type, payload)?;
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }
}

impl<P: Read + Write> SensorDriver for UartSensorLink<P>{
    fn enable_sensor(&mut self, kind: SensorKind, interval_ms: u32) -> Result<(), DriverError>{
        let cmd = SensorCmd{ sensor: kind as u8, enable: 1, interval_ms };
        self.send(MsgType::SensorCommand, &cmd.to_bytes())
    }

    fn disable_sensor(&mut self, kind: SensorKind) -> Result<(), DriverError>{
        let cmd = SensorCmd{ sensor: kind as u8, enable: 0, interval_ms: 0 };
        self.send(MsgType::SensorCommand, &cmd.to_bytes())
    }

    fn poll_events(&mut self) -> Result<Vec<SensorEvent>, DriverError>{
        let mut read_buf = [0u8; 256];
        match self.port.read(&mut read_buf){
            Ok(n) => self.decoder.push(&read_buf[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e.into()),
        }

        let mut events = Vec::new();
        while let Some(frame) = self.decoder.next_frame(){
            if let Some(event) = frame.to_sensor_event(){
                events.push(event);
            }
        }
        Ok(events)
    }
}

//thruster side of the STM32 link
pub struct UartActuatorLink<W: Write>{
    port: W,
}

impl<W: Write> UartActuatorLink<W>{
    pub fn new(port: W) -> Self{
        UartActuatorLink{ port }
    }

    pub fn heartbeat(&mut self) -> Result<(), DriverError>{
        let frame = encode_frame(MsgType::Heartbeat, &[])?;
        self.port.write_all(&frame)?;
        Ok(())
    }
}

impl<W: Write> ActuatorDriver for UartActuatorLink<W>{
    fn set_duty_cycle(&mut self, output: &PwmOutput, power: f64) -> Result<(), DriverError>{
        let cmd = MotorPowerCmd::new(output.channel, output.invert, power);
        let frame = encode_frame(MsgType::MotorPower, &cmd.to_bytes())?;
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }
}

pub type SerialSensorLink = UartSensorLink<Box<dyn SerialPort>>;
pub type SerialActuatorLink = UartActuatorLink<Box<dyn SerialPort>>;

//one port, two handles: sensor reads and thruster writes never share a borrow
pub fn open(port_name: &str, baud_rate: u32) -> Result<(SerialSensorLink, SerialActuatorLink), DriverError>{
    let port = serialport::new(port_name, baud_rate)
        .timeout(Duration::from_millis(READ_TIMEOUT_MS))
        .open()?;
    let writer = port.try_clone()?;
    tracing::info!("opened {} at {} baud", port_name, baud_rate);
    Ok((UartSensorLink::new(port), UartActuatorLink::new(writer)))
}

#[cfg(test)]
mod tests{
    use super::*;
    use std::io::Cursor;

    struct MockPort{
        rx: Cursor<Vec<u8>>,
        tx: Vec<u8>,
    }

    impl Read for MockPort{
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>{
            self.rx.read(buf)
        }
    }

    impl Write for MockPort{
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>{
            self.tx.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()>{
            Ok(())
        }
    }

    #[test]
    fn test_msg_type_conversion(){
        assert_eq!(MsgType::from_u8(0x05), Some(MsgType::RotationVector));
        assert_eq!(MsgType::from_u8(0x06), Some(MsgType::LinearAcceleration));
        assert_eq!(MsgType::from_u8(0xFF), None);
    }

    #[test]
    fn test_checksum(){
        let data = [0x01, 0x05, 0xAB, 0xCD];
        let checksum = calculate_checksum(&data);
        assert_eq!(checksum, 0x01u8.wrapping_add(0x05).wrapping_add(0xAB).wrapping_add(0xCD));
    }

    #[test]
    fn test_decoder_skips_garbage_and_corruption(){
        let good = encode_frame(MsgType::Heartbeat, &[7]).unwrap();
        let mut corrupt = encode_frame(MsgType::Heartbeat, &[9]).unwrap();
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xFF;

        let mut decoder = FrameDecoder::new();
        decoder.push(&[0x00, 0x13]);
        decoder.push(&corrupt);
        decoder.push(&good);

        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame, UartFrame{ msg_type: MsgType::Heartbeat as u8, payload: vec![7] });
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_decoder_waits_for_partial_frame(){
        let frame = encode_frame(MsgType::Ack, &[1, 2, 3]).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.push(&frame[..4]);
        assert!(decoder.next_frame().is_none());
        decoder.push(&frame[4..]);
        assert_eq!(decoder.next_frame().unwrap().payload, vec![1, 2, 3]);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_payload_too_large(){
        let payload = vec![0u8; MAX_MSG_SIZE + 1];
        assert!(matches!(
            encode_frame(MsgType::MotorPower, &payload),
            Err(DriverError::PayloadTooLarge(245))
        ));
    }

    #[test]
    fn test_sensor_link_decodes_reports(){
        let mut stream = Vec::new();
        stream.extend(encode_frame(
            MsgType::RotationVector,
            &RotationVectorMsg{ yaw: 0.5, pitch: 0.0, roll: -0.25 }.to_bytes(),
        ).unwrap());
        stream.extend(encode_frame(MsgType::Heartbeat, &[]).unwrap());
        stream.extend(encode_frame(
            MsgType::LinearAcceleration,
            &LinearAccelMsg{ x: 0.0, y: 0.0, z: 9.5, timestamp_us: 1_234_567 }.to_bytes(),
        ).unwrap());
        //unknown report id 0x2A with a valid frame
        stream.extend([SYNC_BYTE, 0x2A, 0x00, 0x2A]);

        let port = MockPort{ rx: Cursor::new(stream), tx: Vec::new() };
        let mut link = UartSensorLink::new(port);
        let events = link.poll_events().unwrap();

        assert_eq!(events, vec![
            SensorEvent::RotationVector{ yaw: 0.5, pitch: 0.0, roll: -0.25 },
            SensorEvent::LinearAcceleration{ x: 0.0, y: 0.0, z: 9.5f32 as f64, timestamp_us: 1_234_567 },
            SensorEvent::Unknown{ report_id: 0x2A },
        ]);
    }

    #[test]
    fn test_enable_sensor_frame(){
        let port = MockPort{ rx: Cursor::new(Vec::new()), tx: Vec::new() };
        let mut link = UartSensorLink::new(port);
        link.enable_sensor(SensorKind::LinearAcceleration, 20).unwrap();

        let expected = encode_frame(
            MsgType::SensorCommand,
            &SensorCmd{ sensor: 0x06, enable: 1, interval_ms: 20 }.to_bytes(),
        ).unwrap();
        assert_eq!(link.port.tx, expected);
    }

    #[test]
    fn test_actuator_link_writes_power_frame(){
        let mut link = UartActuatorLink::new(Vec::new());
        link.set_duty_cycle(&PwmOutput{ channel: 2, invert: true }, 0.75).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.push(&link.port);
        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.msg_type, MsgType::MotorPower as u8);
        let cmd = MotorPowerCmd::from_bytes(&frame.payload).unwrap();
        assert_eq!(cmd, MotorPowerCmd{ channel: 2, invert: 1, power: 0.75 });
    }
}
