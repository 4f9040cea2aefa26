//! Verb channel over a USB serial bridge that forwards verb words to a codec.

use std::io::{Read, Write};

use serialport::{self, FlowControl, Parity, SerialPort, SerialPortInfo, StopBits};

use combo_jack_lib::channel::VerbChannel;
use combo_jack_lib::message::Message;

use postcard::{
    flavors::{Cobs, Slice},
    from_bytes_cobs, serialize_with_flavor,
};

use crate::Error;

const BRIDGE_VID: u16 = 0x1209;
const BRIDGE_PID: u16 = 0x0002;
const BAUD_RATE: u32 = 115200;
const FRAME_SIZE: usize = 32;

fn find_port() -> Option<SerialPortInfo> {
    let available_ports = serialport::available_ports().ok()?;

    available_ports.into_iter().find(|p| {
        matches!(
            p.port_type,
            serialport::SerialPortType::UsbPort(ref port_info)
                if port_info.vid == BRIDGE_VID && port_info.pid == BRIDGE_PID
        )
    })
}

pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Opens `port_name`, or the first bridge found on USB when `None`.
    pub fn open(port_name: Option<&str>) -> Result<Self, Error> {
        let port_name = match port_name {
            Some(name) => name.to_owned(),
            None => find_port().ok_or(Error::DeviceNotFound)?.port_name,
        };

        let mut port = serialport::new(port_name.as_str(), BAUD_RATE)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open()?;

        port.set_timeout(std::time::Duration::from_millis(500))?;
        port.write_data_terminal_ready(true)?;

        let mut channel = Self { port };
        match channel.exchange(&Message::Ping)? {
            Message::Ack => {
                log::debug!("Serial - Bridge answered on {}", port_name);
                Ok(channel)
            }
            m => Err(Error::UnexpectedMessage(m)),
        }
    }

    fn exchange(&mut self, message: &Message) -> Result<Message, Error> {
        let mut buffer = [0u8; FRAME_SIZE];
        let serialized = serialize_with_flavor::<Message, Cobs<Slice>, &mut [u8]>(
            message,
            Cobs::try_new(Slice::new(&mut buffer))?,
        )?;
        self.port.write_all(serialized)?;

        // Frames end at the first zero byte
        let mut frame = [0u8; FRAME_SIZE];
        let mut size = 0;
        loop {
            let read = self.port.read(&mut frame[size..])?;
            if read == 0 {
                return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
            }
            size += read;
            if frame[..size].contains(&0) || size == frame.len() {
                break;
            }
        }

        Ok(from_bytes_cobs::<'_, Message>(&mut frame[..size])?)
    }
}

impl Drop for SerialChannel {
    fn drop(&mut self) {
        self.port.write_data_terminal_ready(false).ok();
    }
}

impl VerbChannel for SerialChannel {
    type Error = Error;

    fn send(&mut self, command: u32) -> Result<u32, Error> {
        match self.exchange(&Message::Verb(command))? {
            Message::Response(response) => Ok(response),
            Message::Nack => Err(Error::Nack(command)),
            m => Err(Error::UnexpectedMessage(m)),
        }
    }
}
