use std::path::PathBuf;
use std::str::FromStr;

use combo_jack_lib::channel::VerbChannel;
use combo_jack_lib::sim::{HeadsetWiring, SimulatedCodec};

use crate::hwdep::HwdepChannel;
use crate::serial::SerialChannel;
use crate::Error;

/// Plug state the simulator starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedPlug {
    Empty,
    Trs,
    Ctia,
    Omtp,
}

impl FromStr for SimulatedPlug {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" | "none" => Ok(SimulatedPlug::Empty),
            "trs" | "headphones" => Ok(SimulatedPlug::Trs),
            "ctia" => Ok(SimulatedPlug::Ctia),
            "omtp" => Ok(SimulatedPlug::Omtp),
            s => Err(format!("Invalid plug {}, expected empty, trs, ctia or omtp", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Backend {
    Hwdep(PathBuf),
    Serial(Option<String>),
    Simulated(SimulatedPlug),
}

impl Backend {
    pub fn open(&self) -> Result<Channel, Error> {
        match self {
            Backend::Hwdep(path) => HwdepChannel::open(path).map(Channel::Hwdep),
            Backend::Serial(port) => SerialChannel::open(port.as_deref()).map(Channel::Serial),
            Backend::Simulated(plug) => {
                let mut sim = SimulatedCodec::new();
                match plug {
                    SimulatedPlug::Empty => {}
                    SimulatedPlug::Trs => sim.plug(HeadsetWiring::None),
                    SimulatedPlug::Ctia => sim.plug(HeadsetWiring::Ctia),
                    SimulatedPlug::Omtp => sim.plug(HeadsetWiring::Omtp),
                }
                Ok(Channel::Simulated(Box::new(sim)))
            }
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Hwdep(path) => write!(f, "hwdep {}", path.display()),
            Backend::Serial(Some(port)) => write!(f, "serial bridge on {}", port),
            Backend::Serial(None) => write!(f, "serial bridge"),
            Backend::Simulated(plug) => write!(f, "simulated codec ({:?})", plug),
        }
    }
}

/// The verb channel held for the lifetime of the process. Dropping it closes the device.
pub enum Channel {
    Hwdep(HwdepChannel),
    Serial(SerialChannel),
    Simulated(Box<SimulatedCodec>),
}

impl VerbChannel for Channel {
    type Error = Error;

    fn send(&mut self, command: u32) -> Result<u32, Error> {
        match self {
            Channel::Hwdep(channel) => channel.send(command),
            Channel::Serial(channel) => channel.send(command),
            Channel::Simulated(sim) => match sim.send(command) {
                Ok(response) => Ok(response),
                Err(never) => match never {},
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_backend_starts_with_requested_plug() {
        let mut channel = Backend::Simulated(SimulatedPlug::Ctia).open().unwrap();
        // GET_PIN_SENSE on the headphone pin
        assert_eq!(channel.send(0x210f_0900).unwrap(), 0x8000_0000);

        let mut channel = Backend::Simulated(SimulatedPlug::Empty).open().unwrap();
        assert_eq!(channel.send(0x210f_0900).unwrap(), 0);
    }

    #[test]
    fn parses_simulated_plugs() {
        assert_eq!("ctia".parse(), Ok(SimulatedPlug::Ctia));
        assert_eq!("none".parse(), Ok(SimulatedPlug::Empty));
        assert!("usb".parse::<SimulatedPlug>().is_err());
    }
}
