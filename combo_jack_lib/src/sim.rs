//! In-memory model of the RT298 verb interface, for dry runs and tests.
//!
//! Only the behaviour the jack monitor depends on is modelled: the coefficient index pointer
//! auto-advances on every read and write, pin sense is a plain value, and arming the type check
//! on the plug type coefficient latches the headset standard into the type detect field.

use crate::channel::VerbChannel;
use crate::coef::VENDOR_NODE;
use crate::profile::coefs;
use crate::verb::{ids, Response, Verb};

const NODES: usize = 0x80;
const CHECK_TYPE_MASK: u16 = 0xfcc0;
const CHECK_TYPE: u16 = 0xd400;

/// Wiring of the plug sitting in the simulated jack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadsetWiring {
    Ctia,
    Omtp,
    /// Three pole plug: no microphone ring to measure.
    None,
}

impl HeadsetWiring {
    const fn type_field(self) -> u16 {
        match self {
            HeadsetWiring::Ctia => 0x0070,
            HeadsetWiring::Omtp => 0x0030,
            HeadsetWiring::None => 0x0000,
        }
    }
}

pub struct SimulatedCodec {
    coefs: [u16; 256],
    coef_index: u8,
    pin_controls: [u8; NODES],
    connection: [u8; NODES],
    power: [u8; NODES],
    pin_sense: u32,
    wiring: HeadsetWiring,
    reject_selects: bool,
    coef_writes: usize,
}

impl Default for SimulatedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCodec {
    pub fn new() -> Self {
        Self {
            coefs: [0; 256],
            coef_index: 0,
            pin_controls: [0; NODES],
            connection: [0; NODES],
            // D3 until someone powers the node up
            power: [0x33; NODES],
            pin_sense: 0,
            wiring: HeadsetWiring::None,
            reject_selects: false,
            coef_writes: 0,
        }
    }

    /// Simulates inserting a plug with the given wiring.
    pub fn plug(&mut self, wiring: HeadsetWiring) {
        self.wiring = wiring;
        self.pin_sense = Response::PRESENCE_DETECT;
    }

    pub fn unplug(&mut self) {
        self.pin_sense = 0;
    }

    pub fn set_pin_sense(&mut self, raw: u32) {
        self.pin_sense = raw;
    }

    /// Makes coefficient index selects fail, as an uninitialized link would.
    pub fn reject_selects(&mut self, reject: bool) {
        self.reject_selects = reject;
    }

    pub fn set_coef(&mut self, index: u8, value: u16) {
        self.coefs[index as usize] = value;
    }

    pub fn coef(&self, index: u8) -> u16 {
        self.coefs[index as usize]
    }

    pub fn pin_control(&self, node: u8) -> u8 {
        self.pin_controls[node as usize & (NODES - 1)]
    }

    pub fn connection(&self, node: u8) -> u8 {
        self.connection[node as usize & (NODES - 1)]
    }

    pub fn power_state(&self, node: u8) -> u8 {
        self.power[node as usize & (NODES - 1)]
    }

    pub fn coef_writes(&self) -> usize {
        self.coef_writes
    }

    fn write_coef(&mut self, value: u16) {
        let index = self.coef_index;
        self.coefs[index as usize] = value;
        self.coef_writes += 1;

        if index == coefs::PLUG_TYPE && value & CHECK_TYPE_MASK == CHECK_TYPE {
            let detect = &mut self.coefs[coefs::TYPE_DETECT as usize];
            *detect = (*detect & !coefs::TYPE_FIELD_MASK) | self.wiring.type_field();
        }
    }

    fn respond(&mut self, verb: Verb) -> u32 {
        let node = verb.node as usize & (NODES - 1);
        let vendor = verb.node == VENDOR_NODE;

        match verb.verb {
            ids::SET_COEF_INDEX if vendor => {
                if self.reject_selects {
                    return Response::NOT_READY;
                }
                self.coef_index = verb.payload as u8;
                0
            }
            ids::GET_COEF_INDEX if vendor => self.coef_index as u32,
            ids::GET_PROC_COEF if vendor => {
                let value = self.coefs[self.coef_index as usize];
                self.coef_index = self.coef_index.wrapping_add(1);
                value as u32
            }
            ids::SET_PROC_COEF if vendor => {
                self.write_coef(verb.payload);
                self.coef_index = self.coef_index.wrapping_add(1);
                0
            }
            ids::GET_PIN_SENSE => self.pin_sense,
            ids::SET_PIN_WIDGET_CONTROL => {
                self.pin_controls[node] = verb.payload as u8;
                0
            }
            ids::GET_PIN_WIDGET_CONTROL => self.pin_controls[node] as u32,
            ids::SET_CONNECT_SEL => {
                self.connection[node] = verb.payload as u8;
                0
            }
            ids::GET_CONNECT_SEL => self.connection[node] as u32,
            ids::SET_POWER_STATE => {
                let target = (verb.payload & 0x0f) as u8;
                self.power[node] = (target << 4) | target;
                0
            }
            ids::GET_POWER_STATE => self.power[node] as u32,
            // Realtek 0x10ec, ALC298
            ids::PARAMETERS if verb.payload == ids::param::VENDOR_ID => 0x10ec_0298,
            _ => 0,
        }
    }
}

impl VerbChannel for SimulatedCodec {
    type Error = core::convert::Infallible;

    fn send(&mut self, command: u32) -> Result<u32, Self::Error> {
        Ok(self.respond(Verb::decode(command)))
    }
}
