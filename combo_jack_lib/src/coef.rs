//! Indexed access to the vendor coefficient space.
//!
//! Coefficients are reached by selecting an index and then reading or writing. Both the read
//! and the write advance the hardware index pointer, so every access here reselects first.

use crate::channel::VerbChannel;
use crate::verb::{ids, Response, Verb};

/// Vendor register block of the RT298.
pub const VENDOR_NODE: u8 = 0x20;

/// Payload of the coefficient read verb.
const PROBE: u16 = 0x00;

pub enum Error<E> {
    Channel(E),
    /// A select or write verb answered something other than success.
    RegisterWriteRejected { command: u32, response: u32 },
}

impl<E: core::fmt::Debug> core::fmt::Debug for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Channel(inner) => write!(f, "Channel({:?})", inner),
            Error::RegisterWriteRejected { command, response } => write!(
                f,
                "RegisterWriteRejected(command 0x{:08x}, response 0x{:08x})",
                command, response
            ),
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Channel(inner) => write!(f, "verb channel error: {:?}", inner),
            Error::RegisterWriteRejected { command, response } => write!(
                f,
                "codec rejected command 0x{:08x} with response 0x{:08x}",
                command, response
            ),
        }
    }
}

/// A masked change to one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientUpdate {
    pub index: u8,
    pub mask: u16,
    pub value: u16,
}

impl CoefficientUpdate {
    pub const fn new(index: u8, mask: u16, value: u16) -> Self {
        Self { index, mask, value }
    }

    pub const fn apply_to(&self, current: u16) -> u16 {
        (current & !self.mask) | (self.value & self.mask)
    }
}

pub struct CoefficientRegister<C: VerbChannel> {
    channel: C,
    node: u8,
}

impl<C: VerbChannel> CoefficientRegister<C> {
    pub fn new(channel: C) -> Self {
        Self::with_node(channel, VENDOR_NODE)
    }

    pub fn with_node(channel: C, node: u8) -> Self {
        Self { channel, node }
    }

    pub fn node(&self) -> u8 {
        self.node
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Sends a single verb on the same channel, for pin and selector controls.
    pub fn send(&mut self, verb: Verb) -> Result<Response, Error<C::Error>> {
        let command = verb.encode();
        let response = self.channel.send(command).map_err(Error::Channel)?;
        log::trace!("Verb - {} => 0x{:08x}", verb, response);
        Ok(Response(response))
    }

    fn select(&mut self, index: u8) -> Result<(), Error<C::Error>> {
        let verb = Verb::new(self.node, ids::SET_COEF_INDEX, index as u16);
        let response = self.send(verb)?;
        if !response.is_success() {
            log::error!(
                "Coef - Received unexpected response 0x{:x} for command 0x{:x}",
                response.raw(),
                verb.encode()
            );
            return Err(Error::RegisterWriteRejected {
                command: verb.encode(),
                response: response.raw(),
            });
        }
        Ok(())
    }

    fn read_selected(&mut self) -> Result<u16, Error<C::Error>> {
        let response = self.send(Verb::new(self.node, ids::GET_PROC_COEF, PROBE))?;
        Ok(response.raw() as u16)
    }

    pub fn read(&mut self, index: u8) -> Result<u16, Error<C::Error>> {
        self.select(index)?;
        self.read_selected()
    }

    /// Read-modify-write of one coefficient. Returns the value read back after the update.
    ///
    /// The write is skipped when the masked value is already in place. A rejected select or
    /// write stops the sequence immediately.
    pub fn update(&mut self, index: u8, mask: u16, value: u16) -> Result<u16, Error<C::Error>> {
        let update = CoefficientUpdate::new(index, mask, value);
        let current = self.read(index)?;
        let new = update.apply_to(current);

        if new != current {
            self.select(index)?;
            let verb = Verb::new(self.node, ids::SET_PROC_COEF, new);
            let response = self.send(verb)?;
            if !response.is_success() {
                log::error!(
                    "Coef - Received unexpected response 0x{:x} for command 0x{:x}",
                    response.raw(),
                    verb.encode()
                );
                return Err(Error::RegisterWriteRejected {
                    command: verb.encode(),
                    response: response.raw(),
                });
            }
        }

        let landed = self.read(index)?;
        log::debug!(
            "Coef - 0x{:02x}: 0x{:04x} -> 0x{:04x} (mask 0x{:04x})",
            index,
            current,
            landed,
            mask
        );
        Ok(landed)
    }

    pub fn apply(&mut self, update: &CoefficientUpdate) -> Result<u16, Error<C::Error>> {
        self.update(update.index, update.mask, update.value)
    }
}
