//! HD-audio verb words as carried by the hwdep verb interface.
//!
//! A verb word is `node << 24 | verb << 8 | payload`. Verbs whose top nibble is `0x7` or `0xf`
//! take a 12 bit id and an 8 bit payload. Every other verb is a 4 bit verb (`0x2xx` to `0xdxx`
//! with a zero low byte) carrying a 16 bit payload.

pub mod ids;

pub const NODE_MASK: u8 = 0x7f;
pub const VERB_MASK: u16 = 0x0fff;

/// A single codec command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Verb {
    pub node: u8,
    pub verb: u16,
    pub payload: u16,
}

impl Verb {
    pub const fn new(node: u8, verb: u16, payload: u16) -> Self {
        Self {
            node,
            verb,
            payload,
        }
    }

    /// Returns true for 4 bit verbs, which carry a 16 bit payload.
    pub const fn is_long_payload(verb: u16) -> bool {
        let nibble = (verb >> 8) & 0xf;
        nibble != 0x7 && nibble != 0xf
    }

    pub const fn encode(&self) -> u32 {
        encode(self.node, self.verb, self.payload)
    }

    pub const fn decode(word: u32) -> Self {
        let node = ((word >> 24) as u8) & NODE_MASK;
        let nibble = (word >> 16) & 0xf;
        if nibble == 0x7 || nibble == 0xf {
            Self {
                node,
                verb: ((word >> 8) & 0xfff) as u16,
                payload: (word & 0xff) as u16,
            }
        } else {
            Self {
                node,
                verb: (nibble << 8) as u16,
                payload: (word & 0xffff) as u16,
            }
        }
    }
}

impl core::fmt::Display for Verb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match ids::verb_name(self.verb) {
            Some(name) => write!(
                f,
                "nid=0x{:02x} {} payload=0x{:x}",
                self.node, name, self.payload
            ),
            None => write!(
                f,
                "nid=0x{:02x} verb=0x{:03x} payload=0x{:x}",
                self.node, self.verb, self.payload
            ),
        }
    }
}

/// Packs a verb word. Fields are truncated to their widths and never validated.
pub const fn encode(node: u8, verb: u16, payload: u16) -> u32 {
    let node = ((node & NODE_MASK) as u32) << 24;
    if Verb::is_long_payload(verb) {
        node | (((verb & 0x0f00) as u32) << 8) | payload as u32
    } else {
        node | (((verb & VERB_MASK) as u32) << 8) | (payload & 0xff) as u32
    }
}

/// A raw codec response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response(pub u32);

impl Response {
    /// Returned while the codec (or the link to it) is not ready.
    pub const NOT_READY: u32 = 0xffff_ffff;
    pub const PRESENCE_DETECT: u32 = 1 << 31;
    pub const SUCCESS: u32 = 0;

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_not_ready(self) -> bool {
        self.0 == Self::NOT_READY
    }

    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Presence bit of a pin sense response. Also set in the not-ready sentinel.
    pub const fn presence_detected(self) -> bool {
        (self.0 & Self::PRESENCE_DETECT) != 0
    }
}
