//! Per-plug reconfiguration sequences for the RT298 combo jack.
//!
//! Operations run top to bottom. Later pin and selector writes rely on the coefficient state
//! set before them, so the order here is part of the protocol.

use crate::coef::CoefficientUpdate;
use crate::verb::{ids, Verb};

pub mod nodes {
    pub const MIC_IN: u8 = 0x19;
    pub const LINE_IN: u8 = 0x1a;
    pub const HP_OUT: u8 = 0x21;
    pub const INPUT_SELECTOR: u8 = 0x22;
}

/// Coefficient indices used by the profiles.
pub mod coefs {
    /// Plug type and jack detect control.
    pub const PLUG_TYPE: u8 = 0x4f;
    /// Read back after a type check: bits 4-6 report the headset standard.
    pub const TYPE_DETECT: u8 = 0x50;
    pub const HEADSET_OUTPUT: u8 = 0x8e;

    pub const TYPE_FIELD_MASK: u16 = 0x0070;
    pub const CTIA_PATTERN: u16 = 0x0070;
}

// Pin widget control values
const PIN_IN_VREF_80: u16 = 0x24;
const PIN_IN_VREF_50: u16 = 0x21;
const PIN_DISABLED: u16 = 0x00;

// Input selector connections
const SELECT_HEADSET_MIC: u16 = 0x00;
const SELECT_LINE_IN: u16 = 0x02;
const SELECT_INTERNAL_MIC: u16 = 0x05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlugClassification {
    Unplugged,
    Headphones,
    LineIn,
    HeadsetCtia,
    HeadsetOmtp,
}

impl PlugClassification {
    pub const ALL: [PlugClassification; 5] = [
        PlugClassification::Unplugged,
        PlugClassification::Headphones,
        PlugClassification::LineIn,
        PlugClassification::HeadsetCtia,
        PlugClassification::HeadsetOmtp,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PlugClassification::Unplugged => "unplugged",
            PlugClassification::Headphones => "headphones",
            PlugClassification::LineIn => "line-in",
            PlugClassification::HeadsetCtia => "headset-ctia",
            PlugClassification::HeadsetOmtp => "headset-omtp",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            PlugClassification::Unplugged => "unplugged",
            PlugClassification::Headphones => "headphones plugged in",
            PlugClassification::LineIn => "line-in device plugged in",
            PlugClassification::HeadsetCtia => "headset (CTIA/iPhone) plugged in",
            PlugClassification::HeadsetOmtp => "headset (OMTP/Nokia) plugged in",
        }
    }

    pub fn profile(self) -> &'static PlugProfile {
        match self {
            PlugClassification::Unplugged => &UNPLUGGED,
            PlugClassification::Headphones => &HEADPHONES,
            PlugClassification::LineIn => &LINE_IN,
            PlugClassification::HeadsetCtia => &HEADSET_CTIA,
            PlugClassification::HeadsetOmtp => &HEADSET_OMTP,
        }
    }
}

impl core::fmt::Display for PlugClassification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for PlugClassification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unplugged" => Ok(PlugClassification::Unplugged),
            "headphones" | "hp" => Ok(PlugClassification::Headphones),
            "line-in" | "linein" => Ok(PlugClassification::LineIn),
            "headset-ctia" | "ctia" => Ok(PlugClassification::HeadsetCtia),
            "headset-omtp" | "omtp" => Ok(PlugClassification::HeadsetOmtp),
            _ => Err(UnknownClassification),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownClassification;

impl core::fmt::Display for UnknownClassification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(
            "expected one of unplugged, headphones, line-in, headset-ctia, headset-omtp",
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Coef(CoefficientUpdate),
    /// Raw pin or selector verb. The response carries no status and is ignored.
    Verb(Verb),
    /// Wait for the analog sense path to stabilize.
    Settle,
    /// Bring a node to D0 if its power state reads anything else.
    PowerUp(u8),
}

const fn coef(index: u8, mask: u16, value: u16) -> Op {
    Op::Coef(CoefficientUpdate::new(index, mask, value))
}

const fn pin_control(node: u8, value: u16) -> Op {
    Op::Verb(Verb::new(node, ids::SET_PIN_WIDGET_CONTROL, value))
}

const fn select_input(connection: u16) -> Op {
    Op::Verb(Verb::new(nodes::INPUT_SELECTOR, ids::SET_CONNECT_SEL, connection))
}

#[derive(Debug)]
pub struct PlugProfile {
    pub classification: PlugClassification,
    pub ops: &'static [Op],
}

impl PlugProfile {
    pub fn coefficient_updates(&self) -> impl Iterator<Item = &CoefficientUpdate> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Op::Coef(update) => Some(update),
            _ => None,
        })
    }

    pub fn settles(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, Op::Settle))
    }
}

pub static UNPLUGGED: PlugProfile = PlugProfile {
    classification: PlugClassification::Unplugged,
    ops: &[
        coef(coefs::PLUG_TYPE, 0xfcc0, 0xc400),
        coef(0x50, 0x2000, 0x2000),
        coef(0x56, 0x0006, 0x0006),
        coef(0x66, 0x0008, 0),
        coef(0x67, 0x2000, 0),
        select_input(SELECT_INTERNAL_MIC),
    ],
};

pub static HEADPHONES: PlugProfile = PlugProfile {
    classification: PlugClassification::Headphones,
    ops: &[
        // TRS type
        coef(coefs::PLUG_TYPE, 0xfcc0, 0xc400),
        pin_control(nodes::MIC_IN, PIN_IN_VREF_80),
        coef(0x50, 0x2000, 0x2000),
        coef(0x56, 0x0006, 0x0006),
        coef(0x66, 0x0008, 0),
        coef(0x67, 0x2000, 0),
    ],
};

pub static LINE_IN: PlugProfile = PlugProfile {
    classification: PlugClassification::LineIn,
    ops: &[
        coef(coefs::PLUG_TYPE, 0x000c, 0),
        pin_control(nodes::HP_OUT, PIN_DISABLED),
        coef(0x50, 0x2000, 0),
        coef(0x56, 0x0006, 0),
        coef(coefs::PLUG_TYPE, 0xfcc0, 0xc400),
        coef(0x66, 0x0008, 0x0008),
        coef(0x67, 0x2000, 0x2000),
        pin_control(nodes::LINE_IN, PIN_IN_VREF_50),
        // the line-in pin is frequently left in D3
        Op::PowerUp(nodes::LINE_IN),
        select_input(SELECT_LINE_IN),
    ],
};

pub static HEADSET_CTIA: PlugProfile = PlugProfile {
    classification: PlugClassification::HeadsetCtia,
    ops: &[
        coef(coefs::HEADSET_OUTPUT, 0x0070, 0x0020),
        coef(coefs::PLUG_TYPE, 0xfcc0, 0xd400),
        Op::Settle,
        coef(0x50, 0x2000, 0x2000),
        coef(0x56, 0x0006, 0x0006),
        coef(0x66, 0x0008, 0),
        coef(0x67, 0x2000, 0),
        select_input(SELECT_HEADSET_MIC),
    ],
};

pub static HEADSET_OMTP: PlugProfile = PlugProfile {
    classification: PlugClassification::HeadsetOmtp,
    ops: &[
        coef(coefs::HEADSET_OUTPUT, 0x0070, 0x0010),
        coef(coefs::PLUG_TYPE, 0xfcc0, 0xe400),
        Op::Settle,
        coef(0x50, 0x2000, 0x2000),
        coef(0x56, 0x0006, 0x0006),
        coef(0x66, 0x0008, 0),
        coef(0x67, 0x2000, 0),
        select_input(SELECT_HEADSET_MIC),
    ],
};

/// Arms the headset type check. The type field of [`coefs::TYPE_DETECT`] is valid once the
/// detect settle delay has passed.
pub static HEADSET_DETECT: &[Op] = &[
    // headset output enable
    coef(coefs::HEADSET_OUTPUT, 0x0070, 0x0020),
    pin_control(nodes::MIC_IN, PIN_IN_VREF_80),
    // check type
    coef(coefs::PLUG_TYPE, 0xfcc0, 0xd400),
];

/// Maps the type detect coefficient to a headset standard.
pub const fn headset_from_type_detect(value: u16) -> PlugClassification {
    if value & coefs::TYPE_FIELD_MASK == coefs::CTIA_PATTERN {
        PlugClassification::HeadsetCtia
    } else {
        PlugClassification::HeadsetOmtp
    }
}
