// Get verbs
pub const GET_STREAM_FORMAT: u16 = 0x0a00;
pub const GET_AMP_GAIN_MUTE: u16 = 0x0b00;
pub const GET_PROC_COEF: u16 = 0x0c00;
pub const GET_COEF_INDEX: u16 = 0x0d00;
pub const PARAMETERS: u16 = 0x0f00;
pub const GET_CONNECT_SEL: u16 = 0x0f01;
pub const GET_CONNECT_LIST: u16 = 0x0f02;
pub const GET_PROC_STATE: u16 = 0x0f03;
pub const GET_SDI_SELECT: u16 = 0x0f04;
pub const GET_POWER_STATE: u16 = 0x0f05;
pub const GET_CONV: u16 = 0x0f06;
pub const GET_PIN_WIDGET_CONTROL: u16 = 0x0f07;
pub const GET_UNSOLICITED_RESPONSE: u16 = 0x0f08;
pub const GET_PIN_SENSE: u16 = 0x0f09;
pub const GET_BEEP_CONTROL: u16 = 0x0f0a;
pub const GET_EAPD_BTLENABLE: u16 = 0x0f0c;
pub const GET_DIGI_CONVERT_1: u16 = 0x0f0d;
pub const GET_DIGI_CONVERT_2: u16 = 0x0f0e;
pub const GET_VOLUME_KNOB_CONTROL: u16 = 0x0f0f;
pub const GET_GPIO_DATA: u16 = 0x0f15;
pub const GET_GPIO_MASK: u16 = 0x0f16;
pub const GET_GPIO_DIRECTION: u16 = 0x0f17;
pub const GET_GPIO_WAKE_MASK: u16 = 0x0f18;
pub const GET_GPIO_UNSOLICITED_RSP_MASK: u16 = 0x0f19;
pub const GET_GPIO_STICKY_MASK: u16 = 0x0f1a;
pub const GET_CONFIG_DEFAULT: u16 = 0x0f1c;
pub const GET_SUBSYSTEM_ID: u16 = 0x0f20;

// Set verbs
pub const SET_STREAM_FORMAT: u16 = 0x0200;
pub const SET_AMP_GAIN_MUTE: u16 = 0x0300;
pub const SET_PROC_COEF: u16 = 0x0400;
pub const SET_COEF_INDEX: u16 = 0x0500;
pub const SET_CONNECT_SEL: u16 = 0x0701;
pub const SET_PROC_STATE: u16 = 0x0703;
pub const SET_SDI_SELECT: u16 = 0x0704;
pub const SET_POWER_STATE: u16 = 0x0705;
pub const SET_CHANNEL_STREAMID: u16 = 0x0706;
pub const SET_PIN_WIDGET_CONTROL: u16 = 0x0707;
pub const SET_UNSOLICITED_ENABLE: u16 = 0x0708;
pub const SET_PIN_SENSE: u16 = 0x0709;
pub const SET_BEEP_CONTROL: u16 = 0x070a;
pub const SET_EAPD_BTLENABLE: u16 = 0x070c;
pub const SET_DIGI_CONVERT_1: u16 = 0x070d;
pub const SET_DIGI_CONVERT_2: u16 = 0x070e;
pub const SET_VOLUME_KNOB_CONTROL: u16 = 0x070f;
pub const SET_GPIO_DATA: u16 = 0x0715;
pub const SET_GPIO_MASK: u16 = 0x0716;
pub const SET_GPIO_DIRECTION: u16 = 0x0717;
pub const SET_GPIO_WAKE_MASK: u16 = 0x0718;
pub const SET_GPIO_UNSOLICITED_RSP_MASK: u16 = 0x0719;
pub const SET_GPIO_STICKY_MASK: u16 = 0x071a;
pub const SET_CONFIG_DEFAULT_BYTES_0: u16 = 0x071c;
pub const SET_CONFIG_DEFAULT_BYTES_1: u16 = 0x071d;
pub const SET_CONFIG_DEFAULT_BYTES_2: u16 = 0x071e;
pub const SET_CONFIG_DEFAULT_BYTES_3: u16 = 0x071f;
pub const SET_CODEC_RESET: u16 = 0x07ff;

/// Parameter ids for the `PARAMETERS` verb.
pub mod param {
    pub const VENDOR_ID: u16 = 0x00;
    pub const SUBSYSTEM_ID: u16 = 0x01;
    pub const REV_ID: u16 = 0x02;
    pub const NODE_COUNT: u16 = 0x04;
    pub const FUNCTION_TYPE: u16 = 0x05;
    pub const AUDIO_FG_CAP: u16 = 0x08;
    pub const AUDIO_WIDGET_CAP: u16 = 0x09;
    pub const PCM: u16 = 0x0a;
    pub const STREAM: u16 = 0x0b;
    pub const PIN_CAP: u16 = 0x0c;
    pub const AMP_IN_CAP: u16 = 0x0d;
    pub const CONNLIST_LEN: u16 = 0x0e;
    pub const POWER_STATE: u16 = 0x0f;
    pub const PROC_CAP: u16 = 0x10;
    pub const GPIO_CAP: u16 = 0x11;
    pub const AMP_OUT_CAP: u16 = 0x12;
    pub const VOL_KNB_CAP: u16 = 0x13;

    pub(super) const NAMES: &[(&str, u16)] = &[
        ("VENDOR_ID", VENDOR_ID),
        ("SUBSYSTEM_ID", SUBSYSTEM_ID),
        ("REV_ID", REV_ID),
        ("NODE_COUNT", NODE_COUNT),
        ("FUNCTION_TYPE", FUNCTION_TYPE),
        ("AUDIO_FG_CAP", AUDIO_FG_CAP),
        ("AUDIO_WIDGET_CAP", AUDIO_WIDGET_CAP),
        ("PCM", PCM),
        ("STREAM", STREAM),
        ("PIN_CAP", PIN_CAP),
        ("AMP_IN_CAP", AMP_IN_CAP),
        ("CONNLIST_LEN", CONNLIST_LEN),
        ("POWER_STATE", POWER_STATE),
        ("PROC_CAP", PROC_CAP),
        ("GPIO_CAP", GPIO_CAP),
        ("AMP_OUT_CAP", AMP_OUT_CAP),
        ("VOL_KNB_CAP", VOL_KNB_CAP),
    ];
}

const VERB_NAMES: &[(&str, u16)] = &[
    ("GET_STREAM_FORMAT", GET_STREAM_FORMAT),
    ("GET_AMP_GAIN_MUTE", GET_AMP_GAIN_MUTE),
    ("GET_PROC_COEF", GET_PROC_COEF),
    ("GET_COEF_INDEX", GET_COEF_INDEX),
    ("PARAMETERS", PARAMETERS),
    ("GET_CONNECT_SEL", GET_CONNECT_SEL),
    ("GET_CONNECT_LIST", GET_CONNECT_LIST),
    ("GET_PROC_STATE", GET_PROC_STATE),
    ("GET_SDI_SELECT", GET_SDI_SELECT),
    ("GET_POWER_STATE", GET_POWER_STATE),
    ("GET_CONV", GET_CONV),
    ("GET_PIN_WIDGET_CONTROL", GET_PIN_WIDGET_CONTROL),
    ("GET_UNSOLICITED_RESPONSE", GET_UNSOLICITED_RESPONSE),
    ("GET_PIN_SENSE", GET_PIN_SENSE),
    ("GET_BEEP_CONTROL", GET_BEEP_CONTROL),
    ("GET_EAPD_BTLENABLE", GET_EAPD_BTLENABLE),
    ("GET_DIGI_CONVERT_1", GET_DIGI_CONVERT_1),
    ("GET_DIGI_CONVERT_2", GET_DIGI_CONVERT_2),
    ("GET_VOLUME_KNOB_CONTROL", GET_VOLUME_KNOB_CONTROL),
    ("GET_GPIO_DATA", GET_GPIO_DATA),
    ("GET_GPIO_MASK", GET_GPIO_MASK),
    ("GET_GPIO_DIRECTION", GET_GPIO_DIRECTION),
    ("GET_GPIO_WAKE_MASK", GET_GPIO_WAKE_MASK),
    ("GET_GPIO_UNSOLICITED_RSP_MASK", GET_GPIO_UNSOLICITED_RSP_MASK),
    ("GET_GPIO_STICKY_MASK", GET_GPIO_STICKY_MASK),
    ("GET_CONFIG_DEFAULT", GET_CONFIG_DEFAULT),
    ("GET_SUBSYSTEM_ID", GET_SUBSYSTEM_ID),
    ("SET_STREAM_FORMAT", SET_STREAM_FORMAT),
    ("SET_AMP_GAIN_MUTE", SET_AMP_GAIN_MUTE),
    ("SET_PROC_COEF", SET_PROC_COEF),
    ("SET_COEF_INDEX", SET_COEF_INDEX),
    ("SET_CONNECT_SEL", SET_CONNECT_SEL),
    ("SET_PROC_STATE", SET_PROC_STATE),
    ("SET_SDI_SELECT", SET_SDI_SELECT),
    ("SET_POWER_STATE", SET_POWER_STATE),
    ("SET_CHANNEL_STREAMID", SET_CHANNEL_STREAMID),
    ("SET_PIN_WIDGET_CONTROL", SET_PIN_WIDGET_CONTROL),
    ("SET_UNSOLICITED_ENABLE", SET_UNSOLICITED_ENABLE),
    ("SET_PIN_SENSE", SET_PIN_SENSE),
    ("SET_BEEP_CONTROL", SET_BEEP_CONTROL),
    ("SET_EAPD_BTLENABLE", SET_EAPD_BTLENABLE),
    ("SET_DIGI_CONVERT_1", SET_DIGI_CONVERT_1),
    ("SET_DIGI_CONVERT_2", SET_DIGI_CONVERT_2),
    ("SET_VOLUME_KNOB_CONTROL", SET_VOLUME_KNOB_CONTROL),
    ("SET_GPIO_DATA", SET_GPIO_DATA),
    ("SET_GPIO_MASK", SET_GPIO_MASK),
    ("SET_GPIO_DIRECTION", SET_GPIO_DIRECTION),
    ("SET_GPIO_WAKE_MASK", SET_GPIO_WAKE_MASK),
    ("SET_GPIO_UNSOLICITED_RSP_MASK", SET_GPIO_UNSOLICITED_RSP_MASK),
    ("SET_GPIO_STICKY_MASK", SET_GPIO_STICKY_MASK),
    ("SET_CONFIG_DEFAULT_BYTES_0", SET_CONFIG_DEFAULT_BYTES_0),
    ("SET_CONFIG_DEFAULT_BYTES_1", SET_CONFIG_DEFAULT_BYTES_1),
    ("SET_CONFIG_DEFAULT_BYTES_2", SET_CONFIG_DEFAULT_BYTES_2),
    ("SET_CONFIG_DEFAULT_BYTES_3", SET_CONFIG_DEFAULT_BYTES_3),
    ("SET_CODEC_RESET", SET_CODEC_RESET),
];

fn lookup(table: &[(&str, u16)], name: &str) -> Option<u16> {
    let name = name.strip_prefix("AC_VERB_").unwrap_or(name);
    let name = name.strip_prefix("AC_PAR_").unwrap_or(name);
    table
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
}

/// Looks a verb up by name, e.g. `SET_PIN_WIDGET_CONTROL` or `get_pin_sense`.
pub fn verb_by_name(name: &str) -> Option<u16> {
    lookup(VERB_NAMES, name)
}

pub fn parameter_by_name(name: &str) -> Option<u16> {
    lookup(param::NAMES, name)
}

pub fn verb_name(id: u16) -> Option<&'static str> {
    VERB_NAMES
        .iter()
        .find(|(_, known)| *known == id)
        .map(|(name, _)| *name)
}
