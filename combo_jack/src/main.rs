use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use structopt::StructOpt;

use combo_jack_lib::channel::{open_with_retry, ChannelUnavailable, VerbChannel};
use combo_jack_lib::coef::{self, CoefficientRegister};
use combo_jack_lib::message::Message;
use combo_jack_lib::monitor::{JackMonitor, Timing};
use combo_jack_lib::profile::PlugClassification;
use combo_jack_lib::verb::{ids, Response, Verb};

mod channel;
mod delay;
mod hwdep;
mod selector;
mod serial;

use channel::{Backend, SimulatedPlug};
use delay::StdDelay;
use selector::Mode;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Device not found")]
    DeviceNotFound,
    #[error("Unsupported hwdep interface version 0x{0:x}")]
    UnsupportedHwdepVersion(i32),
    #[error("The hwdep interface is not available on this platform ({})", .0.display())]
    HwdepUnsupported(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("Bad frame from bridge: {0}")]
    Framing(#[from] postcard::Error),
    #[error("Bridge refused verb 0x{0:08x}")]
    Nack(u32),
    #[error("Unexpected message from bridge: {0:?}")]
    UnexpectedMessage(Message),
    #[error("Codec rejected command 0x{command:08x} with response 0x{response:08x}")]
    RegisterWriteRejected { command: u32, response: u32 },
    #[error("Verb channel unavailable after {attempts} attempts")]
    ChannelUnavailable { attempts: u32, source: Box<Error> },
}

impl From<coef::Error<Error>> for Error {
    fn from(err: coef::Error<Error>) -> Self {
        match err {
            coef::Error::Channel(inner) => inner,
            coef::Error::RegisterWriteRejected { command, response } => {
                Error::RegisterWriteRejected { command, response }
            }
        }
    }
}

impl From<ChannelUnavailable<Error>> for Error {
    fn from(err: ChannelUnavailable<Error>) -> Self {
        Error::ChannelUnavailable {
            attempts: err.attempts,
            source: Box::new(err.last_error),
        }
    }
}

/// Accepts `0x`-prefixed hex or decimal.
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| format!("Invalid number {}", s))
}

fn parse_bounded(s: &str, max: u32) -> Result<u32, String> {
    let value = parse_number(s)?;
    if value > max {
        return Err(format!("{} is out of range (max 0x{:x})", s, max));
    }
    Ok(value)
}

fn parse_nid(s: &str) -> Result<u8, String> {
    parse_bounded(s, 0x7f).map(|v| v as u8)
}

fn parse_index(s: &str) -> Result<u8, String> {
    parse_bounded(s, 0xff).map(|v| v as u8)
}

fn parse_u16(s: &str) -> Result<u16, String> {
    parse_bounded(s, 0xffff).map(|v| v as u16)
}

/// A verb id, or its name as in `SET_PIN_WIDGET_CONTROL` / `get_pin_sense`.
fn parse_verb(s: &str) -> Result<u16, String> {
    match ids::verb_by_name(s) {
        Some(verb) => Ok(verb),
        None => parse_bounded(s, 0xfff)
            .map(|v| v as u16)
            .map_err(|_| format!("Unknown verb {}", s)),
    }
}

/// A payload, or a parameter name when the verb is `PARAMETERS`.
fn parse_param(verb: u16, s: &str) -> Result<u16, String> {
    if verb == ids::PARAMETERS {
        if let Some(param) = ids::parameter_by_name(s) {
            return Ok(param);
        }
    }
    parse_u16(s)
}

#[derive(Debug, StructOpt)]
#[structopt(
    author,
    about = "Configures the combo audio jack of an HDA codec that cannot tell headsets apart"
)]
struct Opt {
    /// hwdep device of the codec.
    #[structopt(
        short = "d",
        long = "device",
        parse(from_os_str),
        default_value = "/dev/snd/hwC0D0"
    )]
    device: PathBuf,

    /// Talk to the codec through a USB serial bridge.
    #[structopt(short = "s", long = "serial", conflicts_with = "simulate")]
    serial: bool,

    /// Serial port of the bridge. Found by VID/PID when not given.
    #[structopt(short = "p", long = "port", requires = "serial")]
    port: Option<String>,

    /// Use an in-memory codec instead of real hardware.
    #[structopt(long = "simulate")]
    simulate: bool,

    /// Plug inserted in the simulated jack: empty, trs, ctia or omtp.
    #[structopt(long = "plug", default_value = "ctia")]
    plug: SimulatedPlug,

    /// More logging. Repeat for trace output.
    #[structopt(short = "v", parse(from_occurrences))]
    verbose: u8,

    #[structopt(subcommand)]
    command: Commands,
}

impl Opt {
    fn backend(&self) -> Backend {
        if self.simulate {
            Backend::Simulated(self.plug)
        } else if self.serial {
            Backend::Serial(self.port.clone())
        } else {
            Backend::Hwdep(self.device.clone())
        }
    }
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "watch", about = "Polls the jack and configures whatever is plugged in")]
    Watch {
        /// auto, prompt, or a fixed classification such as headphones.
        #[structopt(short = "m", long = "mode", default_value = "auto")]
        mode: Mode,
        #[structopt(long = "poll-interval-ms", default_value = "1000")]
        poll_interval_ms: u32,
        #[structopt(long = "settle-ms", default_value = "300")]
        settle_ms: u32,
        #[structopt(long = "detect-settle-ms", default_value = "350")]
        detect_settle_ms: u32,
        /// Wait between attempts to open the codec.
        #[structopt(long = "retry-interval-ms", default_value = "1000")]
        retry_interval_ms: u32,
    },
    #[structopt(name = "verb", about = "Sends a single verb and prints the response")]
    Verb {
        #[structopt(parse(try_from_str = parse_nid))]
        nid: u8,
        #[structopt(parse(try_from_str = parse_verb))]
        verb: u16,
        param: String,
    },
    #[structopt(
        name = "coef",
        about = "Reads a vendor coefficient, or updates the bits selected by --mask"
    )]
    Coef {
        #[structopt(parse(try_from_str = parse_index))]
        index: u8,
        #[structopt(long = "mask", requires = "value", parse(try_from_str = parse_u16))]
        mask: Option<u16>,
        #[structopt(long = "value", parse(try_from_str = parse_u16))]
        value: Option<u16>,
    },
    #[structopt(name = "apply", about = "Applies the profile of one classification once")]
    Apply { classification: PlugClassification },
    #[structopt(name = "detect", about = "Checks whether the plugged headset is CTIA or OMTP")]
    Detect,
}

fn init_logger(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn send_verb<C: VerbChannel<Error = Error>>(
    channel: C,
    nid: u8,
    verb: u16,
    param: u16,
) -> Result<Response, Error> {
    if !Verb::is_long_payload(verb) && param > 0xff {
        log::warn!("Payload 0x{:x} truncated to 8 bits for verb 0x{:03x}", param, verb);
    }
    let verb = Verb::decode(Verb::new(nid, verb, param).encode());
    println!("nid = 0x{:x}, verb = 0x{:x}, param = 0x{:x}", verb.node, verb.verb, verb.payload);
    let mut coefs = CoefficientRegister::new(channel);
    Ok(coefs.send(verb)?)
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    init_logger(opt.verbose);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            log::info!("Received termination request");
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    let backend = opt.backend();
    log::debug!("Using {}", backend);

    match opt.command {
        Commands::Watch {
            mode,
            poll_interval_ms,
            settle_ms,
            detect_settle_ms,
            retry_interval_ms,
        } => {
            let timing = Timing {
                poll_interval_ms,
                settle_ms,
                detect_settle_ms,
            };
            let mut delay = StdDelay;
            let channel = match open_with_retry(
                || backend.open(),
                &mut delay,
                &*stop,
                retry_interval_ms,
            ) {
                Ok(channel) => channel,
                Err(err) => {
                    let err = Error::from(err);
                    log::info!("Giving up: {}", err);
                    return Err(err.into());
                }
            };

            let mut selector = mode.into_selector();
            let mut monitor = JackMonitor::new(channel, delay, timing);
            monitor.run(&mut *selector, &*stop);

            // The channel is closed when the monitor is dropped
            drop(monitor);
            log::info!("Exiting safely!");
        }
        Commands::Verb { nid, verb, param } => {
            let param = parse_param(verb, &param).map_err(anyhow::Error::msg)?;
            let response = send_verb(backend.open()?, nid, verb, param)?;
            println!("value = 0x{:x}", response.raw());
        }
        Commands::Coef { index, mask, value } => {
            let mut coefs = CoefficientRegister::new(backend.open()?);
            let current = match value {
                Some(value) => coefs.update(index, mask.unwrap_or(0xffff), value),
                None => coefs.read(index),
            }
            .map_err(Error::from)?;
            println!("coef 0x{:02x} = 0x{:04x}", index, current);
        }
        Commands::Apply { classification } => {
            let mut monitor = JackMonitor::new(backend.open()?, StdDelay, Timing::default());
            monitor.apply(classification).map_err(Error::from)?;
            println!("=> {}", classification.description());
        }
        Commands::Detect => {
            let mut monitor = JackMonitor::new(backend.open()?, StdDelay, Timing::default());
            let classification = monitor.classify().map_err(Error::from)?;
            println!("=> {}", classification.description());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(parse_number("0x1f"), Ok(0x1f));
        assert_eq!(parse_number("31"), Ok(31));
        assert_eq!(parse_number("0XFF"), Ok(0xff));
        assert!(parse_number("0xzz").is_err());
        assert!(parse_nid("0x80").is_err());
        assert_eq!(parse_index("0x8e"), Ok(0x8e));
        assert!(parse_u16("0x10000").is_err());
    }

    #[test]
    fn verbs_by_name_or_number() {
        assert_eq!(parse_verb("SET_PIN_WIDGET_CONTROL"), Ok(ids::SET_PIN_WIDGET_CONTROL));
        assert_eq!(parse_verb("get_pin_sense"), Ok(ids::GET_PIN_SENSE));
        assert_eq!(parse_verb("0x500"), Ok(0x500));
        assert!(parse_verb("SET_NOTHING").is_err());
        assert!(parse_verb("0x1000").is_err());
    }

    #[test]
    fn parameters_by_name_only_for_parameters_verb() {
        assert_eq!(
            parse_param(ids::PARAMETERS, "VENDOR_ID"),
            Ok(ids::param::VENDOR_ID)
        );
        assert!(parse_param(ids::SET_PIN_WIDGET_CONTROL, "VENDOR_ID").is_err());
        assert_eq!(parse_param(ids::SET_PIN_WIDGET_CONTROL, "0x24"), Ok(0x24));
    }

    #[test]
    fn codec_errors_flatten() {
        let err = Error::from(coef::Error::RegisterWriteRejected {
            command: 0x2005_004f,
            response: 1,
        });
        assert!(matches!(
            err,
            Error::RegisterWriteRejected {
                command: 0x2005_004f,
                response: 1
            }
        ));

        let err = Error::from(coef::Error::Channel(Error::Nack(0x2005_004f)));
        assert!(matches!(err, Error::Nack(0x2005_004f)));
    }

    #[test]
    fn command_line() {
        let opt = Opt::from_iter(&[
            "combo-jack",
            "--simulate",
            "--plug",
            "omtp",
            "watch",
            "--mode",
            "prompt",
        ]);
        assert!(matches!(opt.backend(), Backend::Simulated(SimulatedPlug::Omtp)));
        assert!(matches!(opt.command, Commands::Watch { mode: Mode::Prompt, .. }));

        let opt = Opt::from_iter(&["combo-jack", "--simulate", "watch"]);
        assert!(matches!(opt.backend(), Backend::Simulated(SimulatedPlug::Ctia)));
        assert!(matches!(opt.command, Commands::Watch { mode: Mode::Auto, .. }));

        let opt = Opt::from_iter(&["combo-jack", "--serial", "detect"]);
        assert!(matches!(opt.backend(), Backend::Serial(None)));
        assert!(matches!(opt.command, Commands::Detect));

        let opt = Opt::from_iter(&["combo-jack", "-s", "-p", "/dev/ttyACM0", "detect"]);
        assert!(matches!(opt.backend(), Backend::Serial(Some(ref port)) if port == "/dev/ttyACM0"));

        let opt = Opt::from_iter(&["combo-jack", "coef", "0x4f", "--mask", "0xfcc0", "--value", "0xd400"]);
        assert!(matches!(opt.backend(), Backend::Hwdep(_)));
        assert!(matches!(
            opt.command,
            Commands::Coef {
                index: 0x4f,
                mask: Some(0xfcc0),
                value: Some(0xd400)
            }
        ));

        assert!(Opt::from_iter_safe(&["combo-jack", "coef", "0x4f", "--mask", "0xfcc0"]).is_err());
    }

    #[test]
    fn verb_command_against_simulator() {
        let channel = Backend::Simulated(SimulatedPlug::Trs).open().unwrap();
        let response = send_verb(channel, 0x21, ids::GET_PIN_SENSE, 0).unwrap();
        assert!(response.presence_detected());
    }
}
