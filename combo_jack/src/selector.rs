//! Front ends that decide what to do with a freshly sensed plug.

use std::io::{BufRead, Write};
use std::str::FromStr;

use combo_jack_lib::monitor::{Selection, Selector};
use combo_jack_lib::profile::PlugClassification;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Always run the CTIA/OMTP type check.
    Auto,
    /// Ask on the terminal for every insertion.
    Prompt,
    Fixed(PlugClassification),
}

impl FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" | "headset" => Ok(Mode::Auto),
            "prompt" | "menu" => Ok(Mode::Prompt),
            s => s
                .parse()
                .map(Mode::Fixed)
                .map_err(|_| format!("Invalid mode {}", s)),
        }
    }
}

impl Mode {
    pub fn into_selector(self) -> Box<dyn Selector> {
        match self {
            Mode::Auto => Box::new(Selection::AutoDetect),
            Mode::Fixed(classification) => Box::new(Selection::Fixed(classification)),
            Mode::Prompt => Box::new(Prompt::new(
                std::io::BufReader::new(std::io::stdin()),
                std::io::stderr(),
            )),
        }
    }
}

/// Maps a menu answer to a selection. Anything unrecognized dismisses.
pub fn parse_choice(answer: &str) -> Selection {
    match answer.trim() {
        "1" => Selection::Fixed(PlugClassification::Headphones),
        "2" => Selection::Fixed(PlugClassification::LineIn),
        "3" => Selection::AutoDetect,
        "4" => Selection::Fixed(PlugClassification::HeadsetCtia),
        "5" => Selection::Fixed(PlugClassification::HeadsetOmtp),
        _ => Selection::Dismiss,
    }
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self) -> std::io::Result<Selection> {
        writeln!(self.output, "Jack sense detected! What did you plug in?")?;
        writeln!(self.output, "  1) Headphones")?;
        writeln!(self.output, "  2) Line-in")?;
        writeln!(self.output, "  3) Headset (detect type)")?;
        writeln!(self.output, "  4) Headset, CTIA")?;
        writeln!(self.output, "  5) Headset, OMTP")?;
        write!(self.output, "Choice (anything else to dismiss): ")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(parse_choice(&answer))
    }
}

impl<R: BufRead, W: Write> Selector for Prompt<R, W> {
    fn select(&mut self) -> Selection {
        match self.ask() {
            Ok(selection) => selection,
            Err(err) => {
                log::warn!("Prompt - Could not read selection: {}", err);
                Selection::Dismiss
            }
        }
    }
}
