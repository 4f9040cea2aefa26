//! Jack sense state machine.
//!
//! The monitor polls the headphone pin's sense verb, asks a [`Selector`] what was plugged in,
//! applies the matching profile, and restores the unplugged profile once the plug is removed.

use embedded_hal::blocking::delay::DelayMs;

use crate::channel::{StopSignal, VerbChannel};
use crate::coef::{self, CoefficientRegister};
use crate::profile::{
    coefs, headset_from_type_detect, nodes, Op, PlugClassification, HEADSET_DETECT,
};
use crate::verb::{ids, Response, Verb};

pub type Error<E> = coef::Error<E>;

/// Delays used by the monitor, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval_ms: u32,
    /// Settle time inside the headset profiles.
    pub settle_ms: u32,
    /// Settle time between arming the type check and reading it back.
    pub detect_settle_ms: u32,
}

impl Timing {
    pub const POLL_INTERVAL_MS: u32 = 1000;
    pub const SETTLE_MS: u32 = 300;
    pub const DETECT_SETTLE_MS: u32 = 350;

    pub const fn immediate() -> Self {
        Self {
            poll_interval_ms: 0,
            settle_ms: 0,
            detect_settle_ms: 0,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::POLL_INTERVAL_MS,
            settle_ms: Self::SETTLE_MS,
            detect_settle_ms: Self::DETECT_SETTLE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    Idle,
    Plugged(PlugClassification),
    /// A plug is present but the selector declined to configure it.
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    NotReady,
    Unplugged,
    Plugged,
}

impl From<Response> for Sense {
    fn from(response: Response) -> Self {
        if response.is_not_ready() {
            Sense::NotReady
        } else if response.presence_detected() {
            Sense::Plugged
        } else {
            Sense::Unplugged
        }
    }
}

/// What to do with a freshly sensed plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Fixed(PlugClassification),
    /// Run the CTIA/OMTP type check.
    AutoDetect,
    Dismiss,
}

pub trait Selector {
    fn select(&mut self) -> Selection;
}

impl Selector for Selection {
    fn select(&mut self) -> Selection {
        *self
    }
}

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    NothingPlugged,
    SenseNotReady,
    Configured(PlugClassification),
    Dismissed,
    StillPlugged,
    /// The plug went away. The unplugged profile was applied unless the plug had been dismissed.
    Unplugged,
}

pub struct JackMonitor<C, D>
where
    C: VerbChannel,
    D: DelayMs<u32>,
{
    codec: CoefficientRegister<C>,
    delay: D,
    timing: Timing,
    sense_node: u8,
    current_state: State,
}

impl<C, D> JackMonitor<C, D>
where
    C: VerbChannel,
    D: DelayMs<u32>,
{
    /// The unplugged profile is assumed to be active already.
    pub fn new(channel: C, delay: D, timing: Timing) -> Self {
        Self {
            codec: CoefficientRegister::new(channel),
            delay,
            timing,
            sense_node: nodes::HP_OUT,
            current_state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.current_state
    }

    pub fn codec_mut(&mut self) -> &mut CoefficientRegister<C> {
        &mut self.codec
    }

    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    pub fn into_inner(self) -> (C, D) {
        (self.codec.into_inner(), self.delay)
    }

    pub fn sense(&mut self) -> Result<Sense, Error<C::Error>> {
        let response = self
            .codec
            .send(Verb::new(self.sense_node, ids::GET_PIN_SENSE, 0x00))?;
        Ok(Sense::from(response))
    }

    /// Arms the type check, waits for it to settle and reads back the headset standard.
    pub fn classify(&mut self) -> Result<PlugClassification, Error<C::Error>> {
        log::info!("JackMonitor - Headset plugged in. Checking type...");
        self.run_ops(HEADSET_DETECT)?;
        self.delay.delay_ms(self.timing.detect_settle_ms);

        let value = self.codec.read(coefs::TYPE_DETECT)?;
        let classification = headset_from_type_detect(value);
        log::debug!(
            "JackMonitor - Type detect 0x{:04x} => {}",
            value,
            classification
        );
        Ok(classification)
    }

    /// Runs a profile in order. The first failure aborts the rest; nothing is rolled back.
    pub fn apply(&mut self, classification: PlugClassification) -> Result<(), Error<C::Error>> {
        log::info!("JackMonitor - Jack status: {}", classification.description());
        self.run_ops(classification.profile().ops)
    }

    fn run_ops(&mut self, ops: &[Op]) -> Result<(), Error<C::Error>> {
        for op in ops {
            match op {
                Op::Coef(update) => {
                    self.codec.apply(update)?;
                }
                Op::Verb(verb) => {
                    self.codec.send(*verb)?;
                }
                Op::Settle => self.delay.delay_ms(self.timing.settle_ms),
                Op::PowerUp(node) => {
                    let power = self.codec.send(Verb::new(*node, ids::GET_POWER_STATE, 0))?;
                    if power.raw() != 0 {
                        log::debug!(
                            "JackMonitor - Node 0x{:02x} in power state 0x{:x}, waking",
                            node,
                            power.raw()
                        );
                        self.codec.send(Verb::new(*node, ids::SET_POWER_STATE, 0))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// One poll of the jack. Does not sleep between polls.
    pub fn step<S>(&mut self, selector: &mut S) -> Result<Event, Error<C::Error>>
    where
        S: Selector + ?Sized,
    {
        let sense = self.sense()?;

        match (self.current_state, sense) {
            (State::Idle, Sense::NotReady) => {
                log::warn!("JackMonitor - Jack not ready. Checking again...");
                Ok(Event::SenseNotReady)
            }
            (_, Sense::NotReady) => Ok(Event::SenseNotReady),
            (State::Idle, Sense::Unplugged) => Ok(Event::NothingPlugged),
            (State::Idle, Sense::Plugged) => {
                log::info!("JackMonitor - Jack sense detected");
                let classification = match selector.select() {
                    Selection::Fixed(classification) => classification,
                    Selection::AutoDetect => match self.classify() {
                        Ok(classification) => classification,
                        Err(err) => {
                            // Leave the plug alone until it is pulled out
                            self.trigger_transition(State::Dismissed);
                            return Err(err);
                        }
                    },
                    Selection::Dismiss => {
                        log::info!("JackMonitor - Selection dismissed");
                        self.trigger_transition(State::Dismissed);
                        return Ok(Event::Dismissed);
                    }
                };

                // A profile that fails halfway stays partially applied
                self.trigger_transition(State::Plugged(classification));
                self.apply(classification)?;
                Ok(Event::Configured(classification))
            }
            (State::Plugged(_), Sense::Plugged) | (State::Dismissed, Sense::Plugged) => {
                Ok(Event::StillPlugged)
            }
            (State::Plugged(_), Sense::Unplugged) => {
                log::info!("JackMonitor - Unplugged");
                self.trigger_transition(State::Idle);
                self.apply(PlugClassification::Unplugged)?;
                Ok(Event::Unplugged)
            }
            (State::Dismissed, Sense::Unplugged) => {
                self.trigger_transition(State::Idle);
                Ok(Event::Unplugged)
            }
        }
    }

    /// Polls until `stop` fires. Errors are logged and polling continues; the configuration in
    /// place when `stop` fires is left as is.
    pub fn run<S, X>(&mut self, selector: &mut S, stop: &X) -> State
    where
        S: Selector + ?Sized,
        X: StopSignal + ?Sized,
    {
        log::info!(
            "JackMonitor - Watching jack on node 0x{:02x}, polling every {} ms",
            self.sense_node,
            self.timing.poll_interval_ms
        );

        while !stop.should_stop() {
            match self.step(selector) {
                Ok(event) => log::trace!("JackMonitor - {:?}", event),
                Err(err) => log::error!(
                    "JackMonitor - {} (state {:?}), retrying on next poll",
                    err,
                    self.current_state
                ),
            }

            if stop.should_stop() {
                break;
            }
            self.delay.delay_ms(self.timing.poll_interval_ms);
        }

        log::info!("JackMonitor - Stopped in state {:?}", self.current_state);
        self.current_state
    }

    fn trigger_transition(&mut self, state: State) {
        log::info!(
            "JackMonitor - State switch: {:?} => {:?}",
            self.current_state,
            state
        );
        self.current_state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{HeadsetWiring, SimulatedCodec};
    use crate::testing::{NoDelay, Recorder};
    use core::cell::Cell;

    type Monitor = JackMonitor<Recorder<SimulatedCodec>, NoDelay>;

    fn monitor() -> Monitor {
        JackMonitor::new(
            Recorder::new(SimulatedCodec::new()),
            NoDelay::default(),
            Timing::default(),
        )
    }

    fn sim(monitor: &mut Monitor) -> &mut SimulatedCodec {
        &mut monitor.codec_mut().channel_mut().inner
    }

    fn recorder(monitor: &mut Monitor) -> &mut Recorder<SimulatedCodec> {
        monitor.codec_mut().channel_mut()
    }

    /// Coefficient indices selected, with the reselects of one update collapsed.
    fn selected_indices(recorder: &Recorder<SimulatedCodec>) -> Vec<u8> {
        let mut indices: Vec<u8> = Vec::new();
        for verb in recorder.decoded() {
            if verb.verb == ids::SET_COEF_INDEX && indices.last() != Some(&(verb.payload as u8)) {
                indices.push(verb.payload as u8);
            }
        }
        indices
    }

    fn selector_writes(recorder: &Recorder<SimulatedCodec>, connection: u16) -> usize {
        recorder
            .decoded()
            .iter()
            .filter(|verb| **verb == Verb::new(0x22, ids::SET_CONNECT_SEL, connection))
            .count()
    }

    struct StopAfter {
        checks: Cell<u32>,
        limit: u32,
    }

    impl StopAfter {
        fn new(limit: u32) -> Self {
            Self {
                checks: Cell::new(0),
                limit,
            }
        }
    }

    impl StopSignal for StopAfter {
        fn should_stop(&self) -> bool {
            self.checks.set(self.checks.get() + 1);
            self.checks.get() >= self.limit
        }
    }

    #[test]
    fn unplugged_poll_stays_idle() {
        let mut monitor = monitor();

        let event = monitor.step(&mut Selection::AutoDetect).unwrap();

        assert_eq!(event, Event::NothingPlugged);
        assert_eq!(monitor.state(), State::Idle);
        assert_eq!(recorder(&mut monitor).sent, vec![0x210f_0900]);
    }

    #[test]
    fn headphone_insert_applies_headphone_profile() {
        let mut monitor = monitor();
        sim(&mut monitor).set_pin_sense(0x8000_0000);

        let event = monitor
            .step(&mut Selection::Fixed(PlugClassification::Headphones))
            .unwrap();

        assert_eq!(event, Event::Configured(PlugClassification::Headphones));
        assert_eq!(
            monitor.state(),
            State::Plugged(PlugClassification::Headphones)
        );
        assert_eq!(
            selected_indices(recorder(&mut monitor)),
            vec![0x4f, 0x50, 0x56, 0x66, 0x67]
        );

        let sim = sim(&mut monitor);
        assert_eq!(sim.coef(0x4f) & 0xfcc0, 0xc400);
        assert_eq!(sim.coef(0x50) & 0x2000, 0x2000);
        assert_eq!(sim.coef(0x56) & 0x0006, 0x0006);
        assert_eq!(sim.pin_control(0x19), 0x24);
        assert!(monitor.delay_mut().calls.is_empty());
    }

    #[test]
    fn unplug_restores_unplugged_profile_once() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::None);
        monitor
            .step(&mut Selection::Fixed(PlugClassification::LineIn))
            .unwrap();
        assert_eq!(sim(&mut monitor).connection(0x22), 0x02);
        assert_eq!(sim(&mut monitor).power_state(0x1a), 0);

        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::StillPlugged
        );

        sim(&mut monitor).unplug();
        recorder(&mut monitor).clear();
        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::Unplugged
        );
        assert_eq!(monitor.state(), State::Idle);
        assert_eq!(sim(&mut monitor).connection(0x22), 0x05);
        assert_eq!(sim(&mut monitor).coef(0x66) & 0x0008, 0);

        monitor.step(&mut Selection::AutoDetect).unwrap();
        monitor.step(&mut Selection::AutoDetect).unwrap();
        assert_eq!(selector_writes(recorder(&mut monitor), 0x05), 1);
        assert_eq!(monitor.state(), State::Idle);
    }

    #[test]
    fn ctia_headset_is_detected() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::Ctia);

        let event = monitor.step(&mut Selection::AutoDetect).unwrap();

        assert_eq!(event, Event::Configured(PlugClassification::HeadsetCtia));
        assert_eq!(monitor.delay_mut().calls, vec![350, 300]);
        assert_eq!(sim(&mut monitor).coef(0x8e) & 0x0070, 0x0020);
        assert_eq!(sim(&mut monitor).connection(0x22), 0x00);
    }

    #[test]
    fn other_type_fields_are_omtp() {
        for wiring in [HeadsetWiring::Omtp, HeadsetWiring::None] {
            let mut monitor = monitor();
            sim(&mut monitor).plug(wiring);

            let event = monitor.step(&mut Selection::AutoDetect).unwrap();

            assert_eq!(event, Event::Configured(PlugClassification::HeadsetOmtp));
            assert_eq!(sim(&mut monitor).coef(0x8e) & 0x0070, 0x0010);
            assert_eq!(sim(&mut monitor).coef(0x4f) & 0xfcc0, 0xe400);
        }
    }

    #[test]
    fn not_ready_sentinel_is_retried() {
        let mut monitor = monitor();
        sim(&mut monitor).set_pin_sense(0xffff_ffff);

        let event = monitor.step(&mut Selection::AutoDetect).unwrap();

        assert_eq!(event, Event::SenseNotReady);
        assert_eq!(monitor.state(), State::Idle);
        assert_eq!(recorder(&mut monitor).sent.len(), 1);

        sim(&mut monitor).set_pin_sense(0x8000_0000);
        assert_eq!(
            monitor
                .step(&mut Selection::Fixed(PlugClassification::Headphones))
                .unwrap(),
            Event::Configured(PlugClassification::Headphones)
        );
    }

    #[test]
    fn not_ready_while_plugged_keeps_configuration() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::None);
        monitor
            .step(&mut Selection::Fixed(PlugClassification::Headphones))
            .unwrap();

        sim(&mut monitor).set_pin_sense(0xffff_ffff);
        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::SenseNotReady
        );
        assert_eq!(
            monitor.state(),
            State::Plugged(PlugClassification::Headphones)
        );
    }

    #[test]
    fn rejected_register_write_aborts_profile() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::None);
        sim(&mut monitor).reject_selects(true);

        let result = monitor.step(&mut Selection::Fixed(PlugClassification::Headphones));

        assert!(matches!(
            result,
            Err(Error::RegisterWriteRejected {
                command: 0x2005_004f,
                ..
            })
        ));
        assert_eq!(
            monitor.state(),
            State::Plugged(PlugClassification::Headphones)
        );
        // sense poll and the rejected select only
        assert_eq!(recorder(&mut monitor).sent.len(), 2);
        assert_eq!(sim(&mut monitor).coef_writes(), 0);
    }

    #[test]
    fn failed_profile_is_not_retried_while_plugged() {
        struct Counting {
            calls: u32,
        }

        impl Selector for Counting {
            fn select(&mut self) -> Selection {
                self.calls += 1;
                Selection::Fixed(PlugClassification::Headphones)
            }
        }

        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::None);
        sim(&mut monitor).reject_selects(true);
        let mut selector = Counting { calls: 0 };

        assert!(monitor.step(&mut selector).is_err());
        for _ in 0..2 {
            assert_eq!(monitor.step(&mut selector).unwrap(), Event::StillPlugged);
        }

        assert_eq!(selector.calls, 1);
        assert_eq!(
            monitor.state(),
            State::Plugged(PlugClassification::Headphones)
        );
    }

    #[test]
    fn failed_unplug_profile_is_attempted_once() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::None);
        monitor
            .step(&mut Selection::Fixed(PlugClassification::LineIn))
            .unwrap();

        sim(&mut monitor).unplug();
        sim(&mut monitor).reject_selects(true);
        recorder(&mut monitor).clear();

        assert!(matches!(
            monitor.step(&mut Selection::AutoDetect),
            Err(Error::RegisterWriteRejected { .. })
        ));
        assert_eq!(monitor.state(), State::Idle);

        for _ in 0..2 {
            assert_eq!(
                monitor.step(&mut Selection::AutoDetect).unwrap(),
                Event::NothingPlugged
            );
        }
        let selects = recorder(&mut monitor)
            .decoded()
            .iter()
            .filter(|verb| verb.verb == ids::SET_COEF_INDEX)
            .count();
        assert_eq!(selects, 1);
    }

    #[test]
    fn failed_type_check_waits_for_unplug() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::Ctia);
        sim(&mut monitor).reject_selects(true);

        assert!(monitor.step(&mut Selection::AutoDetect).is_err());
        assert_eq!(monitor.state(), State::Dismissed);
        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::StillPlugged
        );
        assert!(monitor.delay_mut().calls.is_empty());
    }

    #[test]
    fn dismissed_plug_is_left_alone() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::Ctia);

        assert_eq!(
            monitor.step(&mut Selection::Dismiss).unwrap(),
            Event::Dismissed
        );
        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::StillPlugged
        );

        sim(&mut monitor).unplug();
        assert_eq!(
            monitor.step(&mut Selection::AutoDetect).unwrap(),
            Event::Unplugged
        );
        assert_eq!(monitor.state(), State::Idle);
        assert_eq!(sim(&mut monitor).coef_writes(), 0);
    }

    #[test]
    fn run_stops_without_touching_configuration() {
        let mut monitor = monitor();
        sim(&mut monitor).plug(HeadsetWiring::Ctia);

        // top of loop, after first poll, top of loop, after second poll
        let state = monitor.run(&mut Selection::AutoDetect, &StopAfter::new(4));

        assert_eq!(state, State::Plugged(PlugClassification::HeadsetCtia));
        assert_eq!(monitor.delay_mut().calls, vec![350, 300, 1000]);
    }

    #[test]
    fn run_keeps_polling_after_a_rejected_write() {
        struct RejectFirstSelect {
            sim: SimulatedCodec,
            rejected: bool,
        }

        impl VerbChannel for RejectFirstSelect {
            type Error = core::convert::Infallible;

            fn send(&mut self, command: u32) -> Result<u32, Self::Error> {
                if !self.rejected && Verb::decode(command).verb == ids::SET_COEF_INDEX {
                    self.rejected = true;
                    return Ok(Response::NOT_READY);
                }
                self.sim.send(command)
            }
        }

        let mut sim = SimulatedCodec::new();
        sim.plug(HeadsetWiring::None);
        let mut monitor = JackMonitor::new(
            RejectFirstSelect {
                sim,
                rejected: false,
            },
            NoDelay::default(),
            Timing::immediate(),
        );

        let state = monitor.run(
            &mut Selection::Fixed(PlugClassification::Headphones),
            &StopAfter::new(4),
        );

        assert_eq!(state, State::Plugged(PlugClassification::Headphones));
        // the aborted profile is left as is
        assert_eq!(monitor.into_inner().0.sim.coef_writes(), 0);
    }

    #[test]
    fn stop_before_first_poll_sends_nothing() {
        let mut monitor = monitor();
        let stop = core::sync::atomic::AtomicBool::new(true);

        assert_eq!(monitor.run(&mut Selection::AutoDetect, &stop), State::Idle);
        assert!(recorder(&mut monitor).sent.is_empty());
    }
}
