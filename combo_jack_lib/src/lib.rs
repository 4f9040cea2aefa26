#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod coef;
pub mod monitor;
pub mod profile;
pub mod sim;
pub mod verb;

/// Frames exchanged with a serial verb bridge.
pub mod message {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum Message {
        /// Host -> bridge: an encoded verb word.
        Verb(u32),
        /// Bridge -> host: the codec's response to the last verb.
        Response(u32),
        /// Bridge -> host: the codec link did not accept the verb.
        Nack,
        Ping,
        Ack,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::channel::VerbChannel;
    use crate::verb::Verb;

    /// Wraps a channel and keeps every command sent through it.
    pub struct Recorder<C> {
        pub inner: C,
        pub sent: Vec<u32>,
    }

    impl<C: VerbChannel> Recorder<C> {
        pub fn new(inner: C) -> Self {
            Self {
                inner,
                sent: Vec::new(),
            }
        }

        pub fn decoded(&self) -> Vec<Verb> {
            self.sent.iter().map(|word| Verb::decode(*word)).collect()
        }

        pub fn clear(&mut self) {
            self.sent.clear();
        }
    }

    impl<C: VerbChannel> VerbChannel for Recorder<C> {
        type Error = C::Error;

        fn send(&mut self, command: u32) -> Result<u32, Self::Error> {
            self.sent.push(command);
            self.inner.send(command)
        }
    }

    /// Replies from a fixed script, then with zero.
    pub struct Scripted {
        pub replies: Vec<u32>,
    }

    impl VerbChannel for Scripted {
        type Error = ();

        fn send(&mut self, _command: u32) -> Result<u32, ()> {
            if self.replies.is_empty() {
                Ok(0)
            } else {
                Ok(self.replies.remove(0))
            }
        }
    }

    #[derive(Default)]
    pub struct NoDelay {
        pub total_ms: u32,
        pub calls: Vec<u32>,
    }

    impl embedded_hal::blocking::delay::DelayMs<u32> for NoDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
            self.calls.push(ms);
        }
    }
}
