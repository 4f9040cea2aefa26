use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::blocking::delay::DelayMs;

/// Synchronous command/response link to a codec. One verb in flight at a time.
pub trait VerbChannel {
    type Error: core::fmt::Debug;

    fn send(&mut self, command: u32) -> Result<u32, Self::Error>;
}

impl<T: VerbChannel + ?Sized> VerbChannel for &mut T {
    type Error = T::Error;

    fn send(&mut self, command: u32) -> Result<u32, Self::Error> {
        (**self).send(command)
    }
}

/// Cooperative shutdown request, only looked at between verb sequences.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// A stop signal that never fires.
pub struct Never;

impl StopSignal for Never {
    fn should_stop(&self) -> bool {
        false
    }
}

pub struct ChannelUnavailable<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: core::fmt::Debug> core::fmt::Debug for ChannelUnavailable<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ChannelUnavailable(after {} attempts: {:?})",
            self.attempts, self.last_error
        )
    }
}

/// Calls `open` until it succeeds, waiting `retry_ms` between attempts. Gives up only once
/// `stop` fires.
pub fn open_with_retry<T, E, F, D, S>(
    mut open: F,
    delay: &mut D,
    stop: &S,
    retry_ms: u32,
) -> Result<T, ChannelUnavailable<E>>
where
    E: core::fmt::Debug,
    F: FnMut() -> Result<T, E>,
    D: DelayMs<u32>,
    S: StopSignal + ?Sized,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match open() {
            Ok(channel) => {
                if attempts > 1 {
                    log::info!("Channel - Opened after {} attempts", attempts);
                }
                return Ok(channel);
            }
            Err(err) if stop.should_stop() => {
                return Err(ChannelUnavailable {
                    attempts,
                    last_error: err,
                });
            }
            Err(err) => {
                log::warn!(
                    "Channel - Error opening verb channel ({:?}). Retrying in {} ms...",
                    err,
                    retry_ms
                );
                delay.delay_ms(retry_ms);
            }
        }
    }
}
