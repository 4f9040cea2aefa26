use embedded_hal::blocking::delay::DelayMs;

/// Blocking delay backed by the OS scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayMs<u32> for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms.into()));
    }
}
