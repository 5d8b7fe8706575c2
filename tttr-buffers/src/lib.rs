pub mod buffers;
pub mod errors;
pub mod tttr_tools;

/// A single click on a TCSPC channel, time tagged in units of the
/// instrument's time resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TTTRRecord {
    channel: i32,
    tof: u64,
}

impl TTTRRecord {
    pub fn new(channel: i32, tof: u64) -> Self {
        Self { channel, tof }
    }
}

pub trait Click {
    fn channel(&self) -> &i32;
    fn tof(&self) -> &u64;
}

impl Click for TTTRRecord {
    #[inline]
    fn channel(&self) -> &i32 {&self.channel}
    #[inline]
    fn tof(&self) -> &u64 {&self.tof}
}
