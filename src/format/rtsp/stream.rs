use log::debug;

/// Running statistics of one RTP channel, fed with every emitted unit.
///
/// Units that share an RTP timestamp belong to the same frame. The
/// presentation timestamp starts at zero on the first frame and follows the
/// clock ticks elapsed since then, scaled with the track clock rate.
#[derive(Debug, Clone, Default)]
pub struct ChannelStatistics {
    clock_rate: Option<u32>,
    /// Distinct RTP timestamps seen
    pub frames: u64,
    /// Access units emitted
    pub units: u64,
    /// Payload bytes emitted
    pub bytes: u64,
    /// Last RTP timestamp seen
    pub last_timestamp: Option<u32>,
    ticks: u64,
}

/// Statistics snapshot attached to one emitted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTiming {
    /// 1-based index of the frame the unit belongs to
    pub frame_index: u64,
    /// Presentation time in milliseconds, `None` without a clock rate
    pub pts_ms: Option<u64>,
}

impl ChannelStatistics {
    /// Creates statistics for a track with the given RTP clock rate.
    pub fn new(clock_rate: Option<u32>) -> Self {
        Self {
            clock_rate: clock_rate.filter(|rate| *rate > 0),
            ..Default::default()
        }
    }

    /// Current presentation time in milliseconds.
    pub fn pts_ms(&self) -> Option<u64> {
        self.clock_rate.map(|rate| self.ticks * 1000 / rate as u64)
    }

    /// Accounts for one unit of `len` bytes carrying `timestamp`.
    pub fn update(&mut self, timestamp: u32, len: usize) -> UnitTiming {
        self.units += 1;
        self.bytes += len as u64;

        match self.last_timestamp {
            None => self.frames = 1,
            Some(last) if last == timestamp => {}
            Some(last) => {
                self.frames += 1;
                let delta = timestamp.wrapping_sub(last) as i32;
                if delta < 0 {
                    debug!(
                        "rtp timestamp went back: {} -> {} (frame {})",
                        last, timestamp, self.frames
                    );
                } else {
                    self.ticks += delta as u64;
                }
            }
        }
        self.last_timestamp = Some(timestamp);

        UnitTiming {
            frame_index: self.frames,
            pts_ms: self.pts_ms(),
        }
    }
}
