/// The 4-bit packet timer stamped into every outgoing frame.
///
/// Starts at zero for each session and wraps after 0xF. The controller never
/// reports it back.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SequenceCounter {
    value: u8,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u8 {
        self.value
    }

    // Returns the value to stamp into the next frame and advances the counter.
    pub fn next(&mut self) -> u8 {
        let value = self.value;
        self.value = (self.value + 1) & 0xF;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceCounter;

    #[test]
    fn wraps_after_sixteen_frames() {
        let mut counter = SequenceCounter::new();
        let stamped: Vec<u8> = (0..18).map(|_| counter.next()).collect();
        assert_eq!(&stamped[..16], &(0..16).collect::<Vec<u8>>()[..]);
        assert_eq!(&stamped[16..], &[0, 1]);
        assert_eq!(counter.current(), 2);
    }
}
