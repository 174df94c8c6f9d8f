//! Home 屏幕的点击计分逻辑。

use serde::{Deserialize, Serialize};

/// 点击计数器：每次点击加一分，可随时清零。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TapCounter {
    taps: u32,
}

impl TapCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记一次点击并返回最新计数。
    pub fn tap(&mut self) -> u32 {
        self.taps = self.taps.saturating_add(1);
        self.taps
    }

    pub fn taps(&self) -> u32 {
        self.taps
    }

    pub fn reset(&mut self) {
        self.taps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_accumulate_and_reset() {
        let mut counter = TapCounter::new();

        assert_eq!(counter.tap(), 1);
        assert_eq!(counter.tap(), 2);
        assert_eq!(counter.taps(), 2);

        counter.reset();
        assert_eq!(counter.taps(), 0, "reset should clear the tally");
    }
}
