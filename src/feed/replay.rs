use std::collections::VecDeque;
use std::fs::File;
use std::future::Future;
use std::io::BufReader;
use std::path::Path;

use super::TickSource;
use crate::engine::PriceTick;
use crate::errors::Result;

/// Replays recorded ticks in order, then runs dry.
#[derive(Debug, Clone, Default)]
pub struct ReplayFeed {
    ticks: VecDeque<PriceTick>,
}

impl ReplayFeed {
    pub fn new(ticks: impl IntoIterator<Item = PriceTick>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
        }
    }

    /// Reads a JSON array of ticks from `path`. Every tick is shape-checked while decoding.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let ticks: Vec<PriceTick> = serde_json::from_reader(reader)?;
        Ok(Self::new(ticks))
    }

    /// Ticks left to replay.
    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

impl TickSource for ReplayFeed {
    fn next_tick(&mut self, _last_close: Option<f64>) -> impl Future<Output = Option<PriceTick>> + Send {
        let tick = self.ticks.pop_front();
        async move { tick }
    }
}
