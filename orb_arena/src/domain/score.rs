use crate::domain::ports::ScoreSink;
use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

/// Process-wide score counter. Clones share the same total.
#[derive(Debug, Clone, Default)]
pub struct ScoreKeeper {
    points: Arc<AtomicI64>,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> i64 {
        self.points.load(Ordering::Relaxed)
    }
}

impl ScoreSink for ScoreKeeper {
    fn adjust_score(&mut self, delta: i32) {
        self.points.fetch_add(i64::from(delta), Ordering::Relaxed);
    }
}
