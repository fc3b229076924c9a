use rampup_core::{validate_bounds, ConfigError, RunConfig, DEFAULT_LEVEL_INTERVAL};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Strictly increasing concurrency levels, from the start concurrency to exactly the max.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RampPlan {
    levels: Vec<u32>,
    step: u32,
}

impl RampPlan {
    pub fn for_config(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(
            config.start_concurrency,
            config.max_concurrency,
            level_count(
                config.start_concurrency,
                config.max_concurrency,
                config.total_duration,
                config.levels,
            ),
        ))
    }

    fn build(start: u32, max: u32, count: usize) -> Self {
        let span = (max - start) as u64;
        let gaps = count.saturating_sub(1).max(1) as u64;
        let step = span.div_ceil(gaps).max(1) as u32;

        // NOTE: The last generated level may fall short of max; max is always appended so the plan
        // never overshoots and never stops early.
        let mut levels: Vec<u32> = (start..max).step_by(step as usize).collect();
        levels.push(max);

        Self { levels, step }
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.iter().copied()
    }
}

/// Plan a ramp from `start` to `max` that fits `duration`, one level per
/// [`DEFAULT_LEVEL_INTERVAL`].
pub fn plan(start: u32, max: u32, duration: Duration) -> Result<RampPlan, ConfigError> {
    validate_bounds(start, max, duration)?;
    Ok(RampPlan::build(
        start,
        max,
        level_count(start, max, duration, None),
    ))
}

fn level_count(start: u32, max: u32, duration: Duration, explicit: Option<NonZeroUsize>) -> usize {
    if start == max {
        return 1;
    }

    let wanted = match explicit {
        Some(levels) => levels.get(),
        None => (duration.as_secs_f64() / DEFAULT_LEVEL_INTERVAL.as_secs_f64()) as usize,
    };

    let distinct = (max - start) as usize + 1;
    wanted.clamp(2, distinct)
}
