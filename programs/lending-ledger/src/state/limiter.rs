use anchor_lang::prelude::*;

use crate::constants::MAX_LIMITER_SEGMENTS;
use crate::errors::LedgerError;

/// One bucket of the outflow ring
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Absolute bucket number (`timestamp / segment_duration`) last written here
    pub index: u64,

    /// Outflow accumulated during that bucket
    pub value: u64,
}

/// Sliding-window outflow limiter
///
/// The cycle is split into `cycle_duration / segment_duration` buckets kept
/// in a ring. The outflow of the trailing cycle is the sum of every bucket
/// written within the last `N` bucket numbers.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct Limiter {
    /// Maximum outflow per rolling cycle
    pub outflow_limit: u64,

    /// Length of the rolling cycle (seconds)
    pub cycle_duration: u64,

    /// Length of one bucket (seconds)
    pub segment_duration: u64,

    #[max_len(MAX_LIMITER_SEGMENTS)]
    pub segments: Vec<Segment>,
}

/// Limiter parameters as proposed by the admin
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct LimiterConfig {
    pub outflow_limit: u64,
    pub cycle_duration: u64,
    pub segment_duration: u64,
}

impl LimiterConfig {
    pub fn validate(&self) -> Result<u64> {
        segment_count(self.cycle_duration, self.segment_duration)
    }
}

impl Limiter {
    pub fn new(config: LimiterConfig) -> Result<Self> {
        let count = config.validate()?;
        Ok(Self {
            outflow_limit: config.outflow_limit,
            cycle_duration: config.cycle_duration,
            segment_duration: config.segment_duration,
            segments: vec![Segment::default(); count as usize],
        })
    }

    pub fn config(&self) -> LimiterConfig {
        LimiterConfig {
            outflow_limit: self.outflow_limit,
            cycle_duration: self.cycle_duration,
            segment_duration: self.segment_duration,
        }
    }

    /// Outflow recorded during the trailing cycle ending at `now`
    ///
    /// Buckets older than the window count as zero; nothing is written.
    pub fn current_outflow(&self, now: u64) -> u64 {
        let count = self.segments.len() as u64;
        if count == 0 {
            return 0;
        }

        let current_index = now / self.segment_duration;
        let oldest_index = (current_index + 1).saturating_sub(count);

        self.segments
            .iter()
            .filter(|segment| segment.index >= oldest_index)
            .fold(0u64, |total, segment| total.saturating_add(segment.value))
    }

    /// Record `value` leaving the market at `now`
    pub fn add_outflow(&mut self, now: u64, value: u64) -> Result<()> {
        let total = self
            .current_outflow(now)
            .checked_add(value)
            .ok_or(LedgerError::MathOverflow)?;
        require!(total <= self.outflow_limit, LedgerError::LimitExceeded);

        let segment = self.current_segment(now)?;
        segment.value = segment
            .value
            .checked_add(value)
            .ok_or(LedgerError::MathOverflow)?;
        Ok(())
    }

    /// Record `value` returning to the market at `now`
    /// Never fails on underflow: the bucket is floored at zero.
    pub fn reduce_outflow(&mut self, now: u64, value: u64) -> Result<()> {
        let segment = self.current_segment(now)?;
        segment.value = segment.value.saturating_sub(value);
        Ok(())
    }

    /// Change the cycle and bucket lengths
    ///
    /// All recorded outflow is discarded: the new ring starts empty, so up
    /// to a full `outflow_limit` may leave right after a reconfiguration.
    pub fn reconfigure(&mut self, cycle_duration: u64, segment_duration: u64) -> Result<()> {
        let count = segment_count(cycle_duration, segment_duration)?;
        self.cycle_duration = cycle_duration;
        self.segment_duration = segment_duration;
        self.segments = vec![Segment::default(); count as usize];
        Ok(())
    }

    /// Apply a full limiter config; history survives a limit-only change
    pub fn apply_config(&mut self, config: LimiterConfig) -> Result<()> {
        config.validate()?;
        if config.cycle_duration != self.cycle_duration
            || config.segment_duration != self.segment_duration
        {
            self.reconfigure(config.cycle_duration, config.segment_duration)?;
        }
        self.outflow_limit = config.outflow_limit;
        Ok(())
    }

    /// Bucket for `now`, reset first if it still holds an older bucket
    fn current_segment(&mut self, now: u64) -> Result<&mut Segment> {
        let count = self.segments.len() as u64;
        require!(count > 0, LedgerError::ParameterInvalid);

        let current_index = now / self.segment_duration;
        let segment = &mut self.segments[(current_index % count) as usize];
        if segment.index != current_index {
            *segment = Segment {
                index: current_index,
                value: 0,
            };
        }
        Ok(segment)
    }
}

/// Number of buckets for a cycle, rejecting shapes the ring can't hold
fn segment_count(cycle_duration: u64, segment_duration: u64) -> Result<u64> {
    require!(segment_duration > 0, LedgerError::ParameterInvalid);
    require!(cycle_duration % segment_duration == 0, LedgerError::ParameterInvalid);

    let count = cycle_duration / segment_duration;
    require!(count > 0, LedgerError::ParameterInvalid);
    require!(count <= MAX_LIMITER_SEGMENTS as u64, LedgerError::ParameterInvalid);
    Ok(count)
}
