//! Event detection: boolean trading facts derived from feature rows.
//!
//! Crossover events are edge-triggered (true only on the transition bar,
//! comparing against the immediately preceding row); threshold events are
//! level-triggered (true on every bar the condition holds). Detection is a
//! pure function of the rows it is given, so recomputing over the same rows
//! reproduces the same flags.

use crate::domain::features::FeatureRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MaCrossover,
    Breakout,
    VolumeSpike,
    StrongTrend,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MaCrossover => "ma_crossover",
            EventKind::Breakout => "breakout_20d",
            EventKind::VolumeSpike => "volume_spike",
            EventKind::StrongTrend => "strong_trend",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ma_crossover" => Some(EventKind::MaCrossover),
            "breakout_20d" | "breakout" => Some(EventKind::Breakout),
            "volume_spike" => Some(EventKind::VolumeSpike),
            "strong_trend" => Some(EventKind::StrongTrend),
            _ => None,
        }
    }
}

/// How the named events combine into a single entry signal. The combination
/// is configuration rather than a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    AllOf,
    AnyOf,
}

#[derive(Debug, Clone)]
pub struct EntryPolicy {
    pub combine: Combine,
    pub events: Vec<EventKind>,
}

impl Default for EntryPolicy {
    fn default() -> Self {
        // Crossover alone is the classic golden-cross buy rule.
        Self {
            combine: Combine::AllOf,
            events: vec![EventKind::MaCrossover],
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Volume must exceed multiplier x rolling mean volume to count as a spike.
    pub spike_multiplier: f64,
    /// |ma_diff| must exceed this for the trend to count as strong.
    pub strong_trend_threshold: f64,
    pub entry: EntryPolicy,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            spike_multiplier: 2.0,
            strong_trend_threshold: 0.02,
            entry: EntryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFlags {
    pub ma_crossover: bool,
    pub breakout: bool,
    pub volume_spike: bool,
    pub strong_trend: bool,
}

impl EventFlags {
    pub fn get(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::MaCrossover => self.ma_crossover,
            EventKind::Breakout => self.breakout,
            EventKind::VolumeSpike => self.volume_spike,
            EventKind::StrongTrend => self.strong_trend,
        }
    }

    /// Evaluate the configured entry combination over these flags.
    pub fn entry_signal(&self, policy: &EntryPolicy) -> bool {
        if policy.events.is_empty() {
            return false;
        }
        match policy.combine {
            Combine::AllOf => policy.events.iter().all(|e| self.get(*e)),
            Combine::AnyOf => policy.events.iter().any(|e| self.get(*e)),
        }
    }
}

/// Derive the event flags for `current`, given the preceding row (if any).
///
/// The crossover requires strict inequality on the transition bar: equality
/// of the short and long MA counts as "not crossed", so a flat market never
/// flaps. Without a preceding row the crossover cannot be established and is
/// reported false.
pub fn detect_events(
    prev: Option<&FeatureRow>,
    current: &FeatureRow,
    config: &EventConfig,
) -> EventFlags {
    let ma_crossover = match prev {
        // ma_diff is (short - long) / close with close > 0, so its sign
        // carries the MA comparison.
        Some(p) => p.ma_diff <= 0.0 && current.ma_diff > 0.0,
        None => false,
    };

    EventFlags {
        ma_crossover,
        breakout: current.close > current.prior_high_close,
        volume_spike: current.volume_ma_ratio > config.spike_multiplier,
        strong_trend: current.ma_diff.abs() > config.strong_trend_threshold,
    }
}
