//! Ban duration presets and the rules that map them to unban times.
//!
//! Everything here is pure: callers pass the current instant explicitly.
//!
//! # Tolerance windows
//!
//! Preset inference uses two different windows. A freshly typed unban time is
//! matched within 0.1 hours ([`ToleranceWindow::TYPED`]); a record loaded from
//! the document is matched with widening windows for longer presets
//! ([`ToleranceWindow::LOADED`]). The two are inconsistent with each other and
//! are kept that way until product decides which one is right.

use chrono::Duration;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{LocalTimestamp, ValidationError};

/// Length of a ban first detected by the remote status check.
pub const FRESH_BAN_HOURS: i64 = 24;

/// Total length of a chase ban measured from a fresh ban's start.
pub const CHASE_TOTAL_DAYS: i64 = 3;

/// Amount added to a still-running fresh ban when a chase is detected.
pub const CHASE_EXTENSION_DAYS: i64 = CHASE_TOTAL_DAYS - 1;

/// Named ban lengths, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DurationPreset {
    #[default]
    None,
    Hours24,
    Hours72,
    Days7,
    Days15,
    Days30,
    Chase3d,
    Custom,
}

impl DurationPreset {
    pub const ALL: [DurationPreset; 8] = [
        DurationPreset::None,
        DurationPreset::Hours24,
        DurationPreset::Hours72,
        DurationPreset::Days7,
        DurationPreset::Days15,
        DurationPreset::Days30,
        DurationPreset::Chase3d,
        DurationPreset::Custom,
    ];

    /// Presets that [`closest_preset`] can return, shortest first.
    const INFERABLE: [DurationPreset; 5] = [
        DurationPreset::Hours24,
        DurationPreset::Hours72,
        DurationPreset::Days7,
        DurationPreset::Days15,
        DurationPreset::Days30,
    ];

    /// Fixed offset from "now"; `None` for the `None` and `Custom` presets.
    pub fn offset(&self) -> Option<Duration> {
        match self {
            DurationPreset::None | DurationPreset::Custom => None,
            DurationPreset::Hours24 => Some(Duration::hours(24)),
            DurationPreset::Hours72 => Some(Duration::hours(72)),
            DurationPreset::Days7 => Some(Duration::days(7)),
            DurationPreset::Days15 => Some(Duration::days(15)),
            DurationPreset::Days30 => Some(Duration::days(30)),
            DurationPreset::Chase3d => Some(Duration::days(CHASE_TOTAL_DAYS)),
        }
    }

    /// True for presets with a fixed offset.
    pub fn is_concrete(&self) -> bool {
        self.offset().is_some()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationPreset::None => "none",
            DurationPreset::Hours24 => "24h",
            DurationPreset::Hours72 => "72h",
            DurationPreset::Days7 => "7d",
            DurationPreset::Days15 => "15d",
            DurationPreset::Days30 => "30d",
            DurationPreset::Chase3d => "chase3d",
            DurationPreset::Custom => "custom",
        }
    }
}

impl fmt::Display for DurationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DurationPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.label() == wanted)
            .ok_or_else(|| ValidationError::invalid_format("duration", s))
    }
}

/// Per-preset matching windows (hours) for [`closest_preset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceWindow {
    hours24: f64,
    hours72: f64,
    days7: f64,
    days15: f64,
    days30: f64,
}

impl ToleranceWindow {
    /// Used when the unban time was just typed in by a person.
    pub const TYPED: ToleranceWindow = ToleranceWindow::uniform(0.1);

    /// Used when inferring the preset of a record loaded from the document.
    pub const LOADED: ToleranceWindow = ToleranceWindow {
        hours24: 1.0,
        hours72: 1.0,
        days7: 3.0,
        days15: 5.0,
        days30: 10.0,
    };

    pub const fn uniform(hours: f64) -> Self {
        Self {
            hours24: hours,
            hours72: hours,
            days7: hours,
            days15: hours,
            days30: hours,
        }
    }

    fn for_preset(&self, preset: DurationPreset) -> f64 {
        match preset {
            DurationPreset::Hours24 => self.hours24,
            DurationPreset::Hours72 => self.hours72,
            DurationPreset::Days7 => self.days7,
            DurationPreset::Days15 => self.days15,
            DurationPreset::Days30 => self.days30,
            _ => 0.0,
        }
    }
}

/// Unban time for a concrete preset; `None` for `None` and `Custom`.
pub fn expiry_for(preset: DurationPreset, now: LocalTimestamp) -> Option<LocalTimestamp> {
    preset.offset().map(|offset| now.plus(offset))
}

/// Infers the preset whose offset lies within the tolerance window of `unban_at - now`.
///
/// A non-positive remaining time yields `None`; no match yields `Custom`.
/// `Chase3d` shares its offset with `Hours72` and is never inferred.
pub fn closest_preset(
    unban_at: LocalTimestamp,
    now: LocalTimestamp,
    tolerance: ToleranceWindow,
) -> DurationPreset {
    let remaining = unban_at.hours_since(&now);
    if remaining <= 0.0 {
        return DurationPreset::None;
    }

    DurationPreset::INFERABLE
        .into_iter()
        .find(|preset| {
            let offset = preset
                .offset()
                .map(|d| d.num_seconds() as f64 / 3600.0)
                .unwrap_or_default();
            (remaining - offset).abs() < tolerance.for_preset(*preset)
        })
        .unwrap_or(DurationPreset::Custom)
}

/// New unban time for a chase (repeat-offense) ban.
///
/// With no current expiry, or one already in the past, the chase runs three
/// days from `now`. Otherwise the running ban is assumed to be a fresh 24-hour
/// ban and is extended by two days, giving three days from its start.
pub fn extend_chase(current: Option<LocalTimestamp>, now: LocalTimestamp) -> LocalTimestamp {
    match current {
        Some(unban_at) if unban_at > now => unban_at.plus_days(CHASE_EXTENSION_DAYS),
        _ => now.plus_days(CHASE_TOTAL_DAYS),
    }
}
