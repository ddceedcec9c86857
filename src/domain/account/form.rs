//! Ban section of the account form as an explicit state machine.
//!
//! The ban flag, the duration preset and the unban time all depend on each
//! other. Instead of each field reacting to the others, every user action is
//! an event and [`reconcile`] returns the complete next state.

use super::duration::{closest_preset, expiry_for, DurationPreset, ToleranceWindow};
use super::record::{AccountRecord, UnbanAt};
use crate::domain::foundation::LocalTimestamp;

/// Ban fields of the account form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanForm {
    pub banned: bool,
    pub preset: DurationPreset,
    /// Raw unban time text as shown in the form.
    pub unban_time: String,
    /// Last concrete preset chosen, restored when the ban is switched back on.
    pub last_preset: DurationPreset,
}

impl Default for BanForm {
    fn default() -> Self {
        Self {
            banned: false,
            preset: DurationPreset::None,
            unban_time: String::new(),
            last_preset: DurationPreset::Hours24,
        }
    }
}

/// A single user action on the ban fields.
#[derive(Debug, Clone)]
pub enum FormEvent<'a> {
    StatusToggled(bool),
    PresetSelected(DurationPreset),
    UnbanTimeEdited(String),
    Loaded(&'a AccountRecord),
    Cleared,
}

/// Computes the form state that follows `event`.
pub fn reconcile(form: BanForm, event: FormEvent<'_>, now: LocalTimestamp) -> BanForm {
    match event {
        FormEvent::Cleared => BanForm {
            last_preset: form.last_preset,
            ..BanForm::default()
        },
        FormEvent::StatusToggled(false) => BanForm {
            banned: false,
            preset: DurationPreset::None,
            unban_time: String::new(),
            ..form
        },
        FormEvent::StatusToggled(true) => {
            let preset = match form.preset {
                DurationPreset::None => form.last_preset,
                other => other,
            };
            with_preset_time(
                BanForm {
                    banned: true,
                    preset,
                    ..form
                },
                now,
            )
        }
        FormEvent::PresetSelected(DurationPreset::None) => BanForm {
            banned: false,
            preset: DurationPreset::None,
            unban_time: String::new(),
            ..form
        },
        FormEvent::PresetSelected(DurationPreset::Custom) => {
            let unban_time = if form.unban_time.trim().is_empty() {
                now.plus_hours(24).to_string()
            } else {
                form.unban_time
            };
            BanForm {
                banned: true,
                preset: DurationPreset::Custom,
                unban_time,
                last_preset: form.last_preset,
            }
        }
        FormEvent::PresetSelected(preset) => with_preset_time(
            BanForm {
                banned: true,
                preset,
                last_preset: preset,
                ..form
            },
            now,
        ),
        FormEvent::UnbanTimeEdited(text) => {
            if !form.banned || text.trim().is_empty() {
                return BanForm {
                    unban_time: text,
                    ..form
                };
            }
            let preset = match LocalTimestamp::parse(&text) {
                Ok(at) => closest_preset(at, now, ToleranceWindow::TYPED),
                Err(_) => DurationPreset::Custom,
            };
            BanForm {
                preset,
                unban_time: text,
                ..form
            }
        }
        FormEvent::Loaded(record) => {
            let unban_time = record.unban_at().to_string();
            let preset = if !record.is_banned() {
                DurationPreset::None
            } else {
                match record.unban_at() {
                    UnbanAt::Absent => DurationPreset::Hours24,
                    UnbanAt::At(at) => closest_preset(*at, now, ToleranceWindow::LOADED),
                    UnbanAt::Malformed(_) => DurationPreset::Custom,
                }
            };
            BanForm {
                banned: record.is_banned(),
                preset,
                unban_time,
                last_preset: form.last_preset,
            }
        }
    }
}

/// Unban time that saving the form should store.
///
/// A banned form with a concrete preset is recomputed from `now`, so a form
/// left open for a while still saves the full duration.
pub fn unban_time_for_save(form: &BanForm, now: LocalTimestamp) -> Option<UnbanAt> {
    if !form.banned {
        return None;
    }
    Some(match expiry_for(form.preset, now) {
        Some(at) => UnbanAt::At(at),
        None => UnbanAt::from_text(&form.unban_time),
    })
}

fn with_preset_time(form: BanForm, now: LocalTimestamp) -> BanForm {
    match expiry_for(form.preset, now) {
        Some(at) => BanForm {
            unban_time: at.to_string(),
            ..form
        },
        None => form,
    }
}
