//! The tracked account record.
//!
//! A record is persisted as one flat JSON object. Older documents that only
//! carry `name`, `password`, `tpp_rank`, `fpp_rank`, `phone`, `status` and
//! `unban_time` load with every other field defaulted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rank::{ModeRank, RankSlot, RankTier};
use crate::domain::foundation::{LocalTimestamp, ValidationError};

/// Season used when no record carries one.
pub const DEFAULT_SEASON: u32 = 35;

/// Why a record's ban was extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BanMarker {
    #[default]
    None,
    /// Repeat offense detected while a previous ban was known.
    Chase,
}

impl BanMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            BanMarker::None => "",
            BanMarker::Chase => "chase",
        }
    }

    fn from_document(text: &str) -> Self {
        match text.trim() {
            "chase" => BanMarker::Chase,
            _ => BanMarker::None,
        }
    }
}

/// Who set the current ban.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanSource {
    /// Entered through the account form.
    #[default]
    Manual,
    /// Detected by the remote status check.
    Remote,
}

/// The stored unban time, which may not parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnbanAt {
    #[default]
    Absent,
    At(LocalTimestamp),
    /// Text that is not a valid timestamp. Kept verbatim.
    Malformed(String),
}

impl UnbanAt {
    /// Interprets persisted text; blank text is absent.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return UnbanAt::Absent;
        }
        match LocalTimestamp::parse(text) {
            Ok(at) => UnbanAt::At(at),
            Err(_) => UnbanAt::Malformed(text.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, UnbanAt::Absent)
    }

    pub fn timestamp(&self) -> Option<LocalTimestamp> {
        match self {
            UnbanAt::At(at) => Some(*at),
            _ => None,
        }
    }
}

impl fmt::Display for UnbanAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnbanAt::Absent => Ok(()),
            UnbanAt::At(at) => write!(f, "{}", at),
            UnbanAt::Malformed(text) => f.write_str(text),
        }
    }
}

/// Account password. Never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One tracked game account.
///
/// Ban fields are only reachable through [`AccountRecord::ban`] and
/// [`AccountRecord::unban`], so a record that is not banned never carries an
/// unban time or marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordDocument", into = "RecordDocument")]
pub struct AccountRecord {
    name: String,
    password: Credential,
    phone: String,
    player_id: Option<String>,
    account_id: Option<String>,
    banned: bool,
    unban_at: UnbanAt,
    marker: BanMarker,
    source: BanSource,
    level: u32,
    tpp: ModeRank,
    fpp: ModeRank,
    season: Option<u32>,
}

impl AccountRecord {
    /// Creates an unbanned, unranked record. The name is trimmed and must not be empty.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = validate_name(name.into())?;
        Ok(Self {
            name,
            password: Credential::default(),
            phone: String::new(),
            player_id: None,
            account_id: None,
            banned: false,
            unban_at: UnbanAt::Absent,
            marker: BanMarker::None,
            source: BanSource::Manual,
            level: 0,
            tpp: ModeRank::unranked(),
            fpp: ModeRank::unranked(),
            season: None,
        })
    }

    pub fn with_player_id(mut self, player_id: impl Into<String>) -> Self {
        self.set_player_id(Some(player_id.into()));
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.set_account_id(account_id);
        self
    }

    pub fn with_password(mut self, password: Credential) -> Self {
        self.password = password;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_ban(mut self, unban_at: UnbanAt, marker: BanMarker, source: BanSource) -> Self {
        self.ban(unban_at, marker, source);
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password(&self) -> &Credential {
        &self.password
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn is_banned(&self) -> bool {
        self.banned
    }

    pub fn unban_at(&self) -> &UnbanAt {
        &self.unban_at
    }

    pub fn marker(&self) -> BanMarker {
        self.marker
    }

    pub fn ban_source(&self) -> BanSource {
        self.source
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rank(&self, slot: RankSlot) -> ModeRank {
        match slot {
            RankSlot::Tpp => self.tpp,
            RankSlot::Fpp => self.fpp,
        }
    }

    /// Season token stored on this record, if any.
    pub fn season(&self) -> Option<u32> {
        self.season
    }

    // === Mutations ===

    /// Renames the record. A real change clears the account id, since the
    /// remote identity may no longer match.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = validate_name(name.into())?;
        if name != self.name {
            self.name = name;
            self.account_id = None;
        }
        Ok(())
    }

    pub fn set_password(&mut self, password: Credential) {
        self.password = password;
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    /// Sets or clears the remote player id. Blank ids are treated as absent.
    pub fn set_player_id(&mut self, player_id: Option<String>) {
        self.player_id = player_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
    }

    /// Stores a resolved account id. Returns true if the stored value changed.
    /// Blank ids never overwrite a known one.
    pub fn set_account_id(&mut self, account_id: impl Into<String>) -> bool {
        let account_id = account_id.into();
        let account_id = account_id.trim();
        if account_id.is_empty() || self.account_id.as_deref() == Some(account_id) {
            return false;
        }
        self.account_id = Some(account_id.to_string());
        true
    }

    /// Returns true if the stored value changed.
    pub fn set_level(&mut self, level: u32) -> bool {
        if self.level == level {
            return false;
        }
        self.level = level;
        true
    }

    /// Returns true if the stored value changed.
    pub fn set_rank(&mut self, slot: RankSlot, rank: ModeRank) -> bool {
        let current = match slot {
            RankSlot::Tpp => &mut self.tpp,
            RankSlot::Fpp => &mut self.fpp,
        };
        if *current == rank {
            return false;
        }
        *current = rank;
        true
    }

    pub fn set_season(&mut self, season: Option<u32>) {
        self.season = season;
    }

    /// Marks the record banned until `unban_at`.
    pub fn ban(&mut self, unban_at: UnbanAt, marker: BanMarker, source: BanSource) {
        self.banned = true;
        self.unban_at = unban_at;
        self.marker = marker;
        self.source = source;
    }

    /// Clears the ban together with its unban time and marker.
    pub fn unban(&mut self) {
        self.banned = false;
        self.unban_at = UnbanAt::Absent;
        self.marker = BanMarker::None;
        self.source = BanSource::Manual;
    }
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    Ok(name.to_string())
}

/// Flat persisted form of [`AccountRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RecordDocument {
    name: String,
    password: Credential,
    phone: String,
    player_id: String,
    account_id: String,
    status: bool,
    unban_time: String,
    ban_mark: String,
    ban_source: BanSource,
    level: u32,
    tpp_rank: String,
    tpp_rank_point: u32,
    fpp_rank: String,
    fpp_rank_point: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    season: Option<u32>,
}

impl From<RecordDocument> for AccountRecord {
    fn from(doc: RecordDocument) -> Self {
        let non_empty = |s: String| {
            let s = s.trim().to_string();
            (!s.is_empty()).then_some(s)
        };
        // Unknown tier labels load as unranked rather than failing the document.
        let rank = |label: &str, points: u32| {
            ModeRank::new(label.parse::<RankTier>().unwrap_or_default(), points)
        };

        let mut record = AccountRecord {
            name: doc.name.trim().to_string(),
            password: doc.password,
            phone: doc.phone,
            player_id: non_empty(doc.player_id),
            account_id: non_empty(doc.account_id),
            banned: false,
            unban_at: UnbanAt::Absent,
            marker: BanMarker::None,
            source: BanSource::Manual,
            level: doc.level,
            tpp: rank(&doc.tpp_rank, doc.tpp_rank_point),
            fpp: rank(&doc.fpp_rank, doc.fpp_rank_point),
            season: doc.season,
        };
        if doc.status {
            record.ban(
                UnbanAt::from_text(&doc.unban_time),
                BanMarker::from_document(&doc.ban_mark),
                doc.ban_source,
            );
        }
        record
    }
}

impl From<AccountRecord> for RecordDocument {
    fn from(record: AccountRecord) -> Self {
        RecordDocument {
            name: record.name,
            password: record.password,
            phone: record.phone,
            player_id: record.player_id.unwrap_or_default(),
            account_id: record.account_id.unwrap_or_default(),
            status: record.banned,
            unban_time: record.unban_at.to_string(),
            ban_mark: record.marker.as_str().to_string(),
            ban_source: record.source,
            level: record.level,
            tpp_rank: record.tpp.tier().label(),
            tpp_rank_point: record.tpp.points(),
            fpp_rank: record.fpp.tier().label(),
            fpp_rank_point: record.fpp.points(),
            season: record.season,
        }
    }
}

/// Counts shown above the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RosterStats {
    pub total: usize,
    pub banned: usize,
    pub not_banned: usize,
}

impl RosterStats {
    pub fn from_records(records: &[AccountRecord]) -> Self {
        let banned = records.iter().filter(|r| r.is_banned()).count();
        Self {
            total: records.len(),
            banned,
            not_banned: records.len() - banned,
        }
    }
}

impl fmt::Display for RosterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accounts, {} banned, {} not banned",
            self.total, self.banned, self.not_banned
        )
    }
}
