use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UnknownVariant;

/// Longest accepted attendee name, counted in characters
pub const MAX_NAME_CHARS: usize = 64;

/// A claimable item
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    /// Habu snake liquor
    Habu,
    /// White tequila
    Tequila,
}

impl Item {
    /// Every item, in display order
    pub const ALL: [Item; 2] = [Item::Habu, Item::Tequila];

    /// Identifier used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Item::Habu => "habu",
            Item::Tequila => "tequila",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Item::Habu => "Habu Snake Liquor",
            Item::Tequila => "White Tequila",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Item {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "habu" => Ok(Item::Habu),
            "tequila" => Ok(Item::Tequila),
            _ => Err(UnknownVariant {
                kind: "item",
                value: s.to_owned(),
            }),
        }
    }
}

/// Where a claim stands
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Reserved, not handed out yet
    Pending,
    /// The shot has been handed out
    Served,
    /// Cancelled by an admin
    Void,
}

impl ClaimStatus {
    /// Identifier used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Served => "served",
            ClaimStatus::Void => "void",
        }
    }

    /// Whether a claim in this status may move to `next`
    ///
    /// Statuses only move forward (`pending` → `served` → `void`); staying put
    /// is allowed.
    pub fn can_become(self, next: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (Pending, _) | (Served, Served) | (Served, Void) | (Void, Void)
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClaimStatus::Pending),
            "served" => Ok(ClaimStatus::Served),
            "void" => Ok(ClaimStatus::Void),
            _ => Err(UnknownVariant {
                kind: "claim status",
                value: s.to_owned(),
            }),
        }
    }
}

/// The singleton settings row
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EventSettings {
    /// Meet-up time, free text
    pub event_time: String,
    /// Meet-up location, free text
    pub location: String,
    /// Whether claims are accepted
    pub is_open: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            event_time: String::from("7:00 PM"),
            location: String::from("XXX"),
            is_open: true,
        }
    }
}

/// Remaining stock of every item
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Remaining habu shots
    pub habu: u32,
    /// Remaining tequila shots
    pub tequila: u32,
}

impl Inventory {
    /// Remaining count of `item`
    #[inline]
    pub fn get(&self, item: Item) -> u32 {
        match item {
            Item::Habu => self.habu,
            Item::Tequila => self.tequila,
        }
    }

    /// Mutable access to the count of `item`
    #[inline]
    pub fn get_mut(&mut self, item: Item) -> &mut u32 {
        match item {
            Item::Habu => &mut self.habu,
            Item::Tequila => &mut self.tequila,
        }
    }

    /// One row per item, in display order
    pub fn rows(&self) -> Vec<InventoryRow> {
        Item::ALL
            .iter()
            .map(|&item| InventoryRow {
                item,
                remaining: self.get(item),
            })
            .collect()
    }
}

/// Wire representation of one inventory entry
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct InventoryRow {
    /// The item
    pub item: Item,
    /// Remaining count
    pub remaining: u32,
}

/// A reservation record
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Claim {
    /// Row id, never reused
    pub id: u64,
    /// Sequential code shown to the attendee
    pub claim_code: String,
    /// Attendee name, trimmed
    pub name: String,
    /// Claimed item
    pub item: Item,
    /// Current status
    pub status: ClaimStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Result of a claim attempt
///
/// Rejections (closed event, sold out, bad name) are reported with
/// `ok == false` rather than as an error.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ClaimOutcome {
    /// Whether a unit was allocated
    pub ok: bool,
    /// Human readable result
    pub message: String,
    /// The allocated code, present iff `ok`
    pub claim_code: Option<String>,
}

impl ClaimOutcome {
    /// A successful claim
    pub fn reserved(claim_code: String) -> Self {
        Self {
            ok: true,
            message: String::from("Reserved!"),
            claim_code: Some(claim_code),
        }
    }

    /// A rejected claim
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            claim_code: None,
        }
    }
}

/// Payload of a claim request
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ClaimShot {
    /// Attendee name
    pub name: String,
    /// Requested item
    pub item: Item,
}

/// Payload of an admin status change
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ClaimStatusUpdate {
    /// Claim row id
    pub id: u64,
    /// Target status
    pub status: ClaimStatus,
}

/// Email/password sign-in payload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Admin email
    pub email: String,
    /// Admin password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &format_args!(".."))
            .finish()
    }
}

/// Answer to a successful sign-in
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SessionGrant {
    /// Token to send in the session header
    pub session_id: Uuid,
    /// Who signed in
    pub email: String,
}

/// Who owns the presented session
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Admin email
    pub email: String,
}
