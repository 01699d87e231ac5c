//! Push-channel change events and their wire representation.

use super::Entity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Kind of row change reported by the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

impl ChangeKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// A single change to one row, as applied to a cache.
#[derive(Debug, Clone, PartialEq)]
pub enum RowChange<E: Entity> {
    /// The row now exists with these values.
    Insert(E),
    /// The row was replaced by these values.
    Update(E),
    /// The row with this id no longer exists.
    Delete {
        /// Identifier of the removed row.
        id: E::Id,
    },
}

impl<E: Entity> RowChange<E> {
    /// Returns the change kind.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Insert(_) => ChangeKind::Insert,
            Self::Update(_) => ChangeKind::Update,
            Self::Delete { .. } => ChangeKind::Delete,
        }
    }

    /// Returns the id of the affected row.
    #[must_use]
    pub fn id(&self) -> E::Id {
        match self {
            Self::Insert(row) | Self::Update(row) => row.id(),
            Self::Delete { id } => *id,
        }
    }
}

/// Realtime notification as delivered by the hosted database.
///
/// Inserts and updates carry the full row in `new`; deletes carry at least
/// the primary key in `old`. Absent sides are sent as empty objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePayload {
    /// Kind of change.
    #[serde(rename = "eventType")]
    pub event_type: ChangeKind,
    /// Row after the change.
    #[serde(default)]
    pub new: Value,
    /// Row before the change.
    #[serde(default)]
    pub old: Value,
}

/// Errors raised while decoding a [`ChangePayload`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChangeDecodeError {
    /// The payload lacks the row side required by its kind.
    #[error("{kind} payload is missing its '{side}' row")]
    MissingRow {
        /// Change kind wire name.
        kind: &'static str,
        /// Missing side, `new` or `old`.
        side: &'static str,
    },

    /// The row could not be decoded into the entity type.
    #[error("malformed {kind} row: {message}")]
    MalformedRow {
        /// Change kind wire name.
        kind: &'static str,
        /// Decoder message.
        message: String,
    },
}

#[derive(Deserialize)]
struct RowKey<Id> {
    id: Id,
}

impl ChangePayload {
    /// Decodes the payload into a typed change for `E`.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeDecodeError::MissingRow`] when the side required by
    /// the change kind is absent and [`ChangeDecodeError::MalformedRow`]
    /// when it does not decode.
    pub fn decode<E>(self) -> Result<RowChange<E>, ChangeDecodeError>
    where
        E: Entity + DeserializeOwned,
        E::Id: DeserializeOwned,
    {
        let kind = self.event_type;
        match kind {
            ChangeKind::Insert => decode_side::<E>(kind, "new", self.new).map(RowChange::Insert),
            ChangeKind::Update => decode_side::<E>(kind, "new", self.new).map(RowChange::Update),
            ChangeKind::Delete => decode_side::<RowKey<E::Id>>(kind, "old", self.old)
                .map(|key| RowChange::Delete { id: key.id }),
        }
    }
}

fn decode_side<T: DeserializeOwned>(
    kind: ChangeKind,
    side: &'static str,
    value: Value,
) -> Result<T, ChangeDecodeError> {
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(ChangeDecodeError::MissingRow {
            kind: kind.as_str(),
            side,
        });
    }
    serde_json::from_value(value).map_err(|err| ChangeDecodeError::MalformedRow {
        kind: kind.as_str(),
        message: err.to_string(),
    })
}
