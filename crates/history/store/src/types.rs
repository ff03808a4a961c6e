//! Read/write result types shared by the store trait and its callers.

use core::{fmt, num::NonZeroU32, str::FromStr};

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;
use safe_history_domain::tx::TxHistoryEntry;
use uuid::Uuid;

/// The outcome of recording a submission.
///
/// Both flags are `false` for a full replay of an already stored submission;
/// `confirmation_created` alone distinguishes a new record from a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct Recorded {
    transaction_created: bool,
    confirmation_created: bool,
}

impl Recorded {
    /// Whether the submission created the transaction row.
    pub fn transaction_created(&self) -> bool {
        self.transaction_created
    }

    /// Whether the submission created a new confirmation row.
    pub fn confirmation_created(&self) -> bool {
        self.confirmation_created
    }
}

/// An opaque page boundary for keyset pagination.
///
/// Encodes the `(created_at, id)` pair of the last row the client has seen.
/// Both components are immutable after insert, so a cursor stays valid while
/// new rows are being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct PageCursor {
    created_at: DateTime<Utc>,
    id: Uuid,
}

/// The supplied page cursor could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("malformed page cursor")]
pub struct CursorError;

impl PageCursor {
    /// The creation timestamp of the last seen row.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The id of the last seen row.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.created_at.timestamp_micros(), self.id)
    }
}

impl FromStr for PageCursor {
    type Err = CursorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (micros, id) = text.split_once(':').ok_or(CursorError)?;

        let created_at = micros
            .parse()
            .ok()
            .and_then(DateTime::from_timestamp_micros)
            .ok_or(CursorError)?;

        let id = id.parse().map_err(|_| CursorError)?;

        Ok(PageCursor { created_at, id })
    }
}

/// Parameters of one paginated history read.
#[derive(Debug, Clone, Copy, Builder)]
pub struct PageRequest {
    limit: NonZeroU32,
    after: Option<PageCursor>,
}

impl PageRequest {
    /// The maximum number of transactions to return.
    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    /// The boundary after which the page starts, `None` for the first page.
    pub fn after(&self) -> Option<PageCursor> {
        self.after
    }
}

/// One page of a wallet's transaction history.
#[derive(Debug, Builder, Dissolve)]
pub struct TxHistoryPage {
    /// Transactions matching the read, across all pages.
    total: u64,

    /// Cursor for the next page, `None` on the last page.
    next: Option<PageCursor>,

    /// The transactions of this page, newest first, each joined with its
    /// confirmations.
    entries: Vec<TxHistoryEntry>,
}

impl TxHistoryPage {
    /// The total match count across all pages.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The boundary to resume from, if any rows remain.
    pub fn next(&self) -> Option<PageCursor> {
        self.next
    }

    /// The entries of this page.
    pub fn entries(&self) -> &[TxHistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips_through_text() {
        let cursor = PageCursor::builder()
            .created_at(DateTime::from_timestamp_micros(1_700_000_000_123_456).unwrap())
            .id(Uuid::from_u128(0xdead_beef))
            .build();

        let decoded: PageCursor = cursor.to_string().parse().unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn rejects_malformed_cursors() {
        assert!("".parse::<PageCursor>().is_err());
        assert!("17000000:not-a-uuid".parse::<PageCursor>().is_err());
        assert!("abc:00000000-0000-0000-0000-0000deadbeef".parse::<PageCursor>().is_err());
        assert!("1700000000123456".parse::<PageCursor>().is_err());
    }
}
