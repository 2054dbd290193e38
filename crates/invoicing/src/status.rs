//! Invoice status lifecycle and synonym handling.
//!
//! The status vocabulary carries two presentation pairs: `due`/`sent`
//! ("awaiting payment, not yet late") and `unpaid`/`overdue` ("outstanding,
//! flagged late"). Every place that groups or filters by status goes through
//! the helpers here so the pairs are always treated identically.

use serde::{Deserialize, Serialize};

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Due,
    Unpaid,
    Paid,
    Void,
    Sent,
    Overdue,
}

impl InvoiceStatus {
    /// Outstanding group: a payment obligation exists and the invoice is not
    /// settled or voided. `{due, unpaid, sent, overdue}`.
    pub fn is_outstanding(self) -> bool {
        matches!(
            self,
            InvoiceStatus::Due | InvoiceStatus::Unpaid | InvoiceStatus::Sent | InvoiceStatus::Overdue
        )
    }

    /// Awaiting payment but not flagged late. `{due, sent}`.
    pub fn is_awaiting_payment(self) -> bool {
        matches!(self, InvoiceStatus::Due | InvoiceStatus::Sent)
    }

    /// Flagged late. `{overdue}`.
    pub fn is_overdue(self) -> bool {
        self == InvoiceStatus::Overdue
    }

    pub fn is_paid(self) -> bool {
        self == InvoiceStatus::Paid
    }

    /// Synonym-aware filter match: filtering by one half of a presentation
    /// pair matches both halves; every other status matches exactly.
    pub fn matches_filter(self, filter: InvoiceStatus) -> bool {
        match filter {
            InvoiceStatus::Due | InvoiceStatus::Sent => self.is_awaiting_payment(),
            InvoiceStatus::Unpaid | InvoiceStatus::Overdue => {
                matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Overdue)
            }
            exact => self == exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outstanding_group_covers_both_synonym_pairs() {
        for status in [
            InvoiceStatus::Due,
            InvoiceStatus::Unpaid,
            InvoiceStatus::Sent,
            InvoiceStatus::Overdue,
        ] {
            assert!(status.is_outstanding(), "{status:?} should be outstanding");
        }
        for status in [InvoiceStatus::Draft, InvoiceStatus::Paid, InvoiceStatus::Void] {
            assert!(!status.is_outstanding(), "{status:?} should not be outstanding");
        }
    }

    #[test]
    fn due_and_sent_are_interchangeable_in_filters() {
        assert!(InvoiceStatus::Sent.matches_filter(InvoiceStatus::Due));
        assert!(InvoiceStatus::Due.matches_filter(InvoiceStatus::Sent));
        assert!(!InvoiceStatus::Overdue.matches_filter(InvoiceStatus::Due));
    }

    #[test]
    fn unpaid_and_overdue_are_interchangeable_in_filters() {
        assert!(InvoiceStatus::Overdue.matches_filter(InvoiceStatus::Unpaid));
        assert!(InvoiceStatus::Unpaid.matches_filter(InvoiceStatus::Overdue));
        assert!(!InvoiceStatus::Sent.matches_filter(InvoiceStatus::Unpaid));
    }

    #[test]
    fn exact_statuses_match_only_themselves() {
        assert!(InvoiceStatus::Draft.matches_filter(InvoiceStatus::Draft));
        assert!(!InvoiceStatus::Paid.matches_filter(InvoiceStatus::Draft));
        assert!(InvoiceStatus::Void.matches_filter(InvoiceStatus::Void));
    }

    #[test]
    fn overdue_only_group_excludes_unpaid() {
        assert!(InvoiceStatus::Overdue.is_overdue());
        assert!(!InvoiceStatus::Unpaid.is_overdue());
    }
}
