//! Borrow (loan) model, status state machine and fine computation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Borrow record status.
///
/// Stored as text; transitions go through [`BorrowStatus::can_transition_to`]
/// instead of free-form string comparisons. `Late` is a reporting label for an
/// active record whose due date has passed; storage keeps the record active
/// and overdue-ness is computed against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    Pending,
    Ongoing,
    RequestedReturn,
    Returned,
    Late,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Pending => "pending",
            BorrowStatus::Ongoing => "ongoing",
            BorrowStatus::RequestedReturn => "requested_return",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Late => "late",
        }
    }

    /// An active borrow holds a copy: it counts against availability.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            BorrowStatus::Pending | BorrowStatus::Ongoing | BorrowStatus::RequestedReturn
        )
    }

    pub fn can_transition_to(&self, next: BorrowStatus) -> bool {
        use BorrowStatus::*;
        matches!(
            (self, next),
            (Pending, Ongoing)
                | (Pending, Returned)
                | (Ongoing, Ongoing) // extension
                | (Ongoing, RequestedReturn)
                | (Ongoing, Returned)
                | (RequestedReturn, Returned)
        )
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BorrowStatus::Pending),
            "ongoing" => Ok(BorrowStatus::Ongoing),
            "requested_return" => Ok(BorrowStatus::RequestedReturn),
            "returned" => Ok(BorrowStatus::Returned),
            "late" => Ok(BorrowStatus::Late),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Borrow model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Borrow {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub fine_amount: i64,
    pub rating: Option<i16>,
}

impl Borrow {
    /// Status as shown to readers: an active borrow past its due date
    /// is labeled `late`.
    pub fn display_status(&self, now: DateTime<Utc>) -> BorrowStatus {
        if self.status.is_active() && self.due_date < now {
            BorrowStatus::Late
        } else {
            self.status
        }
    }
}

/// Borrow record joined with book/user display fields
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowDetails {
    pub borrow_id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub fine_amount: i64,
    pub rating: Option<i16>,
    pub book_title: String,
    pub book_author: String,
    pub cover_url: Option<String>,
    pub user_name: Option<String>,
}

/// Fine for a return at `returned_at` against `due_date`, in currency units.
///
/// Day-granularity ceiling: any positive overage, even one second past due,
/// charges a full day at `rate_per_day`. On-time returns cost nothing.
pub fn compute_fine(
    due_date: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    rate_per_day: i64,
) -> i64 {
    let overdue = returned_at - due_date;
    if overdue <= Duration::zero() {
        return 0;
    }
    let secs = overdue.num_seconds();
    let days = (secs + 86_399) / 86_400;
    days * rate_per_day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn fine_is_zero_at_exact_due_date() {
        let due = at(2024, 1, 1, 12, 0, 0);
        assert_eq!(compute_fine(due, due, 1000), 0);
    }

    #[test]
    fn fine_is_zero_for_early_return() {
        let due = at(2024, 1, 1, 12, 0, 0);
        assert_eq!(compute_fine(due, at(2023, 12, 30, 0, 0, 0), 1000), 0);
    }

    #[test]
    fn one_second_late_charges_a_full_day() {
        let due = at(2024, 1, 1, 12, 0, 0);
        assert_eq!(compute_fine(due, at(2024, 1, 1, 12, 0, 1), 1000), 1000);
    }

    #[test]
    fn twenty_five_hours_late_charges_two_days() {
        let due = at(2024, 1, 1, 12, 0, 0);
        assert_eq!(compute_fine(due, at(2024, 1, 2, 13, 0, 0), 1000), 2000);
    }

    #[test]
    fn two_days_late_charges_two_days() {
        // due 2024-01-01, returned 2024-01-03
        let due = at(2024, 1, 1, 0, 0, 0);
        assert_eq!(compute_fine(due, at(2024, 1, 3, 0, 0, 0), 1000), 2000);
    }

    #[test]
    fn exact_full_days_do_not_round_up() {
        let due = at(2024, 1, 1, 12, 0, 0);
        assert_eq!(compute_fine(due, at(2024, 1, 2, 12, 0, 0), 1000), 1000);
    }

    #[test]
    fn active_statuses_hold_a_copy() {
        assert!(BorrowStatus::Pending.is_active());
        assert!(BorrowStatus::Ongoing.is_active());
        assert!(BorrowStatus::RequestedReturn.is_active());
        assert!(!BorrowStatus::Returned.is_active());
        assert!(!BorrowStatus::Late.is_active());
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        use BorrowStatus::*;
        assert!(Ongoing.can_transition_to(Returned));
        assert!(Ongoing.can_transition_to(Ongoing));
        assert!(Pending.can_transition_to(Ongoing));
        assert!(RequestedReturn.can_transition_to(Returned));
        assert!(!Returned.can_transition_to(Ongoing));
        assert!(!Returned.can_transition_to(Returned));
    }

    #[test]
    fn overdue_ongoing_displays_as_late() {
        let now = at(2024, 6, 1, 0, 0, 0);
        let mut b = Borrow {
            id: 1,
            user_id: 1,
            book_id: 1,
            borrow_date: at(2024, 5, 1, 0, 0, 0),
            due_date: at(2024, 5, 8, 0, 0, 0),
            return_date: None,
            status: BorrowStatus::Ongoing,
            fine_amount: 0,
            rating: None,
        };
        assert_eq!(b.display_status(now), BorrowStatus::Late);

        b.status = BorrowStatus::Returned;
        assert_eq!(b.display_status(now), BorrowStatus::Returned);

        b.status = BorrowStatus::Ongoing;
        b.due_date = at(2024, 6, 2, 0, 0, 0);
        assert_eq!(b.display_status(now), BorrowStatus::Ongoing);
    }
}
