use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use crate::error::{Error, Result};
use crate::models::{NewReview, Review, ReviewChanges, Ticket};
use crate::schema::reviews;
use crate::tickets::get_ticket;

pub const MAX_RATING: i16 = 5;

const ALREADY_REVIEWED: &str = "You have already reviewed this ticket.";

#[derive(Debug, Clone, Copy)]
pub struct ReviewDraft<'a> {
    pub rating: i16,
    pub headline: &'a str,
    pub body: &'a str,
}

pub(crate) fn check_rating(rating: i16) -> Result<()> {
    if !(0..=MAX_RATING).contains(&rating) {
        return Err(Error::Invalid("Rating must be between 0 and 5."));
    }
    Ok(())
}

/// Reviews someone else's ticket. Owners review their tickets only while
/// creating them, see [`crate::tickets::create_ticket_with_review`].
pub fn create_review(
    conn: &mut SqliteConnection,
    ticket_id: i32,
    author_id: i32,
    draft: &ReviewDraft<'_>,
    now: NaiveDateTime,
) -> Result<Review> {
    check_rating(draft.rating)?;
    let ticket = reviewable_ticket(conn, ticket_id, author_id)?;

    let review = diesel::insert_into(reviews::table)
        .values(&NewReview {
            ticket_id: ticket.id,
            rating: draft.rating,
            user_id: author_id,
            headline: draft.headline,
            body: draft.body,
            time_create: now,
        })
        .returning(Review::as_returning())
        .get_result(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Error::Invalid(ALREADY_REVIEWED)
            }
            err => Error::from(err),
        })?;

    tracing::info!(review_id = review.id, ticket_id, author_id, "review created");
    Ok(review)
}

/// The ticket `author_id` is about to review, if they are allowed to.
pub fn reviewable_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i32,
    author_id: i32,
) -> Result<Ticket> {
    let ticket = get_ticket(conn, ticket_id)?;
    if ticket.user_id == author_id {
        return Err(Error::Forbidden("You cannot review your own ticket."));
    }

    let already: i64 = reviews::table
        .filter(reviews::ticket_id.eq(ticket_id))
        .filter(reviews::user_id.eq(author_id))
        .count()
        .get_result(conn)?;
    if already > 0 {
        return Err(Error::Invalid(ALREADY_REVIEWED));
    }

    Ok(ticket)
}

/// A review and the ticket it belongs to.
pub fn get_review(conn: &mut SqliteConnection, review_id: i32) -> Result<(Review, Ticket)> {
    use crate::schema::tickets;

    reviews::table
        .inner_join(tickets::table)
        .filter(reviews::id.eq(review_id))
        .select((Review::as_select(), Ticket::as_select()))
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound)
}

/// Loads a review for modification. Only its author may touch it.
pub fn owned_review(
    conn: &mut SqliteConnection,
    review_id: i32,
    user_id: i32,
) -> Result<(Review, Ticket)> {
    let (review, ticket) = get_review(conn, review_id)?;
    if review.user_id != user_id {
        return Err(Error::Forbidden("You do not have permission to edit this review."));
    }
    Ok((review, ticket))
}

pub fn update_review(
    conn: &mut SqliteConnection,
    review_id: i32,
    user_id: i32,
    changes: &ReviewChanges<'_>,
) -> Result<Review> {
    owned_review(conn, review_id, user_id)?;
    check_rating(changes.rating)?;

    let review = diesel::update(reviews::table.find(review_id))
        .set(changes)
        .returning(Review::as_returning())
        .get_result(conn)?;
    Ok(review)
}

pub fn delete_review(
    conn: &mut SqliteConnection,
    review_id: i32,
    user_id: i32,
) -> Result<Review> {
    let (review, _) = get_review(conn, review_id)?;
    if review.user_id != user_id {
        return Err(Error::Forbidden("You do not have permission to delete this review."));
    }

    diesel::delete(reviews::table.find(review_id)).execute(conn)?;
    tracing::info!(review_id, user_id, "review deleted");
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, member, TestDb};
    use crate::tickets::{create_ticket, TicketDraft};

    const DUNE: TicketDraft<'static> = TicketDraft { title: "Dune", description: "", image: None };
    const GOOD: ReviewDraft<'static> =
        ReviewDraft { rating: 4, headline: "Good", body: "Worth it" };

    #[test]
    fn review_someone_elses_ticket() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();

        let review = create_review(conn, ticket.id, bob.id, &GOOD, at(1)).unwrap();
        let (fetched, parent) = get_review(conn, review.id).unwrap();
        assert_eq!(fetched, review);
        assert_eq!(parent.id, ticket.id);
        assert_eq!(fetched.rating, 4);
    }

    #[test]
    fn cannot_review_own_ticket() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();

        let created = create_review(conn, ticket.id, alice.id, &GOOD, at(1));
        assert!(matches!(created, Err(Error::Forbidden(_))));
    }

    #[test]
    fn cannot_review_twice() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();

        create_review(conn, ticket.id, bob.id, &GOOD, at(1)).unwrap();
        let again = create_review(conn, ticket.id, bob.id, &GOOD, at(2));
        assert!(matches!(again, Err(Error::Invalid(ALREADY_REVIEWED))));
    }

    #[test]
    fn second_review_is_rejected_by_the_database_too() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();
        let row = NewReview {
            ticket_id: ticket.id,
            rating: 3,
            user_id: bob.id,
            headline: "Fine",
            body: "",
            time_create: at(1),
        };

        diesel::insert_into(reviews::table).values(&row).execute(conn).unwrap();
        let duplicate = diesel::insert_into(reviews::table).values(&row).execute(conn);
        assert!(matches!(
            duplicate,
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
        ));
    }

    #[test]
    fn missing_ticket_is_not_found() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let bob = member(conn, "bob");

        assert!(matches!(create_review(conn, 42, bob.id, &GOOD, at(1)), Err(Error::NotFound)));
    }

    #[test]
    fn rating_is_bounded() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();

        for rating in [-1, 6] {
            let draft = ReviewDraft { rating, ..GOOD };
            let created = create_review(conn, ticket.id, bob.id, &draft, at(1));
            assert!(matches!(created, Err(Error::Invalid(_))));
        }
        for rating in [0, 5] {
            let carol = member(conn, &format!("carol{}", rating));
            let draft = ReviewDraft { rating, ..GOOD };
            let created = create_review(conn, ticket.id, carol.id, &draft, at(1)).unwrap();
            assert_eq!(created.rating, rating);
        }
    }

    #[test]
    fn only_the_author_can_update_or_delete() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();
        let review = create_review(conn, ticket.id, bob.id, &GOOD, at(1)).unwrap();

        // the ticket owner has no say over reviews of their ticket
        let changes = ReviewChanges { rating: 1, headline: "Bad", body: "" };
        let updated = update_review(conn, review.id, alice.id, &changes);
        assert!(matches!(updated, Err(Error::Forbidden(_))));
        assert!(matches!(delete_review(conn, review.id, alice.id), Err(Error::Forbidden(_))));

        let updated = update_review(conn, review.id, bob.id, &changes).unwrap();
        assert_eq!((updated.rating, updated.headline.as_str()), (1, "Bad"));
        assert_eq!(updated.time_create, review.time_create);

        delete_review(conn, review.id, bob.id).unwrap();
        assert!(matches!(get_review(conn, review.id), Err(Error::NotFound)));
        assert!(get_ticket(conn, ticket.id).is_ok());
    }

    #[test]
    fn strangers_are_forbidden_before_the_rating_is_checked() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();
        let review = create_review(conn, ticket.id, bob.id, &GOOD, at(1)).unwrap();

        let changes = ReviewChanges { rating: 9, headline: "Bad", body: "" };
        let by_stranger = update_review(conn, review.id, alice.id, &changes);
        assert!(matches!(by_stranger, Err(Error::Forbidden(_))));
        let by_author = update_review(conn, review.id, bob.id, &changes);
        assert!(matches!(by_author, Err(Error::Invalid(_))));
    }
}
