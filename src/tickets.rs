use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::error::{Error, Result};
use crate::models::{NewReview, NewTicket, Review, Ticket, TicketChanges};
use crate::reviews::{check_rating, ReviewDraft};
use crate::schema::{reviews, tickets};

/// User-supplied ticket fields.
#[derive(Debug, Clone, Copy)]
pub struct TicketDraft<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
}

pub fn create_ticket(
    conn: &mut SqliteConnection,
    owner_id: i32,
    draft: &TicketDraft<'_>,
    now: NaiveDateTime,
) -> Result<Ticket> {
    let ticket = diesel::insert_into(tickets::table)
        .values(&NewTicket {
            title: draft.title,
            description: draft.description,
            image: draft.image,
            user_id: owner_id,
            time_create: now,
        })
        .returning(Ticket::as_returning())
        .get_result(conn)?;

    tracing::info!(ticket_id = ticket.id, owner_id, "ticket created");
    Ok(ticket)
}

/// Creates a ticket and the owner's review of it. Either both are stored or
/// neither is.
pub fn create_ticket_with_review(
    conn: &mut SqliteConnection,
    owner_id: i32,
    ticket_draft: &TicketDraft<'_>,
    review_draft: &ReviewDraft<'_>,
    now: NaiveDateTime,
) -> Result<(Ticket, Review)> {
    check_rating(review_draft.rating)?;

    conn.transaction(|conn| {
        let ticket = create_ticket(conn, owner_id, ticket_draft, now)?;
        let review = diesel::insert_into(reviews::table)
            .values(&NewReview {
                ticket_id: ticket.id,
                rating: review_draft.rating,
                user_id: owner_id,
                headline: review_draft.headline,
                body: review_draft.body,
                time_create: now,
            })
            .returning(Review::as_returning())
            .get_result(conn)?;
        Ok((ticket, review))
    })
}

pub fn get_ticket(conn: &mut SqliteConnection, ticket_id: i32) -> Result<Ticket> {
    tickets::table
        .find(ticket_id)
        .select(Ticket::as_select())
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound)
}

/// Loads a ticket for modification by `user_id`.
pub fn owned_ticket(conn: &mut SqliteConnection, ticket_id: i32, user_id: i32) -> Result<Ticket> {
    let ticket = get_ticket(conn, ticket_id)?;
    if ticket.user_id != user_id {
        return Err(Error::Forbidden("You do not have permission to edit this ticket."));
    }
    Ok(ticket)
}

/// Applies `changes` to a ticket of `user_id`. Returns the updated ticket and,
/// when the image was replaced or cleared, the previous image path.
pub fn update_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i32,
    user_id: i32,
    changes: &TicketChanges<'_>,
) -> Result<(Ticket, Option<String>)> {
    let current = owned_ticket(conn, ticket_id, user_id)?;
    let updated = diesel::update(tickets::table.find(ticket_id))
        .set(changes)
        .returning(Ticket::as_returning())
        .get_result(conn)?;

    let replaced = match changes.image {
        Some(_) => current.image.filter(|old| updated.image.as_deref() != Some(old.as_str())),
        None => None,
    };
    Ok((updated, replaced))
}

/// Deletes a ticket of `user_id` together with its reviews.
pub fn delete_ticket(conn: &mut SqliteConnection, ticket_id: i32, user_id: i32) -> Result<Ticket> {
    let ticket = get_ticket(conn, ticket_id)?;
    if ticket.user_id != user_id {
        return Err(Error::Forbidden("You do not have permission to delete this ticket."));
    }

    diesel::delete(tickets::table.find(ticket_id)).execute(conn)?;
    tracing::info!(ticket_id, user_id, "ticket deleted");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::create_review;
    use crate::test_support::{at, member, TestDb};

    const DUNE: TicketDraft<'static> =
        TicketDraft { title: "Dune", description: "Herbert", image: None };

    #[test]
    fn create_and_fetch() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");

        let created = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();
        let fetched = get_ticket(conn, created.id).unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.user_id, alice.id);
        assert_eq!(fetched.description, "Herbert");
        assert!(matches!(get_ticket(conn, created.id + 1), Err(Error::NotFound)));
    }

    #[test]
    fn only_the_owner_can_update() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();

        let changes = TicketChanges { title: "Dune Messiah", description: "", image: None };
        let by_stranger = update_ticket(conn, ticket.id, bob.id, &changes);
        assert!(matches!(by_stranger, Err(Error::Forbidden(_))));
        assert_eq!(get_ticket(conn, ticket.id).unwrap().title, "Dune");

        let (updated, replaced) = update_ticket(conn, ticket.id, alice.id, &changes).unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert!(replaced.is_none());
    }

    #[test]
    fn replacing_an_image_reports_the_old_one() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let draft = TicketDraft { image: Some("tickets/old.png"), ..DUNE };
        let ticket = create_ticket(conn, alice.id, &draft, at(0)).unwrap();

        let keep = TicketChanges { title: "Dune", description: "", image: None };
        let (kept, replaced) = update_ticket(conn, ticket.id, alice.id, &keep).unwrap();
        assert_eq!(kept.image.as_deref(), Some("tickets/old.png"));
        assert!(replaced.is_none());

        let swap =
            TicketChanges { title: "Dune", description: "", image: Some(Some("tickets/new.png")) };
        let (swapped, replaced) = update_ticket(conn, ticket.id, alice.id, &swap).unwrap();
        assert_eq!(swapped.image.as_deref(), Some("tickets/new.png"));
        assert_eq!(replaced.as_deref(), Some("tickets/old.png"));
    }

    #[test]
    fn only_the_owner_can_delete_and_reviews_go_too() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let ticket = create_ticket(conn, alice.id, &DUNE, at(0)).unwrap();
        let draft = ReviewDraft { rating: 3, headline: "Fine", body: "" };
        create_review(conn, ticket.id, bob.id, &draft, at(1)).unwrap();

        assert!(matches!(delete_ticket(conn, ticket.id, bob.id), Err(Error::Forbidden(_))));

        delete_ticket(conn, ticket.id, alice.id).unwrap();
        assert!(matches!(get_ticket(conn, ticket.id), Err(Error::NotFound)));
        let left: i64 = reviews::table.count().get_result(conn).unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn ticket_with_review_is_atomic() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");

        let bad = ReviewDraft { rating: 9, headline: "Too good", body: "" };
        assert!(matches!(
            create_ticket_with_review(conn, alice.id, &DUNE, &bad, at(0)),
            Err(Error::Invalid(_))
        ));
        let count: i64 = tickets::table.count().get_result(conn).unwrap();
        assert_eq!(count, 0);

        let good = ReviewDraft { rating: 5, headline: "Classic", body: "Spice" };
        let (ticket, review) =
            create_ticket_with_review(conn, alice.id, &DUNE, &good, at(0)).unwrap();
        assert_eq!(review.ticket_id, ticket.id);
        assert_eq!(review.user_id, alice.id);
        assert_eq!(ticket.user_id, alice.id);
    }
}
