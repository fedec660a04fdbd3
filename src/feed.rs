//! The timeline: tickets and reviews of a set of authors, merged and sorted
//! newest first.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde_derive::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::follows::followed_ids;
use crate::models::{Review, Ticket};
use crate::schema::{reviews, tickets, users};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "content_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedItem {
    Review {
        review: Review,
        author: String,
        ticket: Ticket,
        ticket_author: String,
    },
    Ticket {
        ticket: Ticket,
        author: String,
    },
}

impl FeedItem {
    pub fn time_create(&self) -> NaiveDateTime {
        match self {
            FeedItem::Review { review, .. } => review.time_create,
            FeedItem::Ticket { ticket, .. } => ticket.time_create,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            FeedItem::Review { author, .. } | FeedItem::Ticket { author, .. } => author,
        }
    }

    fn sort_key(&self) -> (NaiveDateTime, i32, bool) {
        match self {
            FeedItem::Review { review, .. } => (review.time_create, review.id, true),
            FeedItem::Ticket { ticket, .. } => (ticket.time_create, ticket.id, false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Feed {
    pub items: Vec<FeedItem>,
    /// Tickets the viewer already reviewed; the page hides "write a review" for these.
    pub reviewed_ticket_ids: BTreeSet<i32>,
}

impl Feed {
    pub fn has_reviewed(&self, ticket_id: i32) -> bool {
        self.reviewed_ticket_ids.contains(&ticket_id)
    }
}

/// Everything posted by the accounts `viewer_id` follows.
pub fn feed_for(conn: &mut SqliteConnection, viewer_id: i32) -> Result<Feed> {
    let authors = followed_ids(conn, viewer_id)?;
    Ok(Feed {
        items: items_by(conn, &authors)?,
        reviewed_ticket_ids: reviewed_ticket_ids(conn, viewer_id)?,
    })
}

/// The viewer's own tickets and reviews.
pub fn posts_for(conn: &mut SqliteConnection, viewer_id: i32) -> Result<Feed> {
    Ok(Feed {
        items: items_by(conn, &[viewer_id])?,
        reviewed_ticket_ids: reviewed_ticket_ids(conn, viewer_id)?,
    })
}

pub fn reviewed_ticket_ids(conn: &mut SqliteConnection, viewer_id: i32) -> Result<BTreeSet<i32>> {
    let ids = reviews::table
        .filter(reviews::user_id.eq(viewer_id))
        .select(reviews::ticket_id)
        .load::<i32>(conn)?;
    Ok(ids.into_iter().collect())
}

fn items_by(conn: &mut SqliteConnection, authors: &[i32]) -> Result<Vec<FeedItem>> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }

    let found_reviews = reviews::table
        .inner_join(tickets::table)
        .filter(reviews::user_id.eq_any(authors))
        .select((Review::as_select(), Ticket::as_select()))
        .load::<(Review, Ticket)>(conn)?;
    let found_tickets = tickets::table
        .filter(tickets::user_id.eq_any(authors))
        .select(Ticket::as_select())
        .load::<Ticket>(conn)?;

    let mut user_ids: Vec<i32> = found_reviews
        .iter()
        .flat_map(|(review, ticket)| [review.user_id, ticket.user_id])
        .chain(found_tickets.iter().map(|ticket| ticket.user_id))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let names: HashMap<i32, String> = users::table
        .filter(users::id.eq_any(&user_ids))
        .select((users::id, users::username))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();
    let name_of = |id: i32| names.get(&id).cloned().unwrap_or_default();

    let mut items: Vec<FeedItem> = found_reviews
        .into_iter()
        .map(|(review, ticket)| FeedItem::Review {
            author: name_of(review.user_id),
            ticket_author: name_of(ticket.user_id),
            review,
            ticket,
        })
        .chain(found_tickets.into_iter().map(|ticket| FeedItem::Ticket {
            author: name_of(ticket.user_id),
            ticket,
        }))
        .collect();

    items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::follows::follow;
    use crate::reviews::{create_review, ReviewDraft};
    use crate::test_support::{at, member, TestDb};
    use crate::tickets::{create_ticket, TicketDraft};

    fn ticket(conn: &mut SqliteConnection, owner: i32, title: &str, minute: i64) -> Ticket {
        let draft = TicketDraft { title, description: "", image: None };
        create_ticket(conn, owner, &draft, at(minute)).unwrap()
    }

    fn review(
        conn: &mut SqliteConnection,
        ticket_id: i32,
        author: i32,
        headline: &str,
        minute: i64,
    ) -> Review {
        let draft = ReviewDraft { rating: 4, headline, body: "" };
        create_review(conn, ticket_id, author, &draft, at(minute)).unwrap()
    }

    #[test]
    fn following_nobody_gives_an_empty_feed() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        ticket(conn, bob.id, "Dune", 1);

        let feed = feed_for(conn, alice.id).unwrap();
        assert!(feed.items.is_empty());
        assert!(feed.reviewed_ticket_ids.is_empty());
    }

    #[test]
    fn feed_is_newest_first_and_only_followed_authors() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        let carol = member(conn, "carol");
        let dave = member(conn, "dave");
        follow(conn, &alice, "bob").unwrap();
        follow(conn, &alice, "carol").unwrap();

        let dune = ticket(conn, bob.id, "Dune", 1);
        let emma = ticket(conn, dave.id, "Emma", 2);
        review(conn, emma.id, carol.id, "Witty", 5);
        ticket(conn, carol.id, "Ulysses", 3);
        review(conn, dune.id, dave.id, "Sandy", 4);
        ticket(conn, alice.id, "Own ticket", 6);

        let feed = feed_for(conn, alice.id).unwrap();
        let summary: Vec<(&str, &str)> = feed
            .items
            .iter()
            .map(|item| match item {
                FeedItem::Review { review, .. } => ("REVIEW", review.headline.as_str()),
                FeedItem::Ticket { ticket, .. } => ("TICKET", ticket.title.as_str()),
            })
            .collect();
        assert_eq!(summary, vec![("REVIEW", "Witty"), ("TICKET", "Ulysses"), ("TICKET", "Dune")]);

        assert!(feed.items.windows(2).all(|w| w[0].time_create() >= w[1].time_create()));
        assert!(feed.items.iter().all(|item| ["bob", "carol"].contains(&item.author())));

        match &feed.items[0] {
            FeedItem::Review { ticket, ticket_author, .. } => {
                assert_eq!(ticket.id, emma.id);
                assert_eq!(ticket_author, "dave");
            }
            other => panic!("expected a review, got {:?}", other),
        }
    }

    #[test]
    fn reviewed_tickets_are_flagged() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        follow(conn, &alice, "bob").unwrap();

        let dune = ticket(conn, bob.id, "Dune", 1);
        let emma = ticket(conn, bob.id, "Emma", 2);
        review(conn, dune.id, alice.id, "Great", 3);

        let feed = feed_for(conn, alice.id).unwrap();
        assert!(feed.has_reviewed(dune.id));
        assert!(!feed.has_reviewed(emma.id));
    }

    #[test]
    fn same_timestamp_falls_back_to_newest_id() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");
        follow(conn, &alice, "bob").unwrap();

        let first = ticket(conn, bob.id, "First", 1);
        let second = ticket(conn, bob.id, "Second", 1);

        let feed = feed_for(conn, alice.id).unwrap();
        let ids: Vec<i32> = feed
            .items
            .iter()
            .filter_map(|item| match item {
                FeedItem::Ticket { ticket, .. } => Some(ticket.id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn posts_are_the_viewers_own_content() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let alice = member(conn, "alice");
        let bob = member(conn, "bob");

        let dune = ticket(conn, bob.id, "Dune", 1);
        ticket(conn, alice.id, "Emma", 2);
        review(conn, dune.id, alice.id, "Great", 3);

        let posts = posts_for(conn, alice.id).unwrap();
        assert_eq!(posts.items.len(), 2);
        assert!(posts.items.iter().all(|item| item.author() == "alice"));
        assert!(matches!(posts.items[0], FeedItem::Review { .. }));
        assert!(posts.has_reviewed(dune.id));
    }

    #[test]
    fn items_serialize_with_a_content_type_tag() {
        let db = TestDb::new();
        let conn = &mut db.conn();
        let bob = member(conn, "bob");
        ticket(conn, bob.id, "Dune", 1);

        let posts = posts_for(conn, bob.id).unwrap();
        let json = serde_json::to_value(&posts.items[0]).unwrap();
        assert_eq!(json["content_type"], "TICKET");
        assert_eq!(json["author"], "bob");
        assert_eq!(json["ticket"]["title"], "Dune");
    }
}
