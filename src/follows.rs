use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

use crate::error::{Error, Result};
use crate::models::{Member, NewUserFollow};
use crate::schema::{user_follows, users};

/// What happened to a follow request. Every variant is meant for the user,
/// see [`FollowOutcome::message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed(String),
    SelfFollow,
    UnknownUser(String),
    AlreadyFollowing(String),
}

impl FollowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FollowOutcome::Followed(_))
    }

    pub fn message(&self) -> String {
        match self {
            FollowOutcome::Followed(name) => format!("You are now following {}!", name),
            FollowOutcome::SelfFollow => "You cannot follow yourself.".to_string(),
            FollowOutcome::UnknownUser(name) => format!("The user {} does not exist.", name),
            FollowOutcome::AlreadyFollowing(name) => format!("You are already following {}!", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Unfollowed(String),
    NotFound,
}

impl UnfollowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnfollowOutcome::Unfollowed(_))
    }

    pub fn message(&self) -> String {
        match self {
            UnfollowOutcome::Unfollowed(name) => format!("You have unfollowed {}.", name),
            UnfollowOutcome::NotFound => "User not found.".to_string(),
        }
    }
}

/// Makes `follower` follow the account called `target`.
pub fn follow(
    conn: &mut SqliteConnection,
    follower: &Member,
    target: &str,
) -> Result<FollowOutcome> {
    let target = target.trim();
    if target == follower.username {
        return Ok(FollowOutcome::SelfFollow);
    }

    let followed = users::table
        .filter(users::username.eq(target))
        .select(Member::as_select())
        .first(conn)
        .optional()?;
    let followed = match followed {
        Some(member) => member,
        None => return Ok(FollowOutcome::UnknownUser(target.to_string())),
    };

    let inserted = diesel::insert_into(user_follows::table)
        .values(&NewUserFollow { user_id: follower.id, followed_user_id: followed.id })
        .execute(conn);

    match inserted {
        Ok(_) => {
            tracing::info!(
                follower = %follower.username,
                followed = %followed.username,
                "follow created"
            );
            Ok(FollowOutcome::Followed(followed.username))
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Ok(FollowOutcome::AlreadyFollowing(followed.username))
        }
        // only reachable when the username comparison above was bypassed
        Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _)) => {
            Ok(FollowOutcome::SelfFollow)
        }
        Err(err) => Err(err.into()),
    }
}

/// Removes the (follower, followed) relationship if there is one.
pub fn unfollow(
    conn: &mut SqliteConnection,
    follower_id: i32,
    followed_id: i32,
) -> Result<UnfollowOutcome> {
    let found = user_follows::table
        .inner_join(users::table.on(users::id.eq(user_follows::followed_user_id)))
        .filter(user_follows::user_id.eq(follower_id))
        .filter(user_follows::followed_user_id.eq(followed_id))
        .select((user_follows::id, users::username))
        .first::<(i32, String)>(conn)
        .optional()?;

    match found {
        Some((follow_id, username)) => {
            diesel::delete(user_follows::table.find(follow_id)).execute(conn)?;
            tracing::info!(follower_id, followed = %username, "follow removed");
            Ok(UnfollowOutcome::Unfollowed(username))
        }
        None => Ok(UnfollowOutcome::NotFound),
    }
}

/// Accounts `follower_id` follows, by username.
pub fn followed_users(conn: &mut SqliteConnection, follower_id: i32) -> Result<Vec<Member>> {
    let members = user_follows::table
        .inner_join(users::table.on(users::id.eq(user_follows::followed_user_id)))
        .filter(user_follows::user_id.eq(follower_id))
        .order(users::username.asc())
        .select(Member::as_select())
        .load(conn)?;
    Ok(members)
}

/// Accounts following `user_id`, by username.
pub fn followers(conn: &mut SqliteConnection, user_id: i32) -> Result<Vec<Member>> {
    let members = user_follows::table
        .inner_join(users::table.on(users::id.eq(user_follows::user_id)))
        .filter(user_follows::followed_user_id.eq(user_id))
        .order(users::username.asc())
        .select(Member::as_select())
        .load(conn)?;
    Ok(members)
}

pub fn find_member(conn: &mut SqliteConnection, user_id: i32) -> Result<Member> {
    users::table
        .find(user_id)
        .select(Member::as_select())
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound)
}

pub fn followed_ids(conn: &mut SqliteConnection, follower_id: i32) -> Result<Vec<i32>> {
    let ids = user_follows::table
        .filter(user_follows::user_id.eq(follower_id))
        .select(user_follows::followed_user_id)
        .load(conn)?;
    Ok(ids)
}
