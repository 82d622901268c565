//! Seeds a demo organization for local development: one branch, three users,
//! and one group with memberships and a first message.
//!
//! Usage:
//!   cargo run -p flock-api --bin flock-seed
//!
//! Does nothing if the database already has users.

use std::path::Path;

use diesel::QueryDsl;
use diesel_async::{AsyncConnection, AsyncPgConnection};

use flock_api::db::schema::{branches, group_members, groups, messages, users};
use flock_api::models::branch::NewBranch;
use flock_api::models::group::NewGroup;
use flock_api::models::group_member::NewGroupMember;
use flock_api::models::message::NewMessage;
use flock_api::models::user::NewUser;

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL env var is required");
    let mut conn = AsyncPgConnection::establish(&database_url)
        .await
        .expect("failed to connect to database");

    let existing: i64 = diesel_async::RunQueryDsl::get_result(users::table.count(), &mut conn)
        .await
        .expect("count users");
    if existing > 0 {
        println!("Database already has users; nothing to do.");
        return;
    }

    let branch_id: i64 = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(branches::table)
            .values(NewBranch {
                name: "Main Campus",
                location: Some("Downtown"),
            })
            .returning(branches::id),
        &mut conn,
    )
    .await
    .expect("insert branch");

    let admin_id: i64 = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(users::table)
            .values(NewUser {
                name: "John Doe",
                email: "admin@flock.local",
                role: "super_admin",
                branch_id: Some(branch_id),
            })
            .returning(users::id),
        &mut conn,
    )
    .await
    .expect("insert admin");

    let leader_id: i64 = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(users::table)
            .values(NewUser {
                name: "Jane Smith",
                email: "jane@flock.local",
                role: "group_leader",
                branch_id: Some(branch_id),
            })
            .returning(users::id),
        &mut conn,
    )
    .await
    .expect("insert leader");

    let member_id: i64 = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(users::table)
            .values(NewUser {
                name: "Bob Wilson",
                email: "bob@flock.local",
                role: "member",
                branch_id: Some(branch_id),
            })
            .returning(users::id),
        &mut conn,
    )
    .await
    .expect("insert member");

    let group_id: i64 = diesel_async::RunQueryDsl::get_result(
        diesel::insert_into(groups::table)
            .values(NewGroup {
                branch_id: Some(branch_id),
                name: "Worship Team",
                type_: Some("Ministry"),
                description: Some("Praise and worship coordination"),
                meeting_url: Some("https://meet.example.org/worship"),
            })
            .returning(groups::id),
        &mut conn,
    )
    .await
    .expect("insert group");

    diesel_async::RunQueryDsl::execute(
        diesel::insert_into(group_members::table).values(vec![
            NewGroupMember {
                user_id: leader_id,
                group_id,
                role_in_group: Some("Leader"),
            },
            NewGroupMember {
                user_id: member_id,
                group_id,
                role_in_group: Some("Vocalist"),
            },
        ]),
        &mut conn,
    )
    .await
    .expect("insert memberships");

    diesel_async::RunQueryDsl::execute(
        diesel::insert_into(messages::table).values(NewMessage {
            group_id,
            sender_id: leader_id,
            content: "Hi team, rehearsal is at 6 PM tomorrow!",
        }),
        &mut conn,
    )
    .await
    .expect("insert first message");

    println!("Seeded demo data: branch {branch_id}, group {group_id}, users {admin_id}/{leader_id}/{member_id}.");
}
