use std::net::SocketAddr;
use std::sync::Arc;

use flock_api::auth::tokens;
use flock_api::config::Config;
use flock_api::models::user::UserRole;
use flock_api::store::memory::MemoryBackend;
use flock_api::AppState;

pub const TEST_SECRET: &str = "test-secret-do-not-use-in-production";

/// Build an AppState wired to a fresh in-memory backend.
pub fn test_state() -> (AppState, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let config = Config {
        database_url: "postgres://unused".to_string(),
        token_secret: TEST_SECRET.to_string(),
        port: 0,
        token_ttl_secs: 3600,
    };
    let state = AppState::new(config, backend.clone(), backend.clone(), backend.clone());
    (state, backend)
}

/// A seeded demo organization.
///
/// `leader` and `member` belong to the Worship Team; `member` is also in the
/// Youth Group; `outsider` has no memberships; `north_group` lives in a
/// different branch.
pub struct Seeded {
    pub branch: i64,
    pub north_branch: i64,
    pub admin: i64,
    pub leader: i64,
    pub member: i64,
    pub outsider: i64,
    pub group: i64,
    pub other_group: i64,
    pub north_group: i64,
}

pub fn seed_org(backend: &MemoryBackend) -> Seeded {
    let branch = backend.add_branch("Main Campus", Some("Downtown"));
    let north_branch = backend.add_branch("North Campus", None);

    let admin = backend.add_user("John Doe", "admin@flock.local", UserRole::SuperAdmin, Some(branch));
    let leader = backend.add_user("Jane Smith", "jane@flock.local", UserRole::GroupLeader, Some(branch));
    let member = backend.add_user("Bob Wilson", "bob@flock.local", UserRole::Member, Some(branch));
    let outsider = backend.add_user("Eve Jones", "eve@flock.local", UserRole::Member, Some(branch));

    let group = backend.add_group(
        Some(branch),
        "Worship Team",
        Some("Ministry"),
        Some("Praise and worship coordination"),
    );
    let other_group = backend.add_group(Some(branch), "Youth Group", None, None);
    let north_group = backend.add_group(Some(north_branch), "North Prayer Circle", None, None);

    backend.add_membership(leader, group, Some("Leader"));
    backend.add_membership(member, group, Some("Vocalist"));
    backend.add_membership(member, other_group, None);

    Seeded {
        branch,
        north_branch,
        admin,
        leader,
        member,
        outsider,
        group,
        other_group,
        north_group,
    }
}

/// Mint a bearer token the way the login route does.
pub fn token_for(user_id: i64, role: UserRole, branch_id: Option<i64>) -> String {
    tokens::issue(TEST_SECRET, user_id, role.as_str(), branch_id, 3600).expect("mint test token")
}

/// Start a real TCP server for WebSocket tests. Returns the bound address;
/// the server runs in the background.
pub async fn start_ws_server(state: AppState) -> SocketAddr {
    let app = flock_api::routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
