pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use chat::dispatch::BroadcastDispatcher;
use chat::history::HistoryReader;
use chat::ingress::MessageIngress;
use chat::registry::GroupChannelRegistry;
use config::Config;
use store::{GroupDirectory, MembershipAuthority, MessageStore};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn MessageStore>,
    pub membership: Arc<dyn MembershipAuthority>,
    pub directory: Arc<dyn GroupDirectory>,
    pub registry: Arc<GroupChannelRegistry>,
    pub ingress: Arc<MessageIngress>,
    pub history: Arc<HistoryReader>,
}

impl AppState {
    /// Wire the chat core around a set of collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn MessageStore>,
        membership: Arc<dyn MembershipAuthority>,
        directory: Arc<dyn GroupDirectory>,
    ) -> Self {
        let registry = Arc::new(GroupChannelRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(registry.clone()));
        let ingress = Arc::new(MessageIngress::new(store.clone(), dispatcher));
        let history = Arc::new(HistoryReader::new(store.clone(), membership.clone()));

        Self {
            config: Arc::new(config),
            store,
            membership,
            directory,
            registry,
            ingress,
            history,
        }
    }
}
