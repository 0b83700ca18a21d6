use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::chat::ChatClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::storage::TokenStore;
use crate::tasks::TaskClient;

/// Everything a command or screen needs to talk to the API.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub auth: AuthService,
    pub tasks: TaskClient,
    pub chat: ChatClient,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let store = TokenStore::from_config(&config);
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: TokenStore) -> Self {
        let api = ApiClient::new(&config);
        Self {
            auth: AuthService::new(api.clone(), store),
            tasks: TaskClient::new(api.clone()),
            chat: ChatClient::new(api),
            config,
        }
    }

    /// The stored session, or `Error::Auth` if the user must sign in first.
    pub fn session(&self) -> Result<Session> {
        self.auth.session()
    }
}
