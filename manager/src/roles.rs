use shoal_client::Client;
use shoal_server::Server;

/// The roles a process plays. Both are present on a listen server.
#[derive(Default)]
pub struct NetworkRoles {
    pub server: Option<Server>,
    pub client: Option<Client>,
}

impl NetworkRoles {
    pub fn is_server_active(&self) -> bool {
        self.server.as_ref().is_some_and(Server::is_active)
    }

    pub fn is_client_active(&self) -> bool {
        self.client.as_ref().is_some_and(Client::is_active)
    }

    pub fn any_active(&self) -> bool {
        self.is_server_active() || self.is_client_active()
    }

    /// Server and client both active in this process
    pub fn is_host(&self) -> bool {
        self.is_server_active() && self.is_client_active()
    }
}
