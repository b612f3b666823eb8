use service::policy::RatePolicy;

/// The two deployments of the same API: a read-oriented public service and
/// the management service that also takes image uploads. They share one
/// storage directory; only policy and surface differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceVariant {
    Public,
    Manage,
}

impl ServiceVariant {
    /// Rating rules differ per deployment and are deliberately kept apart.
    pub fn rate_policy(self) -> RatePolicy {
        match self {
            ServiceVariant::Public => RatePolicy::HalfStep,
            ServiceVariant::Manage => RatePolicy::Integer,
        }
    }

    /// Entry HTML document served at `/`.
    pub fn entry_page(self) -> &'static str {
        match self {
            ServiceVariant::Public => "eat.html",
            ServiceVariant::Manage => "eat_manage.html",
        }
    }

    pub fn port(self, server: &configs::ServerConfig) -> u16 {
        match self {
            ServiceVariant::Public => server.public_port,
            ServiceVariant::Manage => server.manage_port,
        }
    }

    /// Per-variant env var overriding the configured port.
    pub fn port_env(self) -> &'static str {
        match self {
            ServiceVariant::Public => "PUBLIC_PORT",
            ServiceVariant::Manage => "MANAGE_PORT",
        }
    }
}
