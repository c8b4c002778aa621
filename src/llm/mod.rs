//! Language-model access: completion clients, profile resolution, and
//! output salvage.

pub mod client;
pub mod salvage;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::{Config, ProfileKind};
use crate::Result;

/// Boxed future returned by [`ChatModel::complete`].
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A single-shot chat completion endpoint.
///
/// The trait is the seam between the edit driver and the transport; tests
/// substitute scripted implementations.
pub trait ChatModel: Send + Sync {
    /// Complete one system + user prompt pair into assistant text.
    fn complete<'a>(&'a self, system: &'a str, user: &'a str) -> CompletionFuture<'a>;
}

/// Builds completion clients for a named profile.
pub trait ModelFactory: Send + Sync {
    /// Build (or rebuild) a client for the given profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the underlying client cannot be built.
    fn build(&self, kind: ProfileKind) -> Result<Arc<dyn ChatModel>>;
}

/// Per-invocation client cache keyed by profile kind.
///
/// Lives for the duration of one driver call and is handed by reference to
/// every helper that may reach the model; never shared across requests.
pub struct ClientCache<'a> {
    factory: &'a dyn ModelFactory,
    clients: HashMap<ProfileKind, Arc<dyn ChatModel>>,
}

impl<'a> ClientCache<'a> {
    /// New empty cache backed by `factory`.
    #[must_use]
    pub fn new(factory: &'a dyn ModelFactory) -> Self {
        Self {
            factory,
            clients: HashMap::new(),
        }
    }

    /// Fetch the cached client for `kind`, building it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the factory's build failure.
    pub fn get(&mut self, kind: ProfileKind) -> Result<Arc<dyn ChatModel>> {
        if let Some(client) = self.clients.get(&kind) {
            return Ok(Arc::clone(client));
        }
        let client = self.factory.build(kind)?;
        self.clients.insert(kind, Arc::clone(&client));
        Ok(client)
    }
}

/// Default factory resolving profiles from configuration and building
/// HTTP clients.
pub struct HttpModelFactory {
    config: Config,
}

impl HttpModelFactory {
    /// Factory over the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ModelFactory for HttpModelFactory {
    fn build(&self, kind: ProfileKind) -> Result<Arc<dyn ChatModel>> {
        let client = client::HttpChatClient::new(self.config.profile(kind))?;
        Ok(Arc::new(client))
    }
}
