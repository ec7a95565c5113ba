//! Actor registry: `type_name -> factory` (SPEC_FULL §4.4). Grounded on
//! `orchestrator::pattern::registry::PatternRegistry`'s thread-safe
//! register/get shape, swapping its YAML-config payload for a factory
//! closure since actor types are constructed, not declaratively loaded.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::actor_id::ActorId;
use crate::context::ActorContext;
use crate::error::{ActorError, Result};

/// What a registered actor type does with one method call. Implementors run
/// serially per actor instance — the runtime never calls `handle` again for
/// the same actor before the previous call returns.
#[async_trait]
pub trait ActorHandler: Send + Sync {
    async fn handle(&self, ctx: Arc<ActorContext>, message_id: String, method: String, params: Value) -> Result<Value>;
}

pub type ActorFactory = Arc<dyn Fn(&ActorId) -> Arc<dyn ActorHandler> + Send + Sync>;

/// Thread-safe `type_name -> factory` table, consulted the first time a
/// request targets a not-yet-running actor instance.
#[derive(Clone, Default)]
pub struct ActorRegistry {
    factories: Arc<RwLock<HashMap<String, ActorFactory>>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, type_name: impl Into<String>, factory: ActorFactory) {
        self.factories.write().insert(type_name.into(), factory);
    }

    pub(crate) fn create(&self, actor_id: &ActorId) -> Result<Arc<dyn ActorHandler>> {
        let factories = self.factories.read();
        let factory = factories.get(&actor_id.type_name).ok_or_else(|| ActorError::UnknownActorType(actor_id.type_name.clone()))?;
        Ok(factory(actor_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ActorHandler for Echo {
        async fn handle(&self, _ctx: Arc<ActorContext>, _message_id: String, _method: String, params: Value) -> Result<Value> {
            Ok(params)
        }
    }

    #[test]
    fn unregistered_type_is_an_error() {
        let registry = ActorRegistry::new();
        let id = ActorId::new("ghost", "a").unwrap();
        assert!(matches!(registry.create(&id), Err(ActorError::UnknownActorType(_))));
    }

    #[test]
    fn registered_factory_is_invoked_on_create() {
        let registry = ActorRegistry::new();
        registry.register("echo", Arc::new(|_id: &ActorId| Arc::new(Echo) as Arc<dyn ActorHandler>));
        let id = ActorId::new("echo", "a").unwrap();
        assert!(registry.create(&id).is_ok());
    }
}
