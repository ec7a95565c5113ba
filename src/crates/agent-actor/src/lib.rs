pub mod agent;
pub mod agent_actor;
pub mod proxy;

pub use agent::{Agent, AgentError, AgentRunResponse, AgentRunResponseUpdate, UpdateStream};
pub use agent_actor::AgentActor;
pub use proxy::{AgentProxy, ProxyError, ProxyThread};
