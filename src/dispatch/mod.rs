pub mod config;
pub mod pool;
pub mod state;
pub mod types;

pub use config::{PoolConfig, PoolConfigBuilder};
pub use pool::DispatchPool;
pub use state::RunState;
pub use types::DispatchError;
