pub use gateway::*;

mod gateway;
