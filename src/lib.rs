pub mod core;
pub mod corpus;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod state;
