pub mod app;
pub mod commands;
pub mod pipeline;

pub use app::{AssistantApp, AssistantResponse, ConversationTurn, Speaker};
pub use commands::{Command, MetaCommand};
pub use pipeline::{CommandPipeline, PipelineConfig, PipelineError, SimulationConfig};
