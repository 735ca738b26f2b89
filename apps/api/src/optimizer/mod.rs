pub mod clock;
pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod input;
pub mod latest;
pub mod pipeline;
pub mod prompts;
pub mod upload;
