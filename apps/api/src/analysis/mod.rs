//! Skill-gap analysis: prompt rendering, model-output validation and the
//! `/analyze` handler that ties extraction and the chat model together.

pub mod handlers;
pub mod prompts;
pub mod validation;
