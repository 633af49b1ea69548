// Cross-cutting prompt fragments for the chat model.
// Task-specific templates live next to the module that uses them.

/// System instruction sent with every analysis request.
pub const ANALYST_SYSTEM: &str =
    "You are a helpful AI assistant specialized in CV analysis and ATS scoring.";
