pub mod ai;
pub mod ai_types;
pub mod encoding;
pub mod flatten;
pub mod locale_store;
pub mod pipeline;
pub mod placeholder;
pub mod protected;
pub mod qa;
pub mod report;
