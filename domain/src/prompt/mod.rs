//! Prompt domain
//!
//! Templates for the classifier, trust and consensus-round prompts.

mod template;

pub use template::PromptTemplate;
