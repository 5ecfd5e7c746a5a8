// Resume tailoring: skill extraction against a known vocabulary, match scoring,
// section rewrites and recommendations.

pub mod handlers;
pub mod tailor;
pub mod vocabulary;
