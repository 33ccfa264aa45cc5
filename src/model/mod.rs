mod data;
mod error;
mod load;
mod parse;

pub use data::{Category, Topic, TopicModelData};
#[cfg(test)]
pub use data::{PlotLabels, TermRelevanceRow};
pub use load::load_topic_model;
#[cfg(test)]
pub use parse::parse_payload_value;

#[cfg(test)]
pub mod fixtures;
