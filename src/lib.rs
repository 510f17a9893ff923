pub mod error;
pub mod fetch;
pub mod merge;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod roster;
pub mod settings;
