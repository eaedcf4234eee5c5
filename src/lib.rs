pub mod common;
pub mod desktop;
pub mod layout_engine;
pub mod model;
pub mod sys;
