pub mod class;
pub mod flowchart;
pub mod generic;
pub mod sequence;
pub mod state;
