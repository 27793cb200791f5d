pub mod agent;
pub mod offline;
pub mod online;
