pub mod panels;
pub mod plot;
pub mod table;
pub mod treemap;
