pub mod constellation;
pub mod mood;
pub mod oracle;
pub mod table;
pub mod variation;
