pub mod component_table;
pub mod driver;
pub mod fn_driver;
pub mod registered_driver;
