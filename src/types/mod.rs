pub mod archive;
pub mod stations;
pub mod users;
