pub mod archive;
pub mod stations;
pub mod token;
pub mod users;
