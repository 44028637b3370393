pub mod archive_builder;
pub mod cleanup;
pub mod password;
pub mod tokens;
