pub mod export;
pub mod init;
pub mod publish;
pub mod results;
pub mod take;
pub mod validate;
