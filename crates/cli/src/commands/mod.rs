pub mod chat;
pub mod init_db;
pub mod onboard;
pub mod serve;
