pub mod db;
pub mod gigdb;
pub mod userdb;
