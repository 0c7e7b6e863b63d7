pub mod gigdtos;
pub mod userdtos;
