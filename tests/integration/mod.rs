// Integration test module organization

pub mod multithreaded;

mod client_test;
mod credentials_test;
mod live_aws_test;
