pub mod client;
mod response;
