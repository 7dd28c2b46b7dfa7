pub mod catalog;
pub mod download;
pub mod http;
pub mod manifest;
pub mod paths;
pub mod report;
pub mod runtime;
