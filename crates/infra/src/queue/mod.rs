//! Durable pending-order queue

mod json_file;

pub use json_file::JsonFileQueue;
