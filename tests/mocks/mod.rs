#![allow(dead_code)]

pub mod transcriber;
pub mod video_host;
