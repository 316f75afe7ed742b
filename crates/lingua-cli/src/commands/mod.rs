pub mod backend;
pub mod config;
pub mod ocr;
pub mod serve;
pub mod speak;
