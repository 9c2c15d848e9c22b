pub mod storage;
pub mod upstream;
