pub mod club;
pub mod review;
