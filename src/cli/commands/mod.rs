pub mod gentoken;
pub mod migrate;
pub mod seed;
pub mod useradd;
