pub mod seed;
pub mod shift;
pub mod token_denylist;
