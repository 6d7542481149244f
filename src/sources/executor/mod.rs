pub mod token_refresh;
