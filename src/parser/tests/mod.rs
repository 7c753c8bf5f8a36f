mod errors;
mod select;
