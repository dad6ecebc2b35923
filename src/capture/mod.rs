pub mod manager;
pub mod parser;

#[cfg(test)]
mod frames;
