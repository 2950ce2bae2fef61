pub mod accessor;
pub mod reader;
pub mod types;
pub mod validate;

#[cfg(test)]
mod tests;
