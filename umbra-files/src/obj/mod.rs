pub mod mtl;
pub mod reader;
pub mod types;

#[cfg(test)]
mod tests;
