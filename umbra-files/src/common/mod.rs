pub mod hash;
pub mod reader;
pub mod tokenizer;

#[cfg(test)]
mod tests;
