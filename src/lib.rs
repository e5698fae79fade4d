pub mod ast;
pub mod format;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod tokenizer;
pub mod tree_walk_interpreter;
