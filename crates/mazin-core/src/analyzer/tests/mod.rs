mod maze;
mod tokenizer;
