mod archive;
mod legacy;
mod parse;
mod payload;
