mod common;
mod lookup;
mod scoring;
