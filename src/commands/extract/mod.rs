mod candidates;
mod ocr;
mod render;
mod run;

pub use run::run;
