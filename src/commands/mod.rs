pub mod advise;
pub mod extract;
