/// Etymon - Ancient Greek lexicon oracle and etymology resolver
///
/// Builds a searchable index over the LSJ dictionary and links Modern Greek
/// vocabulary to its Ancient Greek ancestors.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
