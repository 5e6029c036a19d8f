pub mod analyzers;
pub mod bucket;
pub mod filter;
pub mod markers;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod record;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;
