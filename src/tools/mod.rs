pub mod page_content;
pub mod registry;
pub mod search;

#[cfg(test)]
pub(crate) mod fakes;
