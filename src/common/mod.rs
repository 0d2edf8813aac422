pub mod helpers;
#[cfg(test)]
pub mod testing;
