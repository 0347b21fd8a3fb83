pub mod authorization;
pub mod health;
pub mod security;

#[cfg(test)]
mod test_support;
