pub mod build_constraints;
pub mod error;
pub mod generate;
pub mod package_locator;
pub mod template_loader;

#[cfg(test)]
mod generate_tests;
