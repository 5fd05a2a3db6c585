//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `aws` - Cloud resource adapters (S3, CloudFront, Lambda)
//! - `order_numbers` - Human-readable order numbers
//! - `order_processing` - Simulated payment processing

pub mod aws;
pub mod order_numbers;
pub mod order_processing;
