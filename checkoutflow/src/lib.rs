//! # Checkoutflow
//!
//! An automated checkout pipeline for the footlocker.com storefront.
//!
//! A run drives an existing cart through six ordered steps:
//!
//! 1. **Submit contact info**: name, email, and phone
//! 2. **Verify address**: the retailer may return a normalized address
//! 3. **Set shipping address**: the verified address goes on the cart
//! 4. **Refresh cart**: confirms shipping was applied
//! 5. **Prepare payment**: local card encryption through an injected encryptor
//! 6. **Place order**: returns the order confirmation
//!
//! The run stops at the first failed step. Cookies from every response are
//! carried forward in the [`Session`](session::Session), and every step
//! outcome is emitted as an event that can be logged or written to disk.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkoutflow::prelude::*;
//!
//! let config = CheckoutConfig::load(Path::new("checkout.toml"))?;
//! let pipeline = CheckoutPipeline::from_config(&config)?;
//!
//! let outcome = pipeline
//!     .complete_order_flow(&mut config.session(), &config.inputs())
//!     .await;
//! for line in outcome.summary_lines() {
//!     println!("{line}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod encryption;
pub mod errors;
pub mod events;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod steps;
pub mod testing;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{CheckoutConfig, PipelineConfig, RetailerConfig};
    pub use crate::core::{StepId, StepRecord, StepResult, StepStatus};
    pub use crate::encryption::{
        EncryptionMode, PaymentEncryptor, PlaceholderEncryptor, UnavailableEncryptor,
    };
    pub use crate::errors::{
        CheckoutError, ConfigError, FailureKind, StepFailure, TransportError, ValidationError,
    };
    pub use crate::events::{
        EventSink, FanoutEventSink, FileEventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::models::{
        ContactInfo, EncryptedPaymentBlock, OrderConfirmation, PaymentInfo, ShippingAddress,
        VerifiedAddress,
    };
    pub use crate::pipeline::{CheckoutInputs, CheckoutPipeline, PipelineOptions, PipelineOutcome};
    pub use crate::session::Session;
    pub use crate::steps::CheckoutClient;
    pub use crate::transport::{HttpTransport, ReqwestTransport};
}
