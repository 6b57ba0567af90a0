//! cardscan-client - HTTP card store for the cardscan server.
//!
//! # Example
//!
//! ```ignore
//! use cardscan_client::CardClient;
//! use cardscan_core::{CardStore, NewCard};
//!
//! let client = CardClient::new("http://localhost:3000")?;
//!
//! let record = client
//!     .create(NewCard::new("DUPONT", "JEAN", "1234567890123", "CPAM"))
//!     .await?;
//!
//! let cards = client.list().await?;
//! ```

mod client;

pub use cardscan_core::types::{CardRecord, NewCard};
pub use client::{CardClient, HealthStatus};
