#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for Pix BR Code payloads.
//!
//! This crate turns a merchant's payment key, the merchant identity and a
//! transaction amount into the "copy and paste" string that Brazilian banking
//! apps accept, the same string that gets rendered into a checkout QR code.
//!
//! # Overview
//!
//! A BR Code is a flat sequence of tag-length-value fields following the EMV
//! merchant-presented QR layout. Every field is a two digit tag, a two digit
//! decimal length and the value itself. The last field is a CRC-16/CCITT-FALSE
//! checksum over everything before it, including its own tag and length.
//!
//! Building a payload is a pipeline of pure transforms:
//!
//! 1. [`key::normalize_key`] puts the payment key in its on-wire shape.
//! 2. [`text::normalize_text`] strips accents and punctuation from the merchant name and city.
//! 3. [`tlv::field`] and [`tlv::nested`] encode each field.
//! 4. [`crc::checksum`] seals the payload.
//!
//! [`payload::build`] composes all of the above. Nothing here performs I/O or holds
//! state, so every function can be called concurrently from any number of checkouts.
//!
//! # Modules
//!
//! - [`amount`] - Transaction amounts rounded to cents
//! - [`config`] - Merchant Pix configuration with environment variable resolution
//! - [`crc`] - CRC-16/CCITT-FALSE checksum
//! - [`key`] - Payment key types, normalization and type detection
//! - [`merchant`] - Merchant name and city
//! - [`payload`] - BR Code assembly and parsing
//! - [`text`] - Free text normalization for name and city fields
//! - [`tlv`] - Tag-length-value encoding and decoding
//!
//! # Example
//!
//! ```
//! use pix_types::amount::TransactionAmount;
//! use pix_types::key::{KeyType, PaymentKey};
//! use pix_types::merchant::MerchantIdentity;
//! use pix_types::payload;
//!
//! let key = PaymentKey::new("shop@example.com", KeyType::Email);
//! let merchant = MerchantIdentity::new("Example Shop", "São Paulo");
//! let amount = TransactionAmount::try_from(19.9).unwrap();
//!
//! let brcode = payload::build(&key, &merchant, &amount);
//! assert!(brcode.starts_with("000201"));
//! assert!(brcode.contains("540519.90"));
//! ```

pub mod amount;
pub mod config;
pub mod crc;
pub mod key;
pub mod merchant;
pub mod payload;
pub mod text;
pub mod tlv;
