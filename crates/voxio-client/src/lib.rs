// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client crate for the Voxio calls backend.
//!
//! [`CallsClient`] is the production implementation of
//! [`voxio_core::CallsApi`]: history listing, transcript and recording
//! fetches, and call placement, with transient retry on reads.

pub mod client;
pub mod types;

pub use client::CallsClient;
