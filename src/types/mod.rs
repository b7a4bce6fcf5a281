// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the provisioning operations.

pub mod subject;

pub use subject::{binding_name, BindingRequest, BindingSubject};
