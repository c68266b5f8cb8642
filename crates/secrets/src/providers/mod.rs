// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod cloud;
pub mod env;
pub mod vault;

pub use cloud::CloudSecretStoreProvider;
pub use env::EnvProvider;
pub use vault::VaultKvProvider;
