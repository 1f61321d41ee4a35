// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod affordability;
pub mod cli;
pub mod db;
pub mod geo;
pub mod models;
pub mod store;
pub mod utils;
pub mod commands;
