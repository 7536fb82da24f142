// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command line client for the Pet World feeding and staking contracts.
//!
//! Read commands preview rewards with the estimators in [petworld_rewards]. Write commands send a
//! transaction, wait for its receipt, and report a [outcome::TxOutcome].

pub mod commands;
pub mod config;
pub mod context;
pub mod countdown;
pub mod outcome;
pub mod retry;
pub mod token;
