// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: everything that talks to a database, an object
//! store, or the outside clock. Implements the domain's repository and port
//! traits; nothing in the domain or application layer imports from here.

pub mod adapters;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod repositories;
pub mod runtime;
