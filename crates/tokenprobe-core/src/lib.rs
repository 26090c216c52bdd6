#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod diagnosis;
pub mod error;
pub mod jwt;
pub mod timefmt;
pub mod token;

pub use crate::cache::*;
pub use crate::diagnosis::*;
pub use crate::error::*;
pub use crate::jwt::*;
pub use crate::timefmt::*;
pub use crate::token::*;
