//! Infrastructure layer: stores, reservation, checkout and cart services.
//!
//! Domain crates stay free of IO; everything here composes them with the
//! storage traits in [`store`].

pub mod cart_service;
pub mod checkout;
pub mod error;
pub mod locks;
pub mod reservation;
pub mod seed;
pub mod store;

pub use cart_service::CartService;
pub use checkout::OrderAssembler;
pub use error::ServiceError;
pub use locks::UserLocks;
pub use reservation::{InventoryReservation, ReservationRequest, DEFAULT_MAX_ATTEMPTS};
