//! Modelos de dominio
//!
//! Structs que mapean al schema PostgreSQL del coordinador.

pub mod assignment;
pub mod client;
pub mod driver;
pub mod legacy_event;
pub mod run;

pub use assignment::{AssignmentStatus, AssignmentWithClient, PickupAssignment};
pub use client::Client;
pub use driver::Driver;
pub use legacy_event::{AssignmentEvent, LegacyEventStatus};
pub use run::{DeliveryRun, RunShift, RunWithDriver};
