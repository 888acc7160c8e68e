pub mod finance;
pub mod query;
pub mod response;
pub mod stock;

pub use finance::*;
pub use query::*;
pub use response::*;
pub use stock::*;
