pub mod extract;
pub mod order;
pub mod page;
pub mod params;

pub use extract::ValidJson;
pub use order::{Direction, OrderBy};
pub use page::{Page, PageDocument};
