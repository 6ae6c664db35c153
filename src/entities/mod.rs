pub mod customer;
pub mod invoice;
pub mod item;
pub mod line_item;

pub use customer::{Address, Customer};
pub use invoice::Invoice;
pub use item::ServiceItem;
pub use line_item::{ItemType, LineItem};
