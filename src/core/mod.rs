pub mod aggregate;
pub mod etl;
pub mod pipeline;
pub mod table;

pub use crate::domain::model::{AggregateResult, CustomerDayStats, Order, RawOrder, WriteMode};
pub use crate::domain::ports::{ConfigProvider, FileSource, Pipeline, Storage, WarehouseSink};
pub use crate::utils::error::Result;
