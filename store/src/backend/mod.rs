mod clickhouse_store;
mod memory;

pub use clickhouse_store::ClickHouseStore;
pub use memory::MemoryStore;
