pub mod clock;
pub mod conn_id;

pub use clock::SystemClock;
pub use conn_id::next_conn_id;
