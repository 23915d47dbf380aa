mod task;

pub use task::{Priority, Task, parse_due_date};
